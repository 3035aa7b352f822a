//! Field-level encoding primitives.
//!
//! Every field type implements [`Wire`]; length-prefixed arrays use one of the
//! [`WireAs`] adapters because the prefix width differs from packet to packet.

use bytes::{Buf, BufMut};

use crate::error::CodecError;

/// Upper bound on any single length-prefixed array.
pub const MAX_ARRAY_LEN: usize = 4 * 1024 * 1024;

/// Why a read stopped.
#[derive(Debug)]
pub(crate) enum Fault {
    /// Input ended before the field was complete.
    Short,
    /// Input is malformed.
    Bad(CodecError),
}

impl From<CodecError> for Fault {
    fn from(err: CodecError) -> Self {
        Fault::Bad(err)
    }
}

/// Cursor over a borrowed byte slice that never panics on short input.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    start_len: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            start_len: buf.len(),
        }
    }

    /// Bytes consumed since construction.
    pub(crate) fn consumed(&self) -> usize {
        self.start_len - self.buf.len()
    }

    pub(crate) fn need(&self, n: usize) -> Result<(), Fault> {
        if self.buf.remaining() < n {
            Err(Fault::Short)
        } else {
            Ok(())
        }
    }

    pub(crate) fn u8(&mut self) -> Result<u8, Fault> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn i8(&mut self) -> Result<i8, Fault> {
        self.need(1)?;
        Ok(self.buf.get_i8())
    }

    pub(crate) fn u16(&mut self) -> Result<u16, Fault> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    pub(crate) fn i16(&mut self) -> Result<i16, Fault> {
        self.need(2)?;
        Ok(self.buf.get_i16())
    }

    pub(crate) fn u32(&mut self) -> Result<u32, Fault> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub(crate) fn i32(&mut self) -> Result<i32, Fault> {
        self.need(4)?;
        Ok(self.buf.get_i32())
    }

    pub(crate) fn i64(&mut self) -> Result<i64, Fault> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    pub(crate) fn f32(&mut self) -> Result<f32, Fault> {
        self.need(4)?;
        Ok(self.buf.get_f32())
    }

    pub(crate) fn f64(&mut self) -> Result<f64, Fault> {
        self.need(8)?;
        Ok(self.buf.get_f64())
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<Vec<u8>, Fault> {
        self.need(len)?;
        let out = self.buf[..len].to_vec();
        self.buf.advance(len);
        Ok(out)
    }
}

/// Validate a signed length prefix.
pub(crate) fn checked_len(len: i32) -> Result<usize, Fault> {
    if len < 0 {
        return Err(CodecError::NegativeLength(len).into());
    }
    let len = len as usize;
    if len > MAX_ARRAY_LEN {
        return Err(CodecError::LengthTooLarge {
            len,
            limit: MAX_ARRAY_LEN,
        }
        .into());
    }
    Ok(len)
}

/// A type with a single fixed wire layout.
pub(crate) trait Wire: Sized {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault>;
    fn write(&self, out: &mut Vec<u8>);
}

/// A wire layout for `T` chosen per field (used for length prefixes).
pub(crate) trait WireAs<T> {
    fn read(r: &mut Reader<'_>) -> Result<T, Fault>;
    fn write(value: &T, out: &mut Vec<u8>);
}

macro_rules! wire_number {
    ($($ty:ty => $get:ident, $put:ident;)*) => {$(
        impl Wire for $ty {
            fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
                r.$get()
            }

            fn write(&self, out: &mut Vec<u8>) {
                out.$put(*self);
            }
        }
    )*};
}

wire_number! {
    u8 => u8, put_u8;
    i8 => i8, put_i8;
    u16 => u16, put_u16;
    i16 => i16, put_i16;
    i32 => i32, put_i32;
    i64 => i64, put_i64;
    f32 => f32, put_f32;
    f64 => f64, put_f64;
}

impl Wire for bool {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        Ok(r.u8()? != 0)
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_u8(u8::from(*self));
    }
}

/// Strings carry an `i16` count of UTF-16 code units followed by UTF-16BE data.
impl Wire for String {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let units = checked_len(r.i16()? as i32)?;
        r.need(units * 2)?;
        let mut buf = Vec::with_capacity(units);
        for _ in 0..units {
            buf.push(r.u16()?);
        }
        String::from_utf16(&buf).map_err(|_| CodecError::InvalidString.into())
    }

    fn write(&self, out: &mut Vec<u8>) {
        let units: Vec<u16> = self.encode_utf16().collect();
        out.put_i16(units.len() as i16);
        for unit in units {
            out.put_u16(unit);
        }
    }
}

/// Byte array with an `i16` length prefix.
pub(crate) struct BytesI16;
/// Byte array with an `i32` length prefix.
pub(crate) struct BytesI32;

impl WireAs<Vec<u8>> for BytesI16 {
    fn read(r: &mut Reader<'_>) -> Result<Vec<u8>, Fault> {
        let len = checked_len(r.i16()? as i32)?;
        r.bytes(len)
    }

    fn write(value: &Vec<u8>, out: &mut Vec<u8>) {
        out.put_i16(value.len() as i16);
        out.put_slice(value);
    }
}

impl WireAs<Vec<u8>> for BytesI32 {
    fn read(r: &mut Reader<'_>) -> Result<Vec<u8>, Fault> {
        let len = checked_len(r.i32()?)?;
        r.bytes(len)
    }

    fn write(value: &Vec<u8>, out: &mut Vec<u8>) {
        out.put_i32(value.len() as i32);
        out.put_slice(value);
    }
}

/// Element list with a `u8` count prefix.
pub(crate) struct CountU8;
/// Element list with an `i16` count prefix.
pub(crate) struct CountI16;
/// Element list with an `i32` count prefix.
pub(crate) struct CountI32;

fn read_elements<T: Wire>(r: &mut Reader<'_>, count: usize) -> Result<Vec<T>, Fault> {
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        items.push(T::read(r)?);
    }
    Ok(items)
}

impl<T: Wire> WireAs<Vec<T>> for CountU8 {
    fn read(r: &mut Reader<'_>) -> Result<Vec<T>, Fault> {
        let count = r.u8()? as usize;
        read_elements(r, count)
    }

    fn write(value: &Vec<T>, out: &mut Vec<u8>) {
        out.put_u8(value.len() as u8);
        value.iter().for_each(|item| item.write(out));
    }
}

impl<T: Wire> WireAs<Vec<T>> for CountI16 {
    fn read(r: &mut Reader<'_>) -> Result<Vec<T>, Fault> {
        let count = checked_len(r.i16()? as i32)?;
        read_elements(r, count)
    }

    fn write(value: &Vec<T>, out: &mut Vec<u8>) {
        out.put_i16(value.len() as i16);
        value.iter().for_each(|item| item.write(out));
    }
}

impl<T: Wire> WireAs<Vec<T>> for CountI32 {
    fn read(r: &mut Reader<'_>) -> Result<Vec<T>, Fault> {
        let count = checked_len(r.i32()?)?;
        read_elements(r, count)
    }

    fn write(value: &Vec<T>, out: &mut Vec<u8>) {
        out.put_i32(value.len() as i32);
        value.iter().for_each(|item| item.write(out));
    }
}

/// Read one field, through an adapter when one is named.
macro_rules! read_field {
    ($r:ident, $ty:ty) => {
        <$ty as $crate::wire::Wire>::read($r)?
    };
    ($r:ident, $ty:ty, $codec:ty) => {
        <$codec as $crate::wire::WireAs<$ty>>::read($r)?
    };
}

/// Write one field, through an adapter when one is named.
macro_rules! write_field {
    ($out:ident, $value:expr, $ty:ty) => {
        <$ty as $crate::wire::Wire>::write($value, $out)
    };
    ($out:ident, $value:expr, $ty:ty, $codec:ty) => {
        <$codec as $crate::wire::WireAs<$ty>>::write($value, $out)
    };
}

/// Declare plain structs whose wire layout is their fields in order.
macro_rules! wire_struct {
    ($(
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty $(as $codec:ty)?
            ),* $(,)?
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::wire::Wire for $name {
            #[allow(unused_variables)]
            fn read(r: &mut $crate::wire::Reader<'_>) -> Result<Self, $crate::wire::Fault> {
                Ok(Self {
                    $( $field: $crate::wire::read_field!(r, $ty $(, $codec)?), )*
                })
            }

            #[allow(unused_variables)]
            fn write(&self, out: &mut Vec<u8>) {
                $( $crate::wire::write_field!(out, &self.$field, $ty $(, $codec)?); )*
            }
        }
    )*};
}

pub(crate) use {read_field, wire_struct, write_field};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_uses_utf16_code_units() {
        let mut out = Vec::new();
        "a\u{1F600}".to_string().write(&mut out);
        // one BMP unit plus a surrogate pair
        assert_eq!(&out[..2], &[0x00, 0x03]);
        assert_eq!(out.len(), 2 + 6);

        let mut r = Reader::new(&out);
        assert_eq!(String::read(&mut r).unwrap(), "a\u{1F600}");
        assert_eq!(r.consumed(), out.len());
    }

    #[test]
    fn lone_surrogate_is_rejected() {
        let bytes = [0x00, 0x01, 0xD8, 0x00];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            String::read(&mut r),
            Err(Fault::Bad(CodecError::InvalidString))
        ));
    }

    #[test]
    fn negative_length_is_rejected() {
        let bytes = [0xFF, 0xFE];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            <BytesI16 as WireAs<Vec<u8>>>::read(&mut r),
            Err(Fault::Bad(CodecError::NegativeLength(-2)))
        ));
    }

    #[test]
    fn short_input_is_not_an_error() {
        let bytes = [0x00, 0x00, 0x00];
        let mut r = Reader::new(&bytes);
        assert!(matches!(i32::read(&mut r), Err(Fault::Short)));
    }

    #[test]
    fn oversized_array_is_rejected_before_buffering() {
        let bytes = 0x7FFF_FFFFi32.to_be_bytes();
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            <BytesI32 as WireAs<Vec<u8>>>::read(&mut r),
            Err(Fault::Bad(CodecError::LengthTooLarge { .. }))
        ));
    }
}
