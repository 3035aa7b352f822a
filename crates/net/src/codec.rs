//! Packet encoding and resumable decoding.
//!
//! [`decode`] never blocks and never guesses: given a prefix of the stream it
//! either returns one complete packet and the number of bytes it used, asks
//! for more data, or reports malformed input. [`FrameDecoder`] keeps the
//! partial bytes between socket reads.

use bytes::{Buf, BytesMut};

use crate::error::CodecError;
use crate::protocol::{Direction, Packet};
use crate::wire::{Fault, Reader};

/// Outcome of a decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A complete packet was read.
    Frame {
        /// The packet.
        packet: Packet,
        /// Bytes consumed from the front of the input.
        consumed: usize,
    },
    /// The input ends inside a packet; nothing was consumed.
    NeedMoreData,
}

/// Encode a packet: id byte followed by its fields.
pub fn encode(packet: &Packet) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    encode_into(packet, &mut out);
    out
}

/// Append an encoded packet to `out`.
pub fn encode_into(packet: &Packet, out: &mut Vec<u8>) {
    out.push(packet.id());
    packet.write_body(out);
}

/// Decode one packet travelling in `direction` from the front of `bytes`.
pub fn decode(bytes: &[u8], direction: Direction) -> Result<Decoded, CodecError> {
    let mut reader = Reader::new(bytes);
    let id = match reader.u8() {
        Ok(id) => id,
        Err(_) => return Ok(Decoded::NeedMoreData),
    };
    match Packet::read_body(id, direction, &mut reader) {
        Ok(packet) => Ok(Decoded::Frame {
            packet,
            consumed: reader.consumed(),
        }),
        Err(Fault::Short) => Ok(Decoded::NeedMoreData),
        Err(Fault::Bad(err)) => Err(err),
    }
}

/// Accumulates stream bytes and yields complete packets.
#[derive(Debug)]
pub struct FrameDecoder {
    direction: Direction,
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Decoder for packets travelling in `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            buffer: BytesMut::with_capacity(8 * 1024),
        }
    }

    /// Append bytes read from the socket.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pop the next complete packet, if one is buffered.
    pub fn next_packet(&mut self) -> Result<Option<Packet>, CodecError> {
        match decode(&self.buffer, self.direction)? {
            Decoded::Frame { packet, consumed } => {
                self.buffer.advance(consumed);
                Ok(Some(packet))
            }
            Decoded::NeedMoreData => Ok(None),
        }
    }

    /// Bytes received but not yet part of a complete packet.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
