//! Composite field types shared by several packets.

use bytes::BufMut;
use tracing::warn;

use crate::error::CodecError;
use crate::wire::{checked_len, Fault, Reader, Wire};

/// A non-empty inventory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Item or block id.
    pub id: i16,
    /// Stack size.
    pub count: i8,
    /// Damage or data value.
    pub damage: i16,
    /// Gzipped NBT blob, passed through untouched.
    pub nbt: Option<Vec<u8>>,
}

/// An inventory slot; `None` is encoded as item id `-1`.
pub type Slot = Option<ItemStack>;

impl Wire for Option<ItemStack> {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let id = r.i16()?;
        if id == -1 {
            return Ok(None);
        }
        let count = r.i8()?;
        let damage = r.i16()?;
        let nbt_len = r.i16()?;
        let nbt = if nbt_len == -1 {
            None
        } else {
            let len = checked_len(nbt_len as i32)?;
            Some(r.bytes(len)?)
        };
        Ok(Some(ItemStack {
            id,
            count,
            damage,
            nbt,
        }))
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            None => out.put_i16(-1),
            Some(stack) => {
                out.put_i16(stack.id);
                out.put_i8(stack.count);
                out.put_i16(stack.damage);
                match &stack.nbt {
                    None => out.put_i16(-1),
                    Some(blob) => {
                        out.put_i16(blob.len() as i16);
                        out.put_slice(blob);
                    }
                }
            }
        }
    }
}

/// One typed value in an entity metadata stream.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Type 0.
    Byte(i8),
    /// Type 1.
    Short(i16),
    /// Type 2.
    Int(i32),
    /// Type 3.
    Float(f32),
    /// Type 4.
    String(String),
    /// Type 5.
    Slot(Slot),
    /// Type 6: a block coordinate.
    Position(i32, i32, i32),
}

impl MetadataValue {
    fn type_id(&self) -> u8 {
        match self {
            MetadataValue::Byte(_) => 0,
            MetadataValue::Short(_) => 1,
            MetadataValue::Int(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
            MetadataValue::Slot(_) => 5,
            MetadataValue::Position(..) => 6,
        }
    }
}

/// A single `(index, value)` pair.
///
/// `index` must be below 32; the combination of index 31 with a float value
/// collides with the stream terminator and is never sent by servers. Use
/// [`MetadataEntry::new`] to have both rules checked; entries that break
/// them are left out when the stream is written.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// Entry index (0..32).
    pub index: u8,
    /// Typed value.
    pub value: MetadataValue,
}

impl MetadataEntry {
    /// Build an entry, rejecting pairs that have no header byte.
    pub fn new(index: u8, value: MetadataValue) -> Result<Self, CodecError> {
        let entry = Self { index, value };
        match entry.header() {
            Some(_) => Ok(entry),
            None => Err(CodecError::UnencodableMetadata {
                index,
                type_id: entry.value.type_id(),
            }),
        }
    }

    fn header(&self) -> Option<u8> {
        if self.index > 0x1F {
            return None;
        }
        let key = (self.value.type_id() << 5) | self.index;
        (key != METADATA_END).then_some(key)
    }
}

/// Entity metadata stream, terminated on the wire by `0x7F`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityMetadata {
    /// Entries in wire order.
    pub entries: Vec<MetadataEntry>,
}

/// Index of the shared entity flag byte.
pub const METADATA_FLAGS: u8 = 0;
/// Index of the custom name string on living entities.
pub const METADATA_CUSTOM_NAME: u8 = 5;

const METADATA_END: u8 = 0x7F;

impl EntityMetadata {
    /// Look up the value stored at `index`, last one wins.
    pub fn get(&self, index: u8) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.index == index)
            .map(|entry| &entry.value)
    }
}

impl Wire for EntityMetadata {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let mut entries = Vec::new();
        loop {
            let key = r.u8()?;
            if key == METADATA_END {
                return Ok(Self { entries });
            }
            let index = key & 0x1F;
            let value = match key >> 5 {
                0 => MetadataValue::Byte(r.i8()?),
                1 => MetadataValue::Short(r.i16()?),
                2 => MetadataValue::Int(r.i32()?),
                3 => MetadataValue::Float(r.f32()?),
                4 => MetadataValue::String(String::read(r)?),
                5 => MetadataValue::Slot(Slot::read(r)?),
                6 => MetadataValue::Position(r.i32()?, r.i32()?, r.i32()?),
                other => return Err(CodecError::InvalidMetadataType(other).into()),
            };
            entries.push(MetadataEntry { index, value });
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        for entry in &self.entries {
            let Some(key) = entry.header() else {
                warn!(index = entry.index, "skipping metadata entry with no header byte");
                continue;
            };
            out.put_u8(key);
            match &entry.value {
                MetadataValue::Byte(v) => out.put_i8(*v),
                MetadataValue::Short(v) => out.put_i16(*v),
                MetadataValue::Int(v) => out.put_i32(*v),
                MetadataValue::Float(v) => out.put_f32(*v),
                MetadataValue::String(v) => v.write(out),
                MetadataValue::Slot(v) => v.write(out),
                MetadataValue::Position(x, y, z) => {
                    out.put_i32(*x);
                    out.put_i32(*y);
                    out.put_i32(*z);
                }
            }
        }
        out.put_u8(METADATA_END);
    }
}

/// Trailing data of a spawned object.
///
/// The velocity triple is present on the wire only when `data` is non-zero;
/// it is ignored on encode when `data` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectData {
    /// Object specific integer (thrower id, falling block id, ...).
    pub data: i32,
    /// Initial velocity in 1/8000 block per tick.
    pub velocity: Option<[i16; 3]>,
}

impl Wire for ObjectData {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let data = r.i32()?;
        let velocity = if data != 0 {
            Some([r.i16()?, r.i16()?, r.i16()?])
        } else {
            None
        };
        Ok(Self { data, velocity })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_i32(self.data);
        if self.data != 0 {
            for component in self.velocity.unwrap_or_default() {
                out.put_i16(component);
            }
        }
    }
}

/// One packed record of a multi-block change.
///
/// Layout (most significant first): x:4, z:4, y:8, block id:12, metadata:4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRecord(pub u32);

impl BlockRecord {
    /// Pack a record. Out-of-range components are masked.
    pub fn new(x: u8, y: u8, z: u8, block_id: u16, metadata: u8) -> Self {
        Self(
            (u32::from(x & 0xF) << 28)
                | (u32::from(z & 0xF) << 24)
                | (u32::from(y) << 16)
                | (u32::from(block_id & 0xFFF) << 4)
                | u32::from(metadata & 0xF),
        )
    }

    /// Chunk-local X (0..16).
    pub fn x(self) -> u8 {
        (self.0 >> 28) as u8 & 0xF
    }

    /// Chunk-local Z (0..16).
    pub fn z(self) -> u8 {
        (self.0 >> 24) as u8 & 0xF
    }

    /// Absolute Y.
    pub fn y(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Block id.
    pub fn block_id(self) -> u16 {
        (self.0 >> 4) as u16 & 0xFFF
    }

    /// Block metadata nibble.
    pub fn metadata(self) -> u8 {
        self.0 as u8 & 0xF
    }
}

impl Wire for BlockRecord {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        Ok(Self(r.u32()?))
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_u32(self.0);
    }
}

/// Offset of one block destroyed by an explosion, relative to its centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExplosionRecord {
    /// X offset.
    pub dx: i8,
    /// Y offset.
    pub dy: i8,
    /// Z offset.
    pub dz: i8,
}

impl Wire for ExplosionRecord {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        Ok(Self {
            dx: r.i8()?,
            dy: r.i8()?,
            dz: r.i8()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_i8(self.dx);
        out.put_i8(self.dy);
        out.put_i8(self.dz);
    }
}

/// Per-column header of a chunk bulk packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkMeta {
    /// Chunk X.
    pub x: i32,
    /// Chunk Z.
    pub z: i32,
    /// Bitmap of sections carrying block data.
    pub primary_bitmap: u16,
    /// Bitmap of sections carrying the high id nibble.
    pub add_bitmap: u16,
}

impl Wire for ChunkMeta {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        Ok(Self {
            x: r.i32()?,
            z: r.i32()?,
            primary_bitmap: r.u16()?,
            add_bitmap: r.u16()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_i32(self.x);
        out.put_i32(self.z);
        out.put_u16(self.primary_bitmap);
        out.put_u16(self.add_bitmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Wire + PartialEq + std::fmt::Debug>(value: &T) -> usize {
        let mut out = Vec::new();
        value.write(&mut out);
        let mut r = Reader::new(&out);
        let back = T::read(&mut r).unwrap();
        assert_eq!(&back, value);
        assert_eq!(r.consumed(), out.len());
        out.len()
    }

    #[test]
    fn empty_slot_is_two_bytes() {
        assert_eq!(roundtrip::<Slot>(&None), 2);
    }

    #[test]
    fn slot_with_nbt_keeps_blob() {
        let slot = Some(ItemStack {
            id: 276,
            count: 1,
            damage: 12,
            nbt: Some(vec![0x1F, 0x8B, 0x08]),
        });
        assert_eq!(roundtrip(&slot), 2 + 1 + 2 + 2 + 3);
    }

    #[test]
    fn metadata_terminator_and_types() {
        let meta = EntityMetadata {
            entries: vec![
                MetadataEntry {
                    index: METADATA_FLAGS,
                    value: MetadataValue::Byte(0x02),
                },
                MetadataEntry {
                    index: METADATA_CUSTOM_NAME,
                    value: MetadataValue::String("Grumm".into()),
                },
                MetadataEntry {
                    index: 17,
                    value: MetadataValue::Position(1, -2, 3),
                },
            ],
        };
        roundtrip(&meta);
        assert_eq!(
            meta.get(METADATA_CUSTOM_NAME),
            Some(&MetadataValue::String("Grumm".into()))
        );
    }

    #[test]
    fn float_at_the_last_index_is_rejected() {
        assert_eq!(
            MetadataEntry::new(31, MetadataValue::Float(1.0)),
            Err(CodecError::UnencodableMetadata { index: 31, type_id: 3 })
        );
        assert!(MetadataEntry::new(32, MetadataValue::Byte(0)).is_err());
        assert!(MetadataEntry::new(31, MetadataValue::Int(1)).is_ok());
        assert!(MetadataEntry::new(30, MetadataValue::Float(1.0)).is_ok());
    }

    #[test]
    fn entries_without_a_header_are_not_written() {
        let kept = MetadataEntry::new(METADATA_FLAGS, MetadataValue::Byte(1)).unwrap();
        let meta = EntityMetadata {
            entries: vec![
                MetadataEntry {
                    index: 31,
                    value: MetadataValue::Float(0.5),
                },
                kept.clone(),
                MetadataEntry {
                    index: 40,
                    value: MetadataValue::Short(2),
                },
            ],
        };
        let mut out = Vec::new();
        meta.write(&mut out);
        assert_eq!(out, vec![0x00, 0x01, METADATA_END]);

        let mut r = Reader::new(&out);
        let back = EntityMetadata::read(&mut r).unwrap();
        assert_eq!(back.entries, vec![kept]);
    }

    #[test]
    fn unknown_metadata_type_is_an_error() {
        let bytes = [0xE0, 0x00];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            EntityMetadata::read(&mut r),
            Err(Fault::Bad(CodecError::InvalidMetadataType(7)))
        ));
    }

    #[test]
    fn object_data_velocity_only_when_nonzero() {
        assert_eq!(roundtrip(&ObjectData::default()), 4);
        let thrown = ObjectData {
            data: 42,
            velocity: Some([100, -200, 300]),
        };
        assert_eq!(roundtrip(&thrown), 10);
    }

    #[test]
    fn block_record_packing() {
        let record = BlockRecord::new(15, 200, 3, 0xABC, 9);
        assert_eq!(record.x(), 15);
        assert_eq!(record.z(), 3);
        assert_eq!(record.y(), 200);
        assert_eq!(record.block_id(), 0xABC);
        assert_eq!(record.metadata(), 9);
    }
}
