//! Chunk column payloads: zlib framing and the section array layout.
//!
//! A column's decompressed payload holds, for every section flagged in the
//! primary bitmap and in this order: all block id low bytes, all metadata
//! nibbles, all block light nibbles, all sky light nibbles (dimensions with
//! sky only), then the add nibbles for sections flagged in the add bitmap,
//! then 256 biome bytes when the column is ground-up. Nibble arrays store
//! the even index in the low nibble.

use std::io::{Read, Write};

use asciicraft_core::{ChunkPos, SECTIONS_PER_CHUNK};
use asciicraft_net::ChunkMeta;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::chunk::{Chunk, Section, BIOME_AREA, SECTION_VOLUME};
use crate::error::WorldError;

const NIBBLES: usize = SECTION_VOLUME / 2;

/// Bitmaps and flags that determine a column payload's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub primary_bitmap: u16,
    pub add_bitmap: u16,
    pub sky_light: bool,
    pub ground_up: bool,
}

impl ColumnLayout {
    /// Exact decompressed byte count this layout requires.
    pub fn expected_len(&self) -> usize {
        let sections = self.primary_bitmap.count_ones() as usize;
        let adds = (self.primary_bitmap & self.add_bitmap).count_ones() as usize;
        let per_section = SECTION_VOLUME + NIBBLES * if self.sky_light { 3 } else { 2 };
        let biomes = if self.ground_up { BIOME_AREA } else { 0 };
        sections * per_section + adds * NIBBLES + biomes
    }

    fn present(&self) -> impl Iterator<Item = usize> + '_ {
        (0..SECTIONS_PER_CHUNK).filter(move |i| self.primary_bitmap & (1 << i) != 0)
    }
}

/// Sections and biomes decoded from one column payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnData {
    pub position: ChunkPos,
    pub sections: Vec<(usize, Section)>,
    pub biomes: Option<Vec<u8>>,
}

/// Inflate a zlib stream, refusing to produce more than `limit` bytes.
pub fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, WorldError> {
    let mut out = Vec::with_capacity(limit.min(1 << 20));
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)?;
    Ok(out)
}

/// Deflate a payload the way servers do.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// Decode one column from the front of `data`; returns the bytes used.
///
/// The caller has already checked that `data` holds at least
/// `layout.expected_len()` bytes.
pub fn parse_column(
    data: &[u8],
    position: ChunkPos,
    layout: ColumnLayout,
) -> (ColumnData, usize) {
    let mut sections: Vec<(usize, Section)> = layout
        .present()
        .map(|index| (index, Section::default()))
        .collect();
    let mut cursor = Cursor { data, pos: 0 };

    for (_, section) in sections.iter_mut() {
        for (id, &low) in section.ids.iter_mut().zip(cursor.take(SECTION_VOLUME)) {
            *id = low as u16;
        }
    }
    for (_, section) in sections.iter_mut() {
        unpack_nibbles(cursor.take(NIBBLES), &mut section.metadata);
    }
    for (_, section) in sections.iter_mut() {
        unpack_nibbles(cursor.take(NIBBLES), &mut section.block_light);
    }
    if layout.sky_light {
        for (_, section) in sections.iter_mut() {
            unpack_nibbles(cursor.take(NIBBLES), &mut section.sky_light);
        }
    }
    for (index, section) in sections.iter_mut() {
        if layout.add_bitmap & (1 << *index) != 0 {
            let mut add = vec![0u8; SECTION_VOLUME];
            unpack_nibbles(cursor.take(NIBBLES), &mut add);
            for (id, high) in section.ids.iter_mut().zip(add) {
                *id |= (high as u16) << 8;
            }
        }
    }
    let biomes = layout.ground_up.then(|| cursor.take(BIOME_AREA).to_vec());

    let column = ColumnData {
        position,
        sections,
        biomes,
    };
    (column, cursor.pos)
}

/// Decode a single-column payload, checking its size exactly.
pub fn parse_single(
    data: &[u8],
    position: ChunkPos,
    layout: ColumnLayout,
) -> Result<ColumnData, WorldError> {
    let expected = layout.expected_len();
    if data.len() != expected {
        return Err(WorldError::PayloadSize {
            chunk: position,
            expected,
            actual: data.len(),
        });
    }
    Ok(parse_column(data, position, layout).0)
}

/// Decode a bulk payload holding every column in `columns`, in order.
pub fn parse_bulk(
    data: &[u8],
    columns: &[ChunkMeta],
    sky_light: bool,
) -> Result<Vec<ColumnData>, WorldError> {
    let layouts: Vec<ColumnLayout> = columns
        .iter()
        .map(|meta| ColumnLayout {
            primary_bitmap: meta.primary_bitmap,
            add_bitmap: meta.add_bitmap,
            sky_light,
            ground_up: true,
        })
        .collect();
    let expected: usize = layouts.iter().map(ColumnLayout::expected_len).sum();
    if data.len() != expected {
        return Err(WorldError::BulkSize {
            expected,
            actual: data.len(),
        });
    }
    let mut offset = 0;
    let mut out = Vec::with_capacity(columns.len());
    for (meta, layout) in columns.iter().zip(layouts) {
        let (column, used) = parse_column(&data[offset..], ChunkPos::new(meta.x, meta.z), layout);
        offset += used;
        out.push(column);
    }
    Ok(out)
}

/// Uncompressed column payload produced by [`encode_column`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedColumn {
    pub primary_bitmap: u16,
    pub add_bitmap: u16,
    pub data: Vec<u8>,
}

/// Serialize every present section of `chunk` in payload order.
///
/// With `ground_up` the column's biomes are appended (zeros when unknown).
pub fn encode_column(chunk: &Chunk, sky_light: bool, ground_up: bool) -> EncodedColumn {
    let present: Vec<(usize, &Section)> = (0..SECTIONS_PER_CHUNK)
        .filter_map(|i| chunk.section(i).map(|s| (i, s)))
        .collect();
    let primary_bitmap = present.iter().fold(0u16, |m, (i, _)| m | (1 << i));
    let add_bitmap = present
        .iter()
        .filter(|(_, s)| s.ids.iter().any(|&id| id > 0xFF))
        .fold(0u16, |m, (i, _)| m | (1 << i));

    let mut data = Vec::new();
    for (_, section) in &present {
        data.extend(section.ids.iter().map(|&id| (id & 0xFF) as u8));
    }
    for (_, section) in &present {
        pack_nibbles(&section.metadata, &mut data);
    }
    for (_, section) in &present {
        pack_nibbles(&section.block_light, &mut data);
    }
    if sky_light {
        for (_, section) in &present {
            pack_nibbles(&section.sky_light, &mut data);
        }
    }
    for (index, section) in &present {
        if add_bitmap & (1 << index) != 0 {
            let high: Vec<u8> = section.ids.iter().map(|&id| (id >> 8) as u8).collect();
            pack_nibbles(&high, &mut data);
        }
    }
    if ground_up {
        match chunk.biomes() {
            Some(biomes) => data.extend_from_slice(biomes),
            None => data.extend(std::iter::repeat(0).take(BIOME_AREA)),
        }
    }

    EncodedColumn {
        primary_bitmap,
        add_bitmap,
        data,
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        slice
    }
}

fn unpack_nibbles(packed: &[u8], out: &mut [u8]) {
    for (pair, byte) in out.chunks_exact_mut(2).zip(packed) {
        pair[0] = byte & 0x0F;
        pair[1] = byte >> 4;
    }
}

fn pack_nibbles(values: &[u8], out: &mut Vec<u8>) {
    out.extend(
        values
            .chunks_exact(2)
            .map(|pair| (pair[0] & 0x0F) | (pair[1] << 4)),
    );
}
