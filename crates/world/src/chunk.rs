use asciicraft_core::{ChunkPos, SECTIONS_PER_CHUNK, SECTION_HEIGHT, WORLD_HEIGHT};

use crate::blocks::{block_info, BlockInfo};

/// Chunk width (X axis) in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk depth (Z axis) in voxels.
pub const CHUNK_SIZE_Z: usize = 16;
/// Voxels in one 16x16x16 section.
pub const SECTION_VOLUME: usize = 16 * 16 * 16;
/// Biome bytes in a ground-up column.
pub const BIOME_AREA: usize = CHUNK_SIZE_X * CHUNK_SIZE_Z;

/// Block identifier (12 bits on the wire).
pub type BlockId = u16;

/// Reserved ID for air.
pub const BLOCK_AIR: BlockId = 0;

/// Block id plus its 4-bit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockState {
    /// Block id.
    pub id: BlockId,
    /// Metadata nibble (orientation, colour, growth stage).
    pub metadata: u8,
}

impl BlockState {
    /// Empty voxel.
    pub const AIR: Self = Self::new(BLOCK_AIR, 0);

    /// Construct a state.
    pub const fn new(id: BlockId, metadata: u8) -> Self {
        Self { id, metadata }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == BLOCK_AIR
    }

    /// Registry entry for the id.
    pub fn info(&self) -> &'static BlockInfo {
        block_info(self.id)
    }
}

/// Full per-voxel record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Voxel {
    pub state: BlockState,
    pub light_block: u8,
    pub light_sky: u8,
}

/// Section-local position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Linear index in section arrays: `x + z*16 + y*256`.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.y < SECTION_HEIGHT as usize);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }
}

/// One 16x16x16 slab of a column, stored unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) ids: Vec<BlockId>,
    pub(crate) metadata: Vec<u8>,
    pub(crate) block_light: Vec<u8>,
    pub(crate) sky_light: Vec<u8>,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            ids: vec![BLOCK_AIR; SECTION_VOLUME],
            metadata: vec![0; SECTION_VOLUME],
            block_light: vec![0; SECTION_VOLUME],
            sky_light: vec![0; SECTION_VOLUME],
        }
    }
}

impl Section {
    /// Fetch a voxel copy.
    pub fn voxel(&self, pos: LocalPos) -> Voxel {
        let idx = pos.index();
        Voxel {
            state: BlockState::new(self.ids[idx], self.metadata[idx]),
            light_block: self.block_light[idx],
            light_sky: self.sky_light[idx],
        }
    }

    /// Replace the block at `pos`, leaving light untouched.
    pub fn set_block(&mut self, pos: LocalPos, state: BlockState) {
        let idx = pos.index();
        self.ids[idx] = state.id & 0x0FFF;
        self.metadata[idx] = state.metadata & 0x0F;
    }

    /// Whether every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.ids.iter().all(|&id| id == BLOCK_AIR)
    }
}

/// A 16x256x16 column of optional sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    position: ChunkPos,
    sections: [Option<Box<Section>>; SECTIONS_PER_CHUNK],
    biomes: Option<Vec<u8>>,
    loaded: bool,
}

impl Chunk {
    /// Allocate a loaded column filled with air.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            sections: std::array::from_fn(|_| None),
            biomes: None,
            loaded: true,
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Whether the server currently has this column loaded for us.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop all voxel data and mark the column unloaded.
    pub fn unload(&mut self) {
        self.sections = std::array::from_fn(|_| None);
        self.biomes = None;
        self.loaded = false;
    }

    /// Drop all voxel data but keep the column loaded (ground-up replace).
    pub(crate) fn reset(&mut self) {
        self.sections = std::array::from_fn(|_| None);
        self.loaded = true;
    }

    /// Section at vertical index `index` (0..16).
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index).and_then(|s| s.as_deref())
    }

    /// Install a section, replacing any previous contents.
    pub fn replace_section(&mut self, index: usize, section: Section) {
        if let Some(slot) = self.sections.get_mut(index) {
            *slot = Some(Box::new(section));
        }
        self.loaded = true;
    }

    /// Bitmap of present sections.
    pub fn section_mask(&self) -> u16 {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Biome ids, when a ground-up packet supplied them.
    pub fn biomes(&self) -> Option<&[u8]> {
        self.biomes.as_deref()
    }

    pub(crate) fn set_biomes(&mut self, biomes: Vec<u8>) {
        self.biomes = Some(biomes);
    }

    fn split(x: usize, y: i32, z: usize) -> Option<(usize, LocalPos)> {
        if !(0..WORLD_HEIGHT).contains(&y) || x >= CHUNK_SIZE_X || z >= CHUNK_SIZE_Z {
            return None;
        }
        let section = (y / SECTION_HEIGHT) as usize;
        let local = LocalPos {
            x,
            y: (y % SECTION_HEIGHT) as usize,
            z,
        };
        Some((section, local))
    }

    /// Fetch a voxel copy; missing sections and out-of-range `y` read as air.
    pub fn voxel(&self, x: usize, y: i32, z: usize) -> Voxel {
        match Self::split(x, y, z) {
            Some((section, local)) => self
                .section(section)
                .map(|s| s.voxel(local))
                .unwrap_or_default(),
            None => Voxel::default(),
        }
    }

    /// Block at a column-local position.
    pub fn block(&self, x: usize, y: i32, z: usize) -> BlockState {
        self.voxel(x, y, z).state
    }

    /// Set a block, allocating its section when needed. Returns false when
    /// `y` is outside the world.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, state: BlockState) -> bool {
        let Some((index, local)) = Self::split(x, y, z) else {
            return false;
        };
        let slot = &mut self.sections[index];
        if slot.is_none() && state.is_air() {
            return true;
        }
        slot.get_or_insert_with(Box::default).set_block(local, state);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_block() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.set_block(1, 70, 3, BlockState::new(5, 2)));
        assert_eq!(chunk.block(1, 70, 3), BlockState::new(5, 2));
        assert_eq!(chunk.section_mask(), 1 << 4);
    }

    #[test]
    fn test_local_pos_index() {
        let pos1 = LocalPos { x: 0, y: 0, z: 0 };
        assert_eq!(pos1.index(), 0);

        let pos2 = LocalPos { x: 15, y: 0, z: 0 };
        assert_eq!(pos2.index(), 15);

        let pos3 = LocalPos { x: 0, y: 0, z: 1 };
        assert_eq!(pos3.index(), 16);

        let pos4 = LocalPos { x: 0, y: 1, z: 0 };
        assert_eq!(pos4.index(), 256);
    }

    #[test]
    fn out_of_range_reads_as_air() {
        let chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.block(0, -1, 0).is_air());
        assert!(chunk.block(0, 256, 0).is_air());
        assert!(chunk.block(0, 10, 0).is_air());
    }

    #[test]
    fn out_of_range_writes_are_refused() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(!chunk.set_block(0, 300, 0, BlockState::new(1, 0)));
        assert_eq!(chunk.section_mask(), 0);
    }

    #[test]
    fn writing_air_into_missing_section_allocates_nothing() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.set_block(0, 40, 0, BlockState::AIR));
        assert_eq!(chunk.section_mask(), 0);
    }

    #[test]
    fn ids_and_metadata_are_masked() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(2, 2, 2, BlockState::new(0xF001, 0x1F));
        assert_eq!(chunk.block(2, 2, 2), BlockState::new(1, 0xF));
    }

    #[test]
    fn unload_clears_data() {
        let mut chunk = Chunk::new(ChunkPos::new(3, 3));
        chunk.set_block(0, 0, 0, BlockState::new(7, 0));
        chunk.unload();
        assert!(!chunk.is_loaded());
        assert!(chunk.block(0, 0, 0).is_air());
    }
}
