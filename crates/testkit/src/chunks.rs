//! Build chunk packets the way a server would send them.

use asciicraft_core::{BlockPos, ChunkPos, DimensionId};
use asciicraft_net::protocol::ChunkData;
use asciicraft_net::Packet;
use asciicraft_world::{compress, encode_column, BlockId, BlockState, Chunk, World};

/// A chunk column under construction.
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    chunk: Chunk,
    sky_light: bool,
}

impl ChunkBuilder {
    /// Empty overworld column.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            chunk: Chunk::new(position),
            sky_light: true,
        }
    }

    /// Leave out sky light, as nether and end columns do.
    pub fn without_sky_light(mut self) -> Self {
        self.sky_light = false;
        self
    }

    /// Set one block, given in world coordinates inside this column.
    pub fn block(self, pos: BlockPos, id: BlockId) -> Self {
        self.block_with_meta(pos, id, 0)
    }

    /// Set one block with metadata.
    ///
    /// # Panics
    /// When `pos` lies outside this column.
    pub fn block_with_meta(mut self, pos: BlockPos, id: BlockId, metadata: u8) -> Self {
        assert_eq!(
            pos.chunk(),
            self.chunk.position(),
            "{pos} is outside column {:?}",
            self.chunk.position()
        );
        let (x, y, z) = pos.local();
        self.chunk.set_block(x, y, z, BlockState::new(id, metadata));
        self
    }

    /// Fill a whole horizontal layer.
    pub fn layer(mut self, y: i32, id: BlockId) -> Self {
        for x in 0..16 {
            for z in 0..16 {
                self.chunk.set_block(x, y, z, BlockState::new(id, 0));
            }
        }
        self
    }

    /// The column as built.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// Full ground-up chunk packet body.
    pub fn chunk_data(&self) -> ChunkData {
        let encoded = encode_column(&self.chunk, self.sky_light, true);
        let position = self.chunk.position();
        ChunkData {
            x: position.x,
            z: position.z,
            ground_up: true,
            primary_bitmap: encoded.primary_bitmap,
            add_bitmap: encoded.add_bitmap,
            data: compress(&encoded.data),
        }
    }

    /// Full ground-up chunk packet.
    pub fn packet(&self) -> Packet {
        self.chunk_data().into()
    }
}

/// Overworld holding the given columns.
///
/// # Panics
/// When a column fails to apply, which means the builder is broken.
pub fn world_from(columns: impl IntoIterator<Item = ChunkBuilder>) -> World {
    let mut world = World::new(DimensionId::Overworld);
    for column in columns {
        if let Err(err) = world.apply_chunk_data(&column.chunk_data()) {
            panic!("built column failed to apply: {err}");
        }
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_columns_read_back() {
        let world = world_from([
            ChunkBuilder::new(ChunkPos::new(0, 0)).layer(4, 1),
            ChunkBuilder::new(ChunkPos::new(-1, 0)).block(BlockPos::new(-3, 70, 2), 17),
        ]);
        assert_eq!(world.block_at(BlockPos::new(15, 4, 15)), BlockState::new(1, 0));
        assert_eq!(world.block_at(BlockPos::new(-3, 70, 2)), BlockState::new(17, 0));
        assert_eq!(world.loaded_chunks(), 2);
    }
}
