//! Top-down projection of the voxel column under each grid cell.

use asciicraft_core::BlockPos;
use asciicraft_world::{glyph_for, BlockState, World};
use serde::{Deserialize, Serialize};

use crate::frame::{Cell, DepthClass, Frame};

/// Projection tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Deepest voxel below the origin that can still be the visible surface.
    pub max_depth: u8,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// First non-air voxel in the column through `origin`, walking down from
/// head height (`origin.y + 1`) to `origin.y - max_depth`.
///
/// Voxels outside the world's height range are skipped.
pub fn surface_below<F>(origin: BlockPos, max_depth: u8, mut block_at: F) -> Option<(i32, BlockState)>
where
    F: FnMut(BlockPos) -> BlockState,
{
    let top = origin.y + 1;
    let bottom = origin.y - max_depth as i32;
    (bottom..=top).rev().find_map(|y| {
        let pos = BlockPos::new(origin.x, y, origin.z);
        if !pos.in_world_height() {
            return None;
        }
        let state = block_at(pos);
        (!state.is_air()).then_some((y, state))
    })
}

/// Project the terrain around `origin` into a `width` x `height` frame.
/// Columns with nothing in range, or whose chunk is not loaded, stay void.
pub fn project(
    world: &World,
    origin: BlockPos,
    width: usize,
    height: usize,
    config: &ProjectionConfig,
) -> Frame {
    let mut frame = Frame::new(width, height, origin);
    for row in 0..height {
        for col in 0..width {
            let (x, z) = frame.world_column(col, row);
            let column = BlockPos::new(x, origin.y, z);
            let surface = surface_below(column, config.max_depth, |pos| world.block_at(pos));
            let Some(cell) = frame.cell_mut(col, row) else {
                continue;
            };
            *cell = match surface {
                Some((y, block)) => Cell {
                    glyph: glyph_for(block.id, block.metadata),
                    depth: DepthClass::from_delta(origin.y, y),
                    block,
                    ..Cell::VOID
                },
                None => Cell::VOID,
            };
        }
    }
    frame
}
