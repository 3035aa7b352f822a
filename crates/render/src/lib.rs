#![warn(missing_docs)]
//! Depth-aware top-down projection of a session's world.
//!
//! Every grid cell shows the first non-air voxel found by walking its column
//! down from head height; entities are drawn over the terrain unless a
//! surface above the camera hides them. The result is a [`Frame`] that any
//! [`RenderSink`] can draw.

use asciicraft_core::BlockPos;
use asciicraft_world::World;

mod frame;
mod overlay;
mod projection;
mod sink;
mod status;

pub use frame::{Cell, DepthClass, EntityMarker, Frame, MarkerKind};
pub use overlay::{overlay_cursor, overlay_entities, overlay_player, PLAYER_GLYPH};
pub use projection::{project, surface_below, ProjectionConfig};
pub use sink::{RenderSink, TextSink};
pub use status::StatusLine;

/// What part of the world to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    /// Voxel the frame is centred on.
    pub origin: BlockPos,
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Draw the look-around cursor at the origin.
    pub looking: bool,
    /// Where the player's `@` goes. Sessions pass their predicted feet, which
    /// can be ahead of the last server-confirmed position.
    pub player: Option<BlockPos>,
}

/// Terrain, entities, the player and the cursor in one pass.
///
/// Only reads `world`; callers hold whatever lock guards it for the
/// duration of the call.
pub fn render(world: &World, view: &View, config: &ProjectionConfig) -> Frame {
    let mut frame = project(world, view.origin, view.width, view.height, config);
    overlay_entities(&mut frame, world, config.max_depth);
    if let Some(feet) = view.player {
        overlay_player(&mut frame, feet);
    }
    if view.looking {
        overlay_cursor(&mut frame);
    }
    frame
}
