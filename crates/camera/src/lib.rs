#![warn(missing_docs)]
//! Camera state for the map view.
//!
//! The camera either follows the player or, in look-around mode, sits at an
//! offset from the player that the user pans freely. Both modes resolve to
//! an absolute view origin through [`resolve`], so nothing outside this
//! crate keeps its own notion of where the camera is.

use asciicraft_core::BlockPos;
use glam::IVec3;

/// Largest pan distance from the player along any axis, in blocks.
pub const MAX_LOOK_DISTANCE: i32 = 64;

/// How the view origin relates to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraMode {
    /// View origin is the player's feet voxel.
    #[default]
    Follow,
    /// View origin is the player's feet voxel plus a panned offset.
    Look,
}

/// Resolve the effective view origin for a mode, anchor and offset.
///
/// The offset only applies in [`CameraMode::Look`].
pub fn resolve(mode: CameraMode, anchor: BlockPos, offset: IVec3) -> BlockPos {
    match mode {
        CameraMode::Follow => anchor,
        CameraMode::Look => anchor + offset,
    }
}

/// Per-session camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraState {
    mode: CameraMode,
    offset: IVec3,
}

impl CameraState {
    /// A camera following the player.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Whether look-around mode is active.
    pub fn is_looking(&self) -> bool {
        self.mode == CameraMode::Look
    }

    /// Offset from the player; always zero while following.
    pub fn offset(&self) -> IVec3 {
        self.offset
    }

    /// Switch between follow and look-around. The offset restarts at zero
    /// either way, so entering look mode starts at the player.
    pub fn toggle_look(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::Follow => CameraMode::Look,
            CameraMode::Look => CameraMode::Follow,
        };
        self.offset = IVec3::ZERO;
        self.mode
    }

    /// Leave look-around mode.
    pub fn follow(&mut self) {
        self.mode = CameraMode::Follow;
        self.offset = IVec3::ZERO;
    }

    /// Move the look-around camera. Ignored while following; the offset is
    /// clamped to [`MAX_LOOK_DISTANCE`]. Returns whether the offset changed.
    pub fn pan(&mut self, delta: IVec3) -> bool {
        if self.mode != CameraMode::Look {
            return false;
        }
        let next = (self.offset + delta).clamp(
            IVec3::splat(-MAX_LOOK_DISTANCE),
            IVec3::splat(MAX_LOOK_DISTANCE),
        );
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// Absolute view origin for the given anchor (normally the player's
    /// feet voxel).
    pub fn view_origin(&self, anchor: BlockPos) -> BlockPos {
        resolve(self.mode, anchor, self.offset)
    }
}
