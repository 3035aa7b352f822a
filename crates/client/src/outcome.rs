use std::fmt;

use asciicraft_camera::CameraMode;
use asciicraft_core::BlockPos;

use crate::session::SessionId;

/// Why an action did nothing. Shown to the user as a no-op, never as a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// No session has focus.
    NoSession,
    /// The session is not in the play state.
    NotPlaying,
    /// The server has not told us where we are yet.
    NoPosition,
    /// The destination chunk is not loaded.
    Unloaded,
    /// Something solid is in the way at head height.
    Blocked,
    /// The step up is more than one voxel.
    TooHigh,
    /// The drop is deeper than allowed.
    TooDeep,
    /// Nothing to climb here.
    NotClimbable,
    /// Only air next to and below the target.
    NothingToDig,
    /// The camera is as far from the player as it may go.
    CameraLimit,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rejection::NoSession => "no session",
            Rejection::NotPlaying => "not in game yet",
            Rejection::NoPosition => "position unknown",
            Rejection::Unloaded => "chunk not loaded",
            Rejection::Blocked => "blocked",
            Rejection::TooHigh => "too high to climb",
            Rejection::TooDeep => "drop too deep",
            Rejection::NotClimbable => "nothing to climb",
            Rejection::NothingToDig => "nothing to dig",
            Rejection::CameraLimit => "camera at its limit",
        })
    }
}

/// Result of dispatching one input action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// A move was accepted and queued; the new feet voxel.
    Moved(BlockPos),
    /// Digging of this block was queued.
    Dug(BlockPos),
    /// The camera moved; the new view origin.
    Panned(BlockPos),
    /// Look-around mode was toggled.
    CameraMode(CameraMode),
    /// Description of the examined voxel.
    Examined(String),
    /// Focus moved to this session.
    Focused(SessionId),
    /// This session was closed.
    Closed(SessionId),
    /// The user asked to leave.
    Quit,
    /// Nothing happened.
    Rejected(Rejection),
}

impl InputOutcome {
    /// Whether the action had no effect.
    pub fn is_rejected(&self) -> bool {
        matches!(self, InputOutcome::Rejected(_))
    }
}

impl From<Rejection> for InputOutcome {
    fn from(reason: Rejection) -> Self {
        InputOutcome::Rejected(reason)
    }
}
