//! Dimension identifiers.
//!
//! Login and respawn packets carry the dimension as a signed byte
//! (`-1` Nether, `0` Overworld, `1` End). A respawn into a different
//! dimension invalidates every loaded chunk and entity.

use serde::{Deserialize, Serialize};

/// Identifier for a world dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DimensionId {
    /// The Nether dimension.
    Nether,
    /// The Overworld dimension.
    Overworld,
    /// The End dimension.
    End,
}

impl DimensionId {
    /// Default (Overworld) dimension.
    pub const DEFAULT: Self = Self::Overworld;

    /// Wire representation.
    pub const fn as_wire(self) -> i32 {
        match self {
            Self::Nether => -1,
            Self::Overworld => 0,
            Self::End => 1,
        }
    }

    /// Decode the wire representation.
    pub const fn from_wire(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Nether),
            0 => Some(Self::Overworld),
            1 => Some(Self::End),
            _ => None,
        }
    }

    /// Canonical string key used in logs and the status line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    /// Whether the dimension has sky light arrays in chunk payloads.
    pub const fn has_sky_light(self) -> bool {
        !matches!(self, Self::Nether)
    }
}

impl Default for DimensionId {
    fn default() -> Self {
        Self::DEFAULT
    }
}
