#![warn(missing_docs)]
//! Core primitives shared across the workspace: voxel coordinates, the
//! protocol's fixed-point and byte-angle encodings, and compass directions.

pub mod dimension;

use std::fmt;
use std::ops::{Add, Sub};

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

pub use dimension::DimensionId;

/// Width of a chunk column along X and Z, in voxels.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk section, in voxels.
pub const SECTION_HEIGHT: i32 = 16;
/// Number of sections stacked in one chunk column.
pub const SECTIONS_PER_CHUNK: usize = 16;
/// World height in voxels (valid `y` is `0..WORLD_HEIGHT`).
pub const WORLD_HEIGHT: i32 = SECTION_HEIGHT * SECTIONS_PER_CHUNK as i32;

/// Absolute voxel coordinate. `y` is the vertical axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East/west.
    pub x: i32,
    /// Elevation.
    pub y: i32,
    /// North/south.
    pub z: i32,
}

impl BlockPos {
    /// World origin.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Construct a voxel coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Voxel containing a fractional world position.
    pub fn containing(pos: DVec3) -> Self {
        Self::new(
            pos.x.floor() as i32,
            pos.y.floor() as i32,
            pos.z.floor() as i32,
        )
    }

    /// Shift by a delta.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The voxel directly above.
    pub const fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The voxel directly below.
    pub const fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Chunk column that owns this voxel.
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(CHUNK_WIDTH),
            self.z.div_euclid(CHUNK_WIDTH),
        )
    }

    /// Position relative to the owning chunk column, `x`/`z` in `0..16`.
    pub fn local(self) -> (usize, i32, usize) {
        (
            self.x.rem_euclid(CHUNK_WIDTH) as usize,
            self.y,
            self.z.rem_euclid(CHUNK_WIDTH) as usize,
        )
    }

    /// Whether `y` lies inside the world's vertical range.
    pub fn in_world_height(self) -> bool {
        (0..WORLD_HEIGHT).contains(&self.y)
    }

    /// Centre of the voxel's floor, used when standing on a voxel.
    pub fn bottom_center(self) -> DVec3 {
        DVec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    /// Convert to a glam vector.
    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl Add<IVec3> for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: IVec3) -> BlockPos {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = IVec3;

    fn sub(self, rhs: BlockPos) -> IVec3 {
        self.as_ivec3() - rhs.as_ivec3()
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Chunk column coordinate (X,Z) in chunk space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ChunkPos {
    /// Column X.
    pub x: i32,
    /// Column Z.
    pub z: i32,
}

impl ChunkPos {
    /// Construct a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World coordinate of the column's (0, y, 0) corner.
    pub fn block(self, local_x: usize, y: i32, local_z: usize) -> BlockPos {
        BlockPos::new(
            self.x * CHUNK_WIDTH + local_x as i32,
            y,
            self.z * CHUNK_WIDTH + local_z as i32,
        )
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Convert the protocol's 1/32-block fixed-point integer to world units.
pub fn from_fixed(value: i32) -> f64 {
    value as f64 / 32.0
}

/// Convert a world unit to the protocol's 1/32-block fixed-point integer.
pub fn to_fixed(value: f64) -> i32 {
    (value * 32.0).floor() as i32
}

/// Convert a fixed-point triple into a world position.
pub fn fixed_to_vec(x: i32, y: i32, z: i32) -> DVec3 {
    DVec3::new(from_fixed(x), from_fixed(y), from_fixed(z))
}

/// Relative moves carry signed bytes in the same 1/32 fixed-point unit.
pub fn relative_to_vec(dx: i8, dy: i8, dz: i8) -> DVec3 {
    DVec3::new(
        from_fixed(dx as i32),
        from_fixed(dy as i32),
        from_fixed(dz as i32),
    )
}

/// Packed rotation (256 steps per turn) to degrees.
pub fn angle_to_degrees(angle: i8) -> f32 {
    (angle as u8) as f32 * 360.0 / 256.0
}

/// Degrees to packed rotation (256 steps per turn).
pub fn degrees_to_angle(degrees: f32) -> i8 {
    let steps = (degrees.rem_euclid(360.0) * 256.0 / 360.0).round() as u32;
    (steps % 256) as u8 as i8
}

/// The eight horizontal step directions, laid out like the `yubn`/`hjkl`
/// roguelike keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    /// -Z
    North,
    /// +X -Z
    NorthEast,
    /// +X
    East,
    /// +X +Z
    SouthEast,
    /// +Z
    South,
    /// -X +Z
    SouthWest,
    /// -X
    West,
    /// -X -Z
    NorthWest,
}

impl Compass {
    /// All directions, clockwise from north.
    pub const ALL: [Compass; 8] = [
        Compass::North,
        Compass::NorthEast,
        Compass::East,
        Compass::SouthEast,
        Compass::South,
        Compass::SouthWest,
        Compass::West,
        Compass::NorthWest,
    ];

    /// Horizontal voxel delta `(dx, dz)`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Compass::North => (0, -1),
            Compass::NorthEast => (1, -1),
            Compass::East => (1, 0),
            Compass::SouthEast => (1, 1),
            Compass::South => (0, 1),
            Compass::SouthWest => (-1, 1),
            Compass::West => (-1, 0),
            Compass::NorthWest => (-1, -1),
        }
    }

    /// Yaw in degrees as the server measures it (0 = facing +Z, 90 = facing -X).
    pub const fn yaw(self) -> f32 {
        match self {
            Compass::South => 0.0,
            Compass::SouthWest => 45.0,
            Compass::West => 90.0,
            Compass::NorthWest => 135.0,
            Compass::North => 180.0,
            Compass::NorthEast => -135.0,
            Compass::East => -90.0,
            Compass::SouthEast => -45.0,
        }
    }

    /// Block face index (`PlayerDigging`/`PlayerBlockPlacement`) that faces back
    /// toward a player stepping in this direction, for cardinal directions.
    pub const fn facing_face(self) -> Option<u8> {
        match self {
            Compass::North => Some(3),
            Compass::South => Some(2),
            Compass::West => Some(5),
            Compass::East => Some(4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coordinates_map_to_correct_chunk() {
        let pos = BlockPos::new(-1, 70, -17);
        assert_eq!(pos.chunk(), ChunkPos::new(-1, -2));
        assert_eq!(pos.local(), (15, 70, 15));
    }

    #[test]
    fn chunk_block_inverts_local() {
        let pos = BlockPos::new(-33, 12, 47);
        let (lx, y, lz) = pos.local();
        assert_eq!(pos.chunk().block(lx, y, lz), pos);
    }

    #[test]
    fn fixed_point_conversions() {
        assert_eq!(from_fixed(32), 1.0);
        assert_eq!(from_fixed(-16), -0.5);
        assert_eq!(to_fixed(1.5), 48);
        assert_eq!(BlockPos::containing(fixed_to_vec(-16, 160, 40)), BlockPos::new(-1, 5, 1));
    }

    #[test]
    fn angles_wrap() {
        assert_eq!(degrees_to_angle(0.0), 0);
        assert_eq!(degrees_to_angle(360.0), 0);
        assert_eq!(degrees_to_angle(180.0), -128);
        assert!((angle_to_degrees(64) - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn compass_deltas_are_unit_steps() {
        for dir in Compass::ALL {
            let (dx, dz) = dir.delta();
            assert!(dx.abs() <= 1 && dz.abs() <= 1);
            assert!(dx != 0 || dz != 0);
        }
    }
}
