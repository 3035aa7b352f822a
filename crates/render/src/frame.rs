//! Rendered output: a grid of cells plus text lines.

use asciicraft_core::BlockPos;
use asciicraft_world::{BlockState, EntityId};

/// Where a column's visible surface lies relative to the view origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthClass {
    /// At head height, one above the origin.
    Above,
    /// At the origin's elevation.
    Level,
    /// This many voxels below the origin (1..=max depth).
    Below(u8),
    /// Nothing solid within range.
    Void,
}

impl DepthClass {
    /// Classify a surface at `surface_y` seen from `origin_y`.
    pub fn from_delta(origin_y: i32, surface_y: i32) -> Self {
        match origin_y - surface_y {
            d if d < 0 => DepthClass::Above,
            0 => DepthClass::Level,
            d => DepthClass::Below(d.min(u8::MAX as i32) as u8),
        }
    }

    /// Voxels below the origin; negative above, `None` for void.
    pub fn depth(self) -> Option<i32> {
        match self {
            DepthClass::Above => Some(-1),
            DepthClass::Level => Some(0),
            DepthClass::Below(n) => Some(n as i32),
            DepthClass::Void => None,
        }
    }
}

/// What an entity marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// The session's own player.
    LocalPlayer,
    /// A tracked entity.
    Entity(EntityId),
}

/// Entity drawn over a cell's terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMarker {
    /// Who the marker stands for.
    pub kind: MarkerKind,
    /// Glyph drawn in place of terrain.
    pub glyph: char,
    /// Entity elevation minus origin elevation.
    pub relative_y: i32,
    /// Entities sharing the cell, this one included.
    pub count: usize,
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Terrain glyph of the visible surface.
    pub glyph: char,
    /// Depth class of the visible surface.
    pub depth: DepthClass,
    /// The visible block, air for void cells.
    pub block: BlockState,
    /// Entity drawn over the terrain.
    pub marker: Option<EntityMarker>,
    /// Camera target in look-around mode.
    pub cursor: bool,
}

impl Cell {
    /// Empty cell with nothing in range.
    pub const VOID: Cell = Cell {
        glyph: ' ',
        depth: DepthClass::Void,
        block: BlockState::AIR,
        marker: None,
        cursor: false,
    };

    /// Glyph to draw: the marker wins over terrain.
    pub fn display_glyph(&self) -> char {
        match self.marker {
            Some(marker) => marker.glyph,
            None => self.glyph,
        }
    }
}

/// A complete projection of one session's world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    origin: BlockPos,
    cells: Vec<Cell>,
    /// Session and player summary.
    pub status: String,
    /// Result of the last examine, if any.
    pub examine: Option<String>,
}

impl Frame {
    /// An all-void frame of `width` x `height` cells centred on `origin`.
    pub fn new(width: usize, height: usize, origin: BlockPos) -> Self {
        Self {
            width,
            height,
            origin,
            cells: vec![Cell::VOID; width * height],
            status: String::new(),
            examine: None,
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// World position the frame is centred on.
    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    /// Grid coordinates of the origin column.
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Cell at a grid position.
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        (col < self.width && row < self.height).then(|| &self.cells[row * self.width + col])
    }

    pub(crate) fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        if col < self.width && row < self.height {
            Some(&mut self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// World column `(x, z)` shown at a grid position.
    pub fn world_column(&self, col: usize, row: usize) -> (i32, i32) {
        let (cx, cz) = self.center();
        (
            self.origin.x + col as i32 - cx as i32,
            self.origin.z + row as i32 - cz as i32,
        )
    }

    /// Grid position showing world column `(x, z)`, if inside the frame.
    pub fn grid_of(&self, x: i32, z: i32) -> Option<(usize, usize)> {
        let (cx, cz) = self.center();
        let col = x - self.origin.x + cx as i32;
        let row = z - self.origin.z + cz as i32;
        let inside = (0..self.width as i32).contains(&col) && (0..self.height as i32).contains(&row);
        inside.then_some((col as usize, row as usize))
    }

    /// Cell at an `(x, z)` offset from the origin column.
    pub fn at_offset(&self, dx: i32, dz: i32) -> Option<&Cell> {
        let (col, row) = self.grid_of(self.origin.x + dx, self.origin.z + dz)?;
        self.cell(col, row)
    }

    /// Rows of cells, top (north) first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Plain-text rendering: grid rows, then the status and examine lines.
    pub fn to_text(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rows()
            .map(|row| row.iter().map(Cell::display_glyph).collect())
            .collect();
        lines.push(self.status.clone());
        if let Some(examine) = &self.examine {
            lines.push(examine.clone());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_classes() {
        assert_eq!(DepthClass::from_delta(64, 65), DepthClass::Above);
        assert_eq!(DepthClass::from_delta(64, 64), DepthClass::Level);
        assert_eq!(DepthClass::from_delta(64, 61), DepthClass::Below(3));
        assert_eq!(DepthClass::Below(3).depth(), Some(3));
        assert_eq!(DepthClass::Void.depth(), None);
    }

    #[test]
    fn grid_and_world_columns_agree() {
        let frame = Frame::new(11, 7, BlockPos::new(-4, 70, 9));
        assert_eq!(frame.center(), (5, 3));
        assert_eq!(frame.world_column(5, 3), (-4, 9));
        assert_eq!(frame.world_column(0, 0), (-9, 6));
        assert_eq!(frame.grid_of(-9, 6), Some((0, 0)));
        assert_eq!(frame.grid_of(2, 9), None);
        assert!(frame.at_offset(5, 3).is_some());
        assert!(frame.at_offset(6, 0).is_none());
    }

    #[test]
    fn text_has_grid_then_status() {
        let mut frame = Frame::new(3, 2, BlockPos::ORIGIN);
        frame.status = "status".into();
        frame.examine = Some("stone".into());
        let text = frame.to_text();
        assert_eq!(text, vec!["   ", "   ", "status", "stone"]);
    }
}
