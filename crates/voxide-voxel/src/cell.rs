//! Fixed-volume cell storage for 16×16×16 chunks.
//!
//! [`CellGrid`] owns one chunk's worth of `{active, colour}` cells in a flat
//! array with linear indexing. Out-of-bounds access is handled gracefully
//! without panics: reads return an inactive cell, writes are ignored with a
//! warning log.

use glam::UVec3;

use voxide_coords::CHUNK_SIZE;

/// Total number of cells in a chunk (16³).
pub const CELL_GRID_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// A 32-bit RGBA voxel colour, packed `r | g << 8 | b << 16 | a << 24`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Colour(pub u32);

impl Colour {
    /// Packs four 8-bit channels into a colour.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(r as u32 | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
    }

    /// Red channel.
    pub const fn r(self) -> u8 {
        self.0 as u8
    }

    /// Green channel.
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn b(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Alpha channel.
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// One voxel cell: an active flag plus its colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Whether the cell holds a solid voxel.
    pub active: bool,
    /// The cell's colour; meaningful only while `active`.
    pub colour: Colour,
}

impl Cell {
    /// An inactive cell.
    pub const EMPTY: Cell = Cell {
        active: false,
        colour: Colour(0),
    };
}

/// Flat cell storage for one 16×16×16 chunk.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<Cell>,
    active_count: usize,
}

impl CellGrid {
    /// Creates a grid with every cell inactive.
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::EMPTY; CELL_GRID_VOLUME],
            active_count: 0,
        }
    }

    /// Returns the cell at `local`, or an inactive cell when out of bounds.
    pub fn get(&self, local: UVec3) -> Cell {
        match Self::linear_index(local) {
            Some(index) => self.cells[index],
            None => {
                tracing::warn!("CellGrid::get out of bounds: {local}");
                Cell::EMPTY
            }
        }
    }

    /// Returns whether the cell at `local` is active (false when out of bounds).
    pub fn is_active(&self, local: UVec3) -> bool {
        self.get(local).active
    }

    /// Activates the cell at `local` with the given colour.
    ///
    /// No-op with a warning log when `local` is out of bounds.
    pub fn set(&mut self, local: UVec3, colour: Colour) {
        let Some(index) = Self::linear_index(local) else {
            tracing::warn!("CellGrid::set out of bounds: {local}");
            return;
        };
        if !self.cells[index].active {
            self.active_count += 1;
        }
        self.cells[index] = Cell {
            active: true,
            colour,
        };
    }

    /// Deactivates the cell at `local`. No-op when out of bounds or inactive.
    pub fn clear(&mut self, local: UVec3) {
        let Some(index) = Self::linear_index(local) else {
            tracing::warn!("CellGrid::clear out of bounds: {local}");
            return;
        };
        if self.cells[index].active {
            self.active_count -= 1;
        }
        self.cells[index] = Cell::EMPTY;
    }

    /// Activates every cell with the given colour.
    pub fn fill(&mut self, colour: Colour) {
        self.cells.fill(Cell {
            active: true,
            colour,
        });
        self.active_count = CELL_GRID_VOLUME;
    }

    /// Number of active cells.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Maps a local offset to its flat index, or `None` when out of bounds.
    fn linear_index(local: UVec3) -> Option<usize> {
        let size = CHUNK_SIZE as u32;
        if local.x >= size || local.y >= size || local.z >= size {
            return None;
        }
        Some((local.x + size * local.y + size * size * local.z) as usize)
    }
}

impl Default for CellGrid {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_fully_inactive() {
        let grid = CellGrid::new();
        assert_eq!(grid.active_count(), 0);
        assert!(!grid.is_active(UVec3::new(0, 0, 0)));
        assert!(!grid.is_active(UVec3::new(15, 15, 15)));
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut grid = CellGrid::new();
        let colour = Colour::from_rgba(200, 100, 50, 255);
        grid.set(UVec3::new(3, 7, 11), colour);

        let cell = grid.get(UVec3::new(3, 7, 11));
        assert!(cell.active);
        assert_eq!(cell.colour, colour);
        // Surrounding cells remain inactive.
        assert!(!grid.is_active(UVec3::new(2, 7, 11)));
        assert!(!grid.is_active(UVec3::new(3, 8, 11)));
    }

    #[test]
    fn test_out_of_bounds_access_does_not_panic() {
        let mut grid = CellGrid::new();
        grid.set(UVec3::new(16, 0, 0), Colour(1));
        grid.set(UVec3::new(0, 200, 0), Colour(1));
        grid.clear(UVec3::new(0, 0, 16));
        assert_eq!(grid.active_count(), 0);
        assert!(!grid.get(UVec3::new(16, 16, 16)).active);
    }

    #[test]
    fn test_active_count_tracks_set_and_clear() {
        let mut grid = CellGrid::new();
        grid.set(UVec3::new(0, 0, 0), Colour(1));
        grid.set(UVec3::new(1, 0, 0), Colour(2));
        assert_eq!(grid.active_count(), 2);

        // Overwriting an active cell doesn't double-count.
        grid.set(UVec3::new(0, 0, 0), Colour(3));
        assert_eq!(grid.active_count(), 2);

        grid.clear(UVec3::new(0, 0, 0));
        assert_eq!(grid.active_count(), 1);
        // Clearing an inactive cell is a no-op.
        grid.clear(UVec3::new(0, 0, 0));
        assert_eq!(grid.active_count(), 1);
    }

    #[test]
    fn test_fill_activates_everything() {
        let mut grid = CellGrid::new();
        grid.fill(Colour(0xFF00FF00));
        assert_eq!(grid.active_count(), CELL_GRID_VOLUME);
        assert!(grid.is_active(UVec3::new(15, 15, 15)));
    }

    #[test]
    fn test_colour_channel_accessors() {
        let colour = Colour::from_rgba(1, 2, 3, 4);
        assert_eq!(colour.r(), 1);
        assert_eq!(colour.g(), 2);
        assert_eq!(colour.b(), 3);
        assert_eq!(colour.a(), 4);
    }
}
