//! Decoded voxel matrices: the in-memory form of an imported model.
//!
//! A [`VoxelMatrix`] is what the file-format loader hands to the import
//! pipeline: a dense grid of optional colours with a known extent. Decoding
//! itself is an external collaborator's job.

use glam::UVec3;

use crate::cell::Colour;

/// A dense 3-D grid of coloured voxels with a fixed extent.
#[derive(Clone, Debug)]
pub struct VoxelMatrix {
    extent: UVec3,
    cells: Vec<Option<Colour>>,
}

impl VoxelMatrix {
    /// Creates an empty matrix with the given extent.
    ///
    /// A zero extent is representable but is rejected by the import pipeline.
    pub fn new(extent: UVec3) -> Self {
        let volume = (extent.x * extent.y * extent.z) as usize;
        Self {
            extent,
            cells: vec![None; volume],
        }
    }

    /// The matrix extent in cells per axis.
    pub fn extent(&self) -> UVec3 {
        self.extent
    }

    /// Whether any axis of the extent is zero.
    pub fn is_degenerate(&self) -> bool {
        self.extent.min_element() == 0
    }

    /// Sets the cell at `pos` to the given colour.
    ///
    /// No-op with a warning log when `pos` is outside the extent.
    pub fn set(&mut self, pos: UVec3, colour: Colour) {
        let Some(index) = self.linear_index(pos) else {
            tracing::warn!("VoxelMatrix::set out of bounds: {pos} (extent {})", self.extent);
            return;
        };
        self.cells[index] = Some(colour);
    }

    /// Clears the cell at `pos`. No-op when out of bounds.
    pub fn clear(&mut self, pos: UVec3) {
        let Some(index) = self.linear_index(pos) else {
            tracing::warn!("VoxelMatrix::clear out of bounds: {pos}");
            return;
        };
        self.cells[index] = None;
    }

    /// Returns the colour at `pos`, or `None` when inactive or out of bounds.
    pub fn get(&self, pos: UVec3) -> Option<Colour> {
        self.cells[self.linear_index(pos)?]
    }

    /// Whether the cell at `pos` is active.
    pub fn is_active(&self, pos: UVec3) -> bool {
        self.get(pos).is_some()
    }

    /// Number of active cells.
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterates over all active cells as `(position, colour)` pairs.
    pub fn active_cells(&self) -> impl Iterator<Item = (UVec3, Colour)> + '_ {
        let extent = self.extent;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let colour = (*cell)?;
            let i = i as u32;
            let x = i % extent.x;
            let y = (i / extent.x) % extent.y;
            let z = i / (extent.x * extent.y);
            Some((UVec3::new(x, y, z), colour))
        })
    }

    fn linear_index(&self, pos: UVec3) -> Option<usize> {
        if pos.x >= self.extent.x || pos.y >= self.extent.y || pos.z >= self.extent.z {
            return None;
        }
        Some((pos.x + self.extent.x * pos.y + self.extent.x * self.extent.y * pos.z) as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut matrix = VoxelMatrix::new(UVec3::new(4, 5, 6));
        matrix.set(UVec3::new(3, 4, 5), Colour(7));
        assert_eq!(matrix.get(UVec3::new(3, 4, 5)), Some(Colour(7)));
        assert_eq!(matrix.get(UVec3::new(0, 0, 0)), None);
        assert_eq!(matrix.active_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_silent() {
        let mut matrix = VoxelMatrix::new(UVec3::new(2, 2, 2));
        matrix.set(UVec3::new(2, 0, 0), Colour(1));
        matrix.clear(UVec3::new(0, 0, 9));
        assert_eq!(matrix.active_count(), 0);
        assert_eq!(matrix.get(UVec3::new(9, 9, 9)), None);
    }

    #[test]
    fn test_degenerate_extent_detected() {
        assert!(VoxelMatrix::new(UVec3::new(0, 3, 3)).is_degenerate());
        assert!(VoxelMatrix::new(UVec3::new(3, 3, 0)).is_degenerate());
        assert!(!VoxelMatrix::new(UVec3::new(1, 1, 1)).is_degenerate());
    }

    #[test]
    fn test_active_cells_yields_every_set_cell_once() {
        let mut matrix = VoxelMatrix::new(UVec3::new(3, 3, 3));
        let positions = [
            UVec3::new(0, 0, 0),
            UVec3::new(2, 1, 0),
            UVec3::new(1, 2, 2),
        ];
        for (i, &pos) in positions.iter().enumerate() {
            matrix.set(pos, Colour(i as u32 + 1));
        }

        let mut seen: Vec<(UVec3, Colour)> = matrix.active_cells().collect();
        seen.sort_by_key(|(_, colour)| colour.0);
        assert_eq!(seen.len(), 3);
        for (i, &pos) in positions.iter().enumerate() {
            assert_eq!(seen[i], (pos, Colour(i as u32 + 1)));
        }
    }

    #[test]
    fn test_clear_removes_cell() {
        let mut matrix = VoxelMatrix::new(UVec3::new(2, 2, 2));
        matrix.set(UVec3::new(1, 1, 1), Colour(5));
        matrix.clear(UVec3::new(1, 1, 1));
        assert!(!matrix.is_active(UVec3::new(1, 1, 1)));
        assert_eq!(matrix.active_count(), 0);
    }
}
