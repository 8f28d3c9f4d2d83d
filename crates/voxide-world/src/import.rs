//! Imports voxel matrices into the world.
//!
//! An import walks the matrix's active cells, reorients each through the
//! chosen [`ImportDirection`], anchors the result at a world position, and
//! routes every cell through [`ChunkStore::apply_voxel`]. Cells landing in
//! resident chunks are written directly; the rest are parked as deferred
//! edits and materialize when their chunk is created.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashSet;

use voxide_coords::{GridCoord, block_from_world, split_block};
use voxide_voxel::{ImportDirection, VoxelMatrix};

use crate::error::WorldError;
use crate::store::{CellWrite, ChunkStore};

/// Outcome of a matrix import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Cells written directly into resident chunks.
    pub placed: u32,
    /// Cells parked in the deferred-edit store.
    pub deferred: u32,
    /// Distinct resident chunks that received direct writes.
    pub chunks_touched: u32,
}

/// Stamps `matrix` into the world anchored at `position`, reoriented by
/// `direction`.
///
/// The anchor is the world position of the matrix's minimum corner after
/// reorientation; inactive matrix cells leave the world untouched. Cells
/// sharing a target resolve last-write-wins in matrix iteration order.
pub fn import_matrix(
    store: &ChunkStore,
    matrix: &VoxelMatrix,
    position: Vec3,
    direction: ImportDirection,
) -> Result<ImportStats, WorldError> {
    if matrix.is_degenerate() {
        return Err(WorldError::DegenerateMatrix {
            extent: matrix.extent(),
        });
    }

    let extent = matrix.extent();
    let base = block_from_world(position);

    let mut stats = ImportStats::default();
    let mut touched: FxHashSet<GridCoord> = FxHashSet::default();
    for (cell, colour) in matrix.active_cells() {
        let oriented = direction.apply(extent, cell);
        let block = base + IVec3::new(oriented.x as i32, oriented.y as i32, oriented.z as i32);
        let (coord, local) = split_block(block);
        match store.apply_voxel(coord, local, colour) {
            CellWrite::Direct => {
                stats.placed += 1;
                if touched.insert(coord) {
                    stats.chunks_touched += 1;
                }
            }
            CellWrite::Deferred => stats.deferred += 1,
        }
    }

    tracing::debug!(
        ?direction,
        placed = stats.placed,
        deferred = stats.deferred,
        chunks = stats.chunks_touched,
        "matrix import complete"
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
