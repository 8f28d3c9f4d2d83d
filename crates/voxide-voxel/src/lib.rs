//! Voxel cell storage, chunk data model, and matrix import transforms.

mod cell;
mod chunk;
mod matrix;
mod transform;

pub use cell::{CELL_GRID_VOLUME, Cell, CellGrid, Colour};
pub use chunk::{Chunk, Face, MESH_DIRTY, NeighbourSet};
pub use matrix::VoxelMatrix;
pub use transform::ImportDirection;
