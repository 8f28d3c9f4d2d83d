//! World error types.

use glam::UVec3;

/// Errors produced by the chunk streaming subsystem.
///
/// Not-found lookups are expected outcomes and are expressed as `Option`
/// results, never as errors.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A voxel matrix with a zero-sized axis was handed to the importer.
    #[error("voxel matrix has a degenerate extent {extent}")]
    DegenerateMatrix {
        /// The rejected extent.
        extent: UVec3,
    },

    /// The OS refused to spawn the stream worker thread.
    #[error("failed to spawn stream worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
