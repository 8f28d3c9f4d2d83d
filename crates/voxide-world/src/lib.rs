//! Chunk streaming and storage: the authoritative map of resident chunks,
//! the background stream worker that loads/unloads them around the player,
//! deferred edits for chunks that do not exist yet, and the matrix import
//! pipeline.

mod deferred;
mod error;
mod import;
mod manager;
mod store;
mod worker;

pub use deferred::{DeferredEditStore, DeferredEdits};
pub use error::WorldError;
pub use import::{ImportStats, import_matrix};
pub use manager::{BlockQuery, ChunkManager, StreamStats};
pub use store::{CellWrite, ChunkHandle, ChunkStore};
pub use worker::{StepState, StreamShared, StreamWorker};
