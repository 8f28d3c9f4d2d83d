//! The chunk manager facade: one object owning the store, the deferred
//! edits, and the stream worker, with the frame-facing API the rest of the
//! engine talks to.

use std::sync::Arc;
use std::time::Duration;

use glam::{IVec3, UVec3, Vec3};

use voxide_config::Config;
use voxide_coords::{GridCoord, block_from_world, split_block};
use voxide_voxel::{Chunk, Colour, ImportDirection, VoxelMatrix};

use crate::deferred::DeferredEditStore;
use crate::error::WorldError;
use crate::import::{ImportStats, import_matrix};
use crate::store::{CellWrite, ChunkHandle, ChunkStore};
use crate::worker::{StreamShared, StreamWorker};

/// What the world knows about a single block position.
pub struct BlockQuery {
    /// Whether the cell holds an active voxel.
    pub active: bool,
    /// The queried position in global block coordinates.
    pub block: IVec3,
    /// Grid coordinate of the chunk containing the block.
    pub grid: GridCoord,
    /// Cell offset within that chunk.
    pub local: UVec3,
    /// Handle to the containing chunk.
    pub chunk: ChunkHandle,
}

/// Counters describing streaming activity so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Completed stream worker passes.
    pub passes: u64,
    /// Chunks created since startup.
    pub created: u64,
    /// Chunks unloaded since startup.
    pub unloaded: u64,
    /// Chunks currently resident.
    pub loaded: usize,
    /// Coordinates with pending deferred-edit records.
    pub pending_edits: usize,
}

/// Owns the resident chunk set and the background worker streaming it.
///
/// Dropping the manager shuts the worker down and joins it before the store
/// is released.
pub struct ChunkManager {
    store: Arc<ChunkStore>,
    deferred: Arc<DeferredEditStore>,
    shared: Arc<StreamShared>,
    worker: StreamWorker,
}

impl ChunkManager {
    /// Builds the manager and spawns the stream worker per `config`.
    pub fn new(config: &Config) -> Result<Self, WorldError> {
        let deferred = Arc::new(DeferredEditStore::new());
        let store = Arc::new(ChunkStore::new(
            Arc::clone(&deferred),
            config.debug.wireframe,
            config.debug.face_merging,
        ));
        let shared = Arc::new(StreamShared::new(
            config.streaming.loader_radius,
            config.debug.step_lock,
        ));
        let worker = StreamWorker::spawn(
            Arc::clone(&store),
            Arc::clone(&shared),
            Duration::from_millis(config.streaming.tick_interval_ms),
        )?;
        tracing::info!(
            loader_radius = config.streaming.loader_radius,
            step_lock = config.debug.step_lock,
            "chunk manager started"
        );
        Ok(Self {
            store,
            deferred,
            shared,
            worker,
        })
    }

    /// Records the player's position and wakes the worker. Call once per
    /// frame.
    pub fn update(&self, player_position: Vec3) {
        self.shared.set_player_position(player_position);
        self.worker.signal();
    }

    /// Sets the loader radius in world units; takes effect on the next pass.
    pub fn set_loader_radius(&self, radius: f32) {
        self.shared.set_loader_radius(radius);
    }

    /// The loader radius in world units.
    pub fn loader_radius(&self) -> f32 {
        self.shared.loader_radius()
    }

    /// Engages or releases the streaming step lock.
    pub fn set_step_lock_enabled(&self, enabled: bool) {
        self.shared.set_step_lock_enabled(enabled);
    }

    /// Whether the step lock is engaged.
    pub fn step_lock_enabled(&self) -> bool {
        self.shared.step_locked()
    }

    /// Releases exactly one streaming pass while step-locked.
    pub fn step_next_update(&self) {
        self.shared.step_next_update();
        self.worker.signal();
    }

    /// Looks up the chunk at a grid coordinate.
    pub fn chunk(&self, x: i32, y: i32, z: i32) -> Option<ChunkHandle> {
        self.store.get(GridCoord::new(x, y, z))
    }

    /// Looks up the chunk containing a world position.
    pub fn chunk_from_position(&self, pos: Vec3) -> Option<ChunkHandle> {
        self.store.get_from_world(pos)
    }

    /// Creates (or fetches) the chunk at a grid coordinate.
    pub fn create_chunk(&self, coord: GridCoord) -> ChunkHandle {
        self.store.create(coord)
    }

    /// Unloads the chunk at a grid coordinate; no-op when absent.
    pub fn unload_chunk(&self, coord: GridCoord) {
        self.store.unload(coord);
    }

    /// Resolves a world position to its block and reports the cell's state.
    ///
    /// Returns `None` when the containing chunk is not resident.
    pub fn block_at_position(&self, pos: Vec3) -> Option<BlockQuery> {
        let block = block_from_world(pos);
        let (grid, local) = split_block(block);
        let chunk = self.store.get(grid)?;
        let active = chunk.read(|c| c.is_active(local));
        Some(BlockQuery {
            active,
            block,
            grid,
            local,
            chunk,
        })
    }

    /// Writes a single voxel, deferring it when the chunk is absent.
    pub fn set_voxel(&self, coord: GridCoord, local: UVec3, colour: Colour) -> CellWrite {
        self.store.apply_voxel(coord, local, colour)
    }

    /// Stamps a voxel matrix into the world.
    pub fn import(
        &self,
        matrix: &VoxelMatrix,
        position: Vec3,
        direction: ImportDirection,
    ) -> Result<ImportStats, WorldError> {
        import_matrix(&self.store, matrix, position, direction)
    }

    /// Toggles wireframe rendering for current and future chunks.
    pub fn set_wireframe(&self, wireframe: bool) {
        self.store.set_wireframe(wireframe);
    }

    /// Whether wireframe rendering is on.
    pub fn wireframe(&self) -> bool {
        self.store.wireframe()
    }

    /// Toggles face merging for current and future chunks.
    pub fn set_face_merging(&self, face_merging: bool) {
        self.store.set_face_merging(face_merging);
    }

    /// Whether face merging is on.
    pub fn face_merging(&self) -> bool {
        self.store.face_merging()
    }

    /// Visits every resident chunk in grid-coordinate order.
    ///
    /// Iterates a consistent snapshot; chunks created or unloaded during the
    /// walk are picked up next frame.
    pub fn for_each_chunk(&self, mut f: impl FnMut(GridCoord, &Chunk)) {
        for (coord, handle) in self.store.snapshot() {
            handle.read(|chunk| f(coord, chunk));
        }
    }

    /// Number of resident chunks.
    pub fn loaded_count(&self) -> usize {
        self.store.loaded_count()
    }

    /// Current streaming counters.
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            passes: self.shared.passes(),
            created: self.store.created_total(),
            unloaded: self.store.unloaded_total(),
            loaded: self.store.loaded_count(),
            pending_edits: self.deferred.pending_count(),
        }
    }

    /// Whether the stream worker thread is still running.
    pub fn is_worker_alive(&self) -> bool {
        self.worker.is_alive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use voxide_coords::CHUNK_WORLD_SIZE;

    fn test_config(loader_radius: f32, step_lock: bool) -> Config {
        let mut config = Config::default();
        config.streaming.loader_radius = loader_radius;
        config.streaming.tick_interval_ms = 2;
        config.debug.step_lock = step_lock;
        config
    }

    fn wait_until(deadline_ms: u64, mut cond: impl FnMut() -> bool) {
        let start = Instant::now();
        while !cond() {
            assert!(
                start.elapsed().as_millis() < u128::from(deadline_ms),
                "timed out waiting for condition"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_update_streams_chunks_around_player() {
        let manager = ChunkManager::new(&test_config(CHUNK_WORLD_SIZE, false)).unwrap();
        manager.update(Vec3::ZERO);

        wait_until(2_000, || manager.stats().passes >= 1);
        assert!(manager.chunk(0, 0, 0).is_some());
        assert!(manager.chunk(0, 1, 0).is_some());
        assert!(manager.is_worker_alive());
        assert!(manager.stats().loaded >= 7);
    }

    #[test]
    fn test_step_lock_from_config_holds_streaming() {
        let manager = ChunkManager::new(&test_config(CHUNK_WORLD_SIZE, true)).unwrap();
        assert!(manager.step_lock_enabled());
        manager.update(Vec3::ZERO);

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(manager.stats().passes, 0);
        assert_eq!(manager.loaded_count(), 0);

        manager.step_next_update();
        wait_until(2_000, || manager.stats().passes == 1);
        assert!(manager.loaded_count() > 0);
        assert!(manager.step_lock_enabled());

        // Releasing the lock resumes free running.
        manager.set_step_lock_enabled(false);
        manager.update(Vec3::ZERO);
        wait_until(2_000, || manager.stats().passes > 1);
    }

    #[test]
    fn test_block_query_resolves_position() {
        let manager = ChunkManager::new(&test_config(0.0, true)).unwrap();
        let coord = GridCoord::new(0, 0, 0);
        manager.create_chunk(coord);

        let pos = Vec3::new(2.5, 3.5, 4.5);
        let query = manager
            .block_at_position(pos)
            .expect("chunk should be resident");
        assert!(!query.active);
        assert_eq!(query.block, IVec3::new(2, 3, 4));
        assert_eq!(query.grid, coord);
        assert_eq!(query.local, UVec3::new(2, 3, 4));

        manager.set_voxel(coord, UVec3::new(2, 3, 4), Colour(0xFF00FF00));
        let query = manager.block_at_position(pos).unwrap();
        assert!(query.active);
        assert!(manager.block_at_position(Vec3::splat(100.0)).is_none());
    }

    #[test]
    fn test_import_then_stream_in_materializes_edits() {
        let manager = ChunkManager::new(&test_config(CHUNK_WORLD_SIZE, true)).unwrap();

        let mut matrix = VoxelMatrix::new(UVec3::ONE);
        matrix.set(UVec3::ZERO, Colour(7));
        let stats = manager
            .import(&matrix, Vec3::new(1.0, 2.0, 3.0), ImportDirection::Normal)
            .unwrap();
        assert_eq!(stats.deferred, 1);
        assert_eq!(manager.stats().pending_edits, 1);

        manager.update(Vec3::ZERO);
        manager.step_next_update();
        wait_until(2_000, || manager.chunk(0, 0, 0).is_some());

        let chunk = manager.chunk(0, 0, 0).unwrap();
        chunk.read(|c| {
            assert!(c.is_active(UVec3::new(1, 2, 3)));
            assert_eq!(c.cell(UVec3::new(1, 2, 3)).colour, Colour(7));
        });
        assert_eq!(manager.stats().pending_edits, 0);
    }

    #[test]
    fn test_for_each_chunk_visits_in_coordinate_order() {
        let manager = ChunkManager::new(&test_config(0.0, true)).unwrap();
        manager.create_chunk(GridCoord::new(1, 0, 0));
        manager.create_chunk(GridCoord::new(-1, 0, 0));
        manager.create_chunk(GridCoord::new(0, 0, 0));

        let mut visited = Vec::new();
        manager.for_each_chunk(|coord, chunk| {
            assert_eq!(chunk.grid(), coord);
            visited.push(coord);
        });
        assert_eq!(
            visited,
            vec![
                GridCoord::new(-1, 0, 0),
                GridCoord::new(0, 0, 0),
                GridCoord::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_render_mode_toggles_reach_chunks() {
        let manager = ChunkManager::new(&test_config(0.0, true)).unwrap();
        let handle = manager.create_chunk(GridCoord::new(0, 0, 0));

        manager.set_wireframe(true);
        manager.set_face_merging(false);
        assert!(manager.wireframe());
        assert!(!manager.face_merging());
        handle.read(|chunk| {
            assert!(chunk.wireframe());
            assert!(!chunk.face_merging());
        });
    }

    #[test]
    fn test_drop_joins_worker_cleanly() {
        let manager = ChunkManager::new(&test_config(CHUNK_WORLD_SIZE, false)).unwrap();
        manager.update(Vec3::ZERO);
        wait_until(2_000, || manager.loaded_count() > 0);
        drop(manager);
    }
}
