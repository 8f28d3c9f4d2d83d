//! The authoritative mapping from [`GridCoord`] to resident [`Chunk`].
//!
//! All map mutation happens under one exclusive lock, held for at most a
//! single chunk's create/unload transaction. Chunks themselves live behind
//! their own mutexes so readers and the stream worker contend per chunk, not
//! per world. The fixed lock order is: chunk map, then deferred-edit store,
//! then an individual chunk, never reversed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use glam::{UVec3, Vec3};
use rustc_hash::FxHashMap;

use voxide_coords::GridCoord;
use voxide_voxel::{Chunk, Colour, Face};

use crate::deferred::DeferredEditStore;

/// Shared access to one resident chunk.
///
/// A handle only exposes closure-scoped access, so borrowed chunk state
/// cannot outlive the call. Handles themselves must not be retained across
/// frames: once the chunk is unloaded a stale handle still reads the orphaned
/// chunk, not the world.
#[derive(Clone)]
pub struct ChunkHandle {
    chunk: Arc<Mutex<Chunk>>,
}

impl ChunkHandle {
    fn new(chunk: Arc<Mutex<Chunk>>) -> Self {
        Self { chunk }
    }

    /// Runs `f` with shared read access to the chunk.
    pub fn read<R>(&self, f: impl FnOnce(&Chunk) -> R) -> R {
        let guard = self.chunk.lock().unwrap();
        f(&guard)
    }

    /// Runs `f` with exclusive write access to the chunk.
    pub fn write<R>(&self, f: impl FnOnce(&mut Chunk) -> R) -> R {
        let mut guard = self.chunk.lock().unwrap();
        f(&mut guard)
    }
}

/// Where [`ChunkStore::apply_voxel`] routed a cell write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellWrite {
    /// The chunk was resident; the cell was written directly.
    Direct,
    /// No chunk was resident; the edit was parked in the deferred store.
    Deferred,
}

/// Owns all currently-resident chunks and the deferred edits feeding them.
pub struct ChunkStore {
    chunks: Mutex<FxHashMap<GridCoord, Arc<Mutex<Chunk>>>>,
    deferred: Arc<DeferredEditStore>,
    wireframe: AtomicBool,
    face_merging: AtomicBool,
    created_total: AtomicU64,
    unloaded_total: AtomicU64,
}

impl ChunkStore {
    /// Creates an empty store with the given render-mode defaults.
    pub fn new(deferred: Arc<DeferredEditStore>, wireframe: bool, face_merging: bool) -> Self {
        Self {
            chunks: Mutex::new(FxHashMap::default()),
            deferred,
            wireframe: AtomicBool::new(wireframe),
            face_merging: AtomicBool::new(face_merging),
            created_total: AtomicU64::new(0),
            unloaded_total: AtomicU64::new(0),
        }
    }

    /// The deferred-edit store consumed by chunk creation.
    pub fn deferred(&self) -> &Arc<DeferredEditStore> {
        &self.deferred
    }

    /// Looks up the chunk at `coord`.
    pub fn get(&self, coord: GridCoord) -> Option<ChunkHandle> {
        let map = self.chunks.lock().unwrap();
        map.get(&coord).cloned().map(ChunkHandle::new)
    }

    /// Looks up the chunk containing the given world position.
    pub fn get_from_world(&self, pos: Vec3) -> Option<ChunkHandle> {
        self.get(GridCoord::from_world(pos))
    }

    /// Creates the chunk at `coord`, or returns the existing one (idempotent).
    ///
    /// Creation wires the six neighbour presence flags both ways and applies
    /// any pending deferred-edit record before the chunk becomes visible in
    /// the map, so no reader ever observes an unseeded chunk. The whole
    /// transaction runs under the map lock; the deferred store lock is
    /// acquired nested inside it (fixed map→deferred order).
    pub fn create(&self, coord: GridCoord) -> ChunkHandle {
        let mut map = self.chunks.lock().unwrap();
        if let Some(existing) = map.get(&coord) {
            return ChunkHandle::new(existing.clone());
        }

        let mut chunk = Chunk::new(
            coord,
            self.wireframe.load(Ordering::Relaxed),
            self.face_merging.load(Ordering::Relaxed),
        );

        // Seed from any pending deferred edits; the record is consumed here,
        // exactly once, atomically with creation.
        if let Some(record) = self.deferred.take(coord) {
            tracing::debug!(?coord, cells = record.len(), "applying deferred edits");
            for (local, colour) in record.cells() {
                chunk.set_cell(local, colour);
            }
        }

        // Wire neighbour presence flags both ways.
        let neighbours = coord.face_neighbours();
        for (face, ncoord) in Face::ALL.into_iter().zip(neighbours) {
            if let Some(neighbour) = map.get(&ncoord) {
                chunk.set_neighbour(face, true);
                neighbour.lock().unwrap().set_neighbour(face.opposite(), true);
            }
        }

        let arc = Arc::new(Mutex::new(chunk));
        map.insert(coord, arc.clone());
        self.created_total.fetch_add(1, Ordering::Relaxed);
        ChunkHandle::new(arc)
    }

    /// Unloads the chunk at `coord`; a silent no-op when absent.
    ///
    /// Clears the six neighbours' back flags before the chunk is dropped, so
    /// a set presence flag never outlives the neighbour it refers to.
    pub fn unload(&self, coord: GridCoord) {
        let mut map = self.chunks.lock().unwrap();
        if map.remove(&coord).is_none() {
            return;
        }

        for (face, ncoord) in Face::ALL.into_iter().zip(coord.face_neighbours()) {
            if let Some(neighbour) = map.get(&ncoord) {
                neighbour
                    .lock()
                    .unwrap()
                    .set_neighbour(face.opposite(), false);
            }
        }
        self.unloaded_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Writes a cell through to the resident chunk, or defers it.
    ///
    /// The present/absent decision and the deferred write happen under the
    /// map lock, so a racing `create` can never strand a deferred record
    /// behind a live chunk.
    pub fn apply_voxel(&self, coord: GridCoord, local: UVec3, colour: Colour) -> CellWrite {
        let map = self.chunks.lock().unwrap();
        match map.get(&coord) {
            Some(chunk) => {
                let chunk = chunk.clone();
                drop(map);
                chunk.lock().unwrap().set_cell(local, colour);
                CellWrite::Direct
            }
            None => {
                self.deferred.set_cell(coord, local, colour);
                CellWrite::Deferred
            }
        }
    }

    /// Takes a consistent snapshot of all resident chunks for iteration.
    ///
    /// The snapshot is captured under the map lock, so concurrent worker
    /// churn can never produce duplicates or half-erased entries in it.
    /// Sorted by grid coordinate for deterministic traversal.
    pub fn snapshot(&self) -> Vec<(GridCoord, ChunkHandle)> {
        let map = self.chunks.lock().unwrap();
        let mut entries: Vec<(GridCoord, ChunkHandle)> = map
            .iter()
            .map(|(&coord, chunk)| (coord, ChunkHandle::new(chunk.clone())))
            .collect();
        drop(map);
        entries.sort_by_key(|(coord, _)| *coord);
        entries
    }

    /// The grid coordinates of all resident chunks.
    pub fn loaded_coords(&self) -> Vec<GridCoord> {
        self.chunks.lock().unwrap().keys().copied().collect()
    }

    /// Number of resident chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.lock().unwrap().len()
    }

    /// Whether a chunk is resident at `coord`.
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.chunks.lock().unwrap().contains_key(&coord)
    }

    /// Sets the wireframe default and broadcasts it to all resident chunks.
    pub fn set_wireframe(&self, wireframe: bool) {
        self.wireframe.store(wireframe, Ordering::Relaxed);
        for (_, handle) in self.snapshot() {
            handle.write(|chunk| chunk.set_wireframe(wireframe));
        }
    }

    /// Sets the face-merging default and broadcasts it to all resident chunks.
    pub fn set_face_merging(&self, face_merging: bool) {
        self.face_merging.store(face_merging, Ordering::Relaxed);
        for (_, handle) in self.snapshot() {
            handle.write(|chunk| chunk.set_face_merging(face_merging));
        }
    }

    /// The stored face-merging default.
    pub fn face_merging(&self) -> bool {
        self.face_merging.load(Ordering::Relaxed)
    }

    /// The stored wireframe default.
    pub fn wireframe(&self) -> bool {
        self.wireframe.load(Ordering::Relaxed)
    }

    /// Total chunks created since construction.
    pub fn created_total(&self) -> u64 {
        self.created_total.load(Ordering::Relaxed)
    }

    /// Total chunks unloaded since construction.
    pub fn unloaded_total(&self) -> u64 {
        self.unloaded_total.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
