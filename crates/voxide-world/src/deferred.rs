//! Deferred edits for chunks that have not been created yet.
//!
//! When a voxel write targets a grid coordinate with no live chunk, the edit
//! is parked here as a sparse record and applied the moment the chunk is
//! created. Records store only the cells that were explicitly touched; most
//! of the world is never edited before it is generated.
//!
//! The store has its own lock, distinct from the chunk map's. Whenever both
//! are needed the chunk map lock is taken first, never the reverse.

use std::sync::Mutex;

use glam::UVec3;
use rustc_hash::FxHashMap;

use voxide_coords::{CHUNK_SIZE, GridCoord};
use voxide_voxel::Colour;

/// Sparse pending edits for a single not-yet-created chunk.
#[derive(Clone, Debug, Default)]
pub struct DeferredEdits {
    cells: FxHashMap<UVec3, Colour>,
}

impl DeferredEdits {
    /// Records a cell edit; a later edit to the same cell wins.
    fn set(&mut self, local: UVec3, colour: Colour) {
        self.cells.insert(local, colour);
    }

    /// Iterates over the recorded `(local offset, colour)` edits.
    pub fn cells(&self) -> impl Iterator<Item = (UVec3, Colour)> + '_ {
        self.cells.iter().map(|(&local, &colour)| (local, colour))
    }

    /// Number of recorded cell edits.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cells have been recorded.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Collection of [`DeferredEdits`] records keyed by grid coordinate.
///
/// A record is created lazily on first edit and consumed exactly once, by
/// [`take`](Self::take), when the corresponding chunk is created.
#[derive(Debug, Default)]
pub struct DeferredEditStore {
    records: Mutex<FxHashMap<GridCoord, DeferredEdits>>,
}

impl DeferredEditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cell edit for a chunk that does not exist yet.
    ///
    /// Creates the record on first use. Racing writers targeting the same
    /// cell resolve last-write-wins: a single sparse record per coordinate,
    /// one colour per cell.
    pub fn set_cell(&self, coord: GridCoord, local: UVec3, colour: Colour) {
        debug_assert!(
            local.max_element() < CHUNK_SIZE as u32,
            "deferred cell offset out of range: {local}"
        );
        let mut records = self.records.lock().unwrap();
        records.entry(coord).or_default().set(local, colour);
    }

    /// Atomically removes and returns the record for `coord`, if any.
    ///
    /// Called exactly once per chunk creation; returns `None` (leaving no
    /// trace) when nothing was deferred for the coordinate.
    pub fn take(&self, coord: GridCoord) -> Option<DeferredEdits> {
        self.records.lock().unwrap().remove(&coord)
    }

    /// Discards the record for `coord`, if any.
    ///
    /// Used when a pending record is superseded, e.g. a re-import before the
    /// chunk ever materializes.
    pub fn remove(&self, coord: GridCoord) {
        self.records.lock().unwrap().remove(&coord);
    }

    /// Whether a record is pending for `coord`.
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.records.lock().unwrap().contains_key(&coord)
    }

    /// Number of coordinates with pending records.
    pub fn pending_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_created_lazily_on_first_edit() {
        let store = DeferredEditStore::new();
        let coord = GridCoord::new(1, 2, 3);
        assert!(!store.contains(coord));

        store.set_cell(coord, UVec3::new(0, 0, 0), Colour(1));
        assert!(store.contains(coord));
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn test_take_consumes_exactly_once() {
        let store = DeferredEditStore::new();
        let coord = GridCoord::new(0, 0, 0);
        store.set_cell(coord, UVec3::new(4, 5, 6), Colour(9));

        let record = store.take(coord).expect("record should be pending");
        assert_eq!(record.len(), 1);
        assert_eq!(
            record.cells().next(),
            Some((UVec3::new(4, 5, 6), Colour(9)))
        );

        // Second take leaves no trace.
        assert!(store.take(coord).is_none());
        assert!(!store.contains(coord));
    }

    #[test]
    fn test_take_absent_returns_none() {
        let store = DeferredEditStore::new();
        assert!(store.take(GridCoord::new(7, 7, 7)).is_none());
    }

    #[test]
    fn test_same_cell_is_last_write_wins() {
        let store = DeferredEditStore::new();
        let coord = GridCoord::new(0, 0, 0);
        let local = UVec3::new(1, 1, 1);

        store.set_cell(coord, local, Colour(1));
        store.set_cell(coord, local, Colour(2));

        let record = store.take(coord).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.cells().next(), Some((local, Colour(2))));
    }

    #[test]
    fn test_records_are_per_coordinate() {
        let store = DeferredEditStore::new();
        store.set_cell(GridCoord::new(0, 0, 0), UVec3::new(0, 0, 0), Colour(1));
        store.set_cell(GridCoord::new(0, 0, 1), UVec3::new(0, 0, 0), Colour(2));
        assert_eq!(store.pending_count(), 2);

        let record = store.take(GridCoord::new(0, 0, 1)).unwrap();
        assert_eq!(record.cells().next(), Some((UVec3::new(0, 0, 0), Colour(2))));
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn test_remove_discards_pending_record() {
        let store = DeferredEditStore::new();
        let coord = GridCoord::new(5, 0, 0);
        store.set_cell(coord, UVec3::new(0, 0, 0), Colour(1));

        store.remove(coord);
        assert!(!store.contains(coord));
        assert!(store.take(coord).is_none());

        // Removing an absent record is a no-op.
        store.remove(coord);
        assert_eq!(store.pending_count(), 0);
    }
}
