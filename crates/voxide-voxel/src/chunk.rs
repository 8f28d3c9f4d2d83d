//! Chunk wrapper with dirty flags, versioning, render-mode flags, and
//! neighbour presence tracking.
//!
//! A [`Chunk`] owns one [`CellGrid`] plus the derived state the rest of the
//! engine needs: its world origin, a mesh dirty flag, per-chunk render flags,
//! and a [`NeighbourSet`] recording which of its six face neighbours are
//! currently resident. Neighbour entries are a non-owning relation maintained
//! by the chunk store; they carry no access path to the neighbour itself.

use glam::{UVec3, Vec3};

use voxide_coords::GridCoord;

use crate::cell::{Cell, CellGrid, Colour};

/// Dirty-flag bit: chunk mesh needs rebuilding.
pub const MESH_DIRTY: u8 = 0b0000_0001;

/// One of the six axis-aligned chunk faces.
///
/// Discriminants match the neighbour order of
/// [`GridCoord::face_neighbours`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Face {
    /// Towards negative X.
    XMinus = 0,
    /// Towards positive X.
    XPlus = 1,
    /// Towards negative Y.
    YMinus = 2,
    /// Towards positive Y.
    YPlus = 3,
    /// Towards negative Z.
    ZMinus = 4,
    /// Towards positive Z.
    ZPlus = 5,
}

impl Face {
    /// All six faces, in discriminant order.
    pub const ALL: [Face; 6] = [
        Face::XMinus,
        Face::XPlus,
        Face::YMinus,
        Face::YPlus,
        Face::ZMinus,
        Face::ZPlus,
    ];

    /// The face pointing the opposite way.
    pub const fn opposite(self) -> Face {
        match self {
            Face::XMinus => Face::XPlus,
            Face::XPlus => Face::XMinus,
            Face::YMinus => Face::YPlus,
            Face::YPlus => Face::YMinus,
            Face::ZMinus => Face::ZPlus,
            Face::ZPlus => Face::ZMinus,
        }
    }
}

/// Presence flags for a chunk's six face neighbours.
///
/// `true` means a chunk is currently resident on that side. The chunk store
/// sets a flag when the neighbour is created and clears it synchronously when
/// the neighbour is unloaded, so a set flag never outlives the neighbour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighbourSet([bool; 6]);

impl NeighbourSet {
    /// A set with no neighbours present.
    pub const fn empty() -> Self {
        Self([false; 6])
    }

    /// Whether the neighbour on `face` is present.
    pub const fn get(&self, face: Face) -> bool {
        self.0[face as usize]
    }

    /// Records the neighbour on `face` as present or absent.
    pub const fn set(&mut self, face: Face, present: bool) {
        self.0[face as usize] = present;
    }

    /// Number of present neighbours.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&p| p).count()
    }

    /// Clears all six flags.
    pub const fn clear_all(&mut self) {
        self.0 = [false; 6];
    }
}

/// One resident cubic block of voxel state.
#[derive(Clone, Debug)]
pub struct Chunk {
    grid: GridCoord,
    origin: Vec3,
    cells: CellGrid,
    neighbours: NeighbourSet,
    dirty: u8,
    version: u64,
    wireframe: bool,
    face_merging: bool,
}

impl Chunk {
    /// Creates an empty chunk at `grid` with the given render-mode defaults.
    ///
    /// The world origin is derived deterministically from the grid coordinate.
    pub fn new(grid: GridCoord, wireframe: bool, face_merging: bool) -> Self {
        Self {
            grid,
            origin: grid.to_world_origin(),
            cells: CellGrid::new(),
            neighbours: NeighbourSet::empty(),
            dirty: 0,
            version: 0,
            wireframe,
            face_merging,
        }
    }

    /// The chunk's grid coordinate.
    pub fn grid(&self) -> GridCoord {
        self.grid
    }

    /// The chunk's world-space origin (minimum corner).
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns the cell at `local` (inactive when out of bounds).
    pub fn cell(&self, local: UVec3) -> Cell {
        self.cells.get(local)
    }

    /// Whether the cell at `local` is active.
    pub fn is_active(&self, local: UVec3) -> bool {
        self.cells.is_active(local)
    }

    /// Activates the cell at `local` with `colour` and marks the mesh dirty.
    pub fn set_cell(&mut self, local: UVec3, colour: Colour) {
        self.cells.set(local, colour);
        self.dirty |= MESH_DIRTY;
        self.version += 1;
    }

    /// Deactivates the cell at `local` and marks the mesh dirty.
    pub fn clear_cell(&mut self, local: UVec3) {
        self.cells.clear(local);
        self.dirty |= MESH_DIRTY;
        self.version += 1;
    }

    /// Number of active cells.
    pub fn active_count(&self) -> usize {
        self.cells.active_count()
    }

    /// Returns `true` if the specified dirty flag (or combination) is set.
    pub fn is_dirty(&self, flag: u8) -> bool {
        self.dirty & flag == flag
    }

    /// Marks specific dirty flags.
    pub fn mark_dirty(&mut self, flags: u8) {
        self.dirty |= flags;
    }

    /// Clears the specified dirty flag bits.
    pub fn clear_dirty(&mut self, flags: u8) {
        self.dirty &= !flags;
    }

    /// Monotonically increasing mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether this chunk renders as wireframe.
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Sets the wireframe flag, marking the mesh dirty on change.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        if self.wireframe != wireframe {
            self.wireframe = wireframe;
            self.dirty |= MESH_DIRTY;
        }
    }

    /// Whether face merging is enabled for this chunk's mesh builds.
    pub fn face_merging(&self) -> bool {
        self.face_merging
    }

    /// Sets the face-merging flag, marking the mesh dirty on change.
    pub fn set_face_merging(&mut self, face_merging: bool) {
        if self.face_merging != face_merging {
            self.face_merging = face_merging;
            self.dirty |= MESH_DIRTY;
        }
    }

    /// The current neighbour presence flags.
    pub fn neighbours(&self) -> NeighbourSet {
        self.neighbours
    }

    /// Records the neighbour on `face` as present or absent.
    ///
    /// Called by the chunk store only; a change invalidates face-merge
    /// decisions, so the mesh is marked dirty.
    pub fn set_neighbour(&mut self, face: Face, present: bool) {
        if self.neighbours.get(face) != present {
            self.neighbours.set(face, present);
            self.dirty |= MESH_DIRTY;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
