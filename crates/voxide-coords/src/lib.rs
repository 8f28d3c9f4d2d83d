//! Chunk-space addressing and world/block/grid coordinate conversions.
//!
//! A [`GridCoord`] identifies a chunk's position in chunk space and is used
//! as the key of the world's chunk map. Conversions between world positions
//! (metres, `f32`), block coordinates (integer voxel cells) and grid
//! coordinates all use floor division, so a position exactly on a chunk
//! boundary resolves to the higher-indexed chunk, the one whose origin
//! equals that position.

use glam::{IVec3, UVec3, Vec3};

/// Side length of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Half-extent of a single rendered block, in world units.
pub const BLOCK_RENDER_SIZE: f32 = 0.5;

/// Full edge length of one block in world units.
pub const BLOCK_WORLD_SIZE: f32 = BLOCK_RENDER_SIZE * 2.0;

/// Edge length of one chunk in world units.
pub const CHUNK_WORLD_SIZE: f32 = CHUNK_SIZE as f32 * BLOCK_WORLD_SIZE;

/// Integer chunk-space address of a chunk.
///
/// Equality requires all three components to match. The derived ordering is
/// lexicographic over `(x, y, z)`, which gives the total order required for
/// ordered-map keys and deterministic iteration in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Y coordinate.
    pub y: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the grid coordinate containing the given world position.
    ///
    /// Each axis is floor-divided by [`CHUNK_WORLD_SIZE`]; boundary positions
    /// land in the higher-indexed chunk.
    pub fn from_world(pos: Vec3) -> Self {
        Self {
            x: (pos.x / CHUNK_WORLD_SIZE).floor() as i32,
            y: (pos.y / CHUNK_WORLD_SIZE).floor() as i32,
            z: (pos.z / CHUNK_WORLD_SIZE).floor() as i32,
        }
    }

    /// Returns the world-space origin (minimum corner) of this chunk.
    ///
    /// Exact inverse of [`from_world`](Self::from_world) at chunk origins.
    pub fn to_world_origin(self) -> Vec3 {
        Vec3::new(
            self.x as f32 * CHUNK_WORLD_SIZE,
            self.y as f32 * CHUNK_WORLD_SIZE,
            self.z as f32 * CHUNK_WORLD_SIZE,
        )
    }

    /// Returns the grid coordinate offset by `(dx, dy, dz)`.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The six face-adjacent neighbours, in `-x, +x, -y, +y, -z, +z` order.
    ///
    /// The order matches `voxide_voxel::Face` discriminants.
    pub const fn face_neighbours(self) -> [GridCoord; 6] {
        [
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.offset(0, -1, 0),
            self.offset(0, 1, 0),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
        ]
    }

    /// Squared distance to `other` in chunk units.
    pub fn distance_sq(self, other: GridCoord) -> u64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        (dx * dx + dy * dy + dz * dz) as u64
    }
}

/// Returns the integer block coordinate containing the given world position.
///
/// Floor division by [`BLOCK_WORLD_SIZE`], same boundary convention as
/// [`GridCoord::from_world`].
pub fn block_from_world(pos: Vec3) -> IVec3 {
    IVec3::new(
        (pos.x / BLOCK_WORLD_SIZE).floor() as i32,
        (pos.y / BLOCK_WORLD_SIZE).floor() as i32,
        (pos.z / BLOCK_WORLD_SIZE).floor() as i32,
    )
}

/// Splits a world block coordinate into its chunk and the local cell offset
/// within that chunk.
///
/// Uses euclidean division so negative block coordinates still produce local
/// offsets in `[0, CHUNK_SIZE)`.
pub fn split_block(block: IVec3) -> (GridCoord, UVec3) {
    let grid = GridCoord::new(
        block.x.div_euclid(CHUNK_SIZE),
        block.y.div_euclid(CHUNK_SIZE),
        block.z.div_euclid(CHUNK_SIZE),
    );
    let local = UVec3::new(
        block.x.rem_euclid(CHUNK_SIZE) as u32,
        block.y.rem_euclid(CHUNK_SIZE) as u32,
        block.z.rem_euclid(CHUNK_SIZE) as u32,
    );
    (grid, local)
}

/// Reconstructs the world block coordinate from a chunk and local offset.
pub fn join_block(grid: GridCoord, local: UVec3) -> IVec3 {
    IVec3::new(
        grid.x * CHUNK_SIZE + local.x as i32,
        grid.y * CHUNK_SIZE + local.y as i32,
        grid.z * CHUNK_SIZE + local.z as i32,
    )
}

/// World-space centre of the given block coordinate.
pub fn block_centre(block: IVec3) -> Vec3 {
    Vec3::new(
        block.x as f32 * BLOCK_WORLD_SIZE + BLOCK_RENDER_SIZE,
        block.y as f32 * BLOCK_WORLD_SIZE + BLOCK_RENDER_SIZE,
        block.z as f32 * BLOCK_WORLD_SIZE + BLOCK_RENDER_SIZE,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
