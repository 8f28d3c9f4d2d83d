//! Placement transforms applied when importing a voxel matrix into the world.
//!
//! An [`ImportDirection`] selects one of the mirror/rotation transforms a
//! caller can place a matrix with: identity, a mirror across each axis, and
//! 90°/180°/270° rotations about each axis. Mirrors reflect the relevant
//! local axis across the matrix extent; rotations permute and negate axis
//! pairs by the standard 90°-step rule, swapping the corresponding extent
//! axes.

use glam::UVec3;

/// A placement transform for matrix import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImportDirection {
    /// Place the matrix as decoded.
    #[default]
    Normal,
    /// Mirror across the X axis.
    MirrorX,
    /// Mirror across the Y axis.
    MirrorY,
    /// Mirror across the Z axis.
    MirrorZ,
    /// Rotate 90° about the Y axis.
    RotateY90,
    /// Rotate 180° about the Y axis.
    RotateY180,
    /// Rotate 270° about the Y axis.
    RotateY270,
    /// Rotate 90° about the X axis.
    RotateX90,
    /// Rotate 180° about the X axis.
    RotateX180,
    /// Rotate 270° about the X axis.
    RotateX270,
    /// Rotate 90° about the Z axis.
    RotateZ90,
    /// Rotate 180° about the Z axis.
    RotateZ180,
    /// Rotate 270° about the Z axis.
    RotateZ270,
}

impl ImportDirection {
    /// All directions, in declaration order.
    pub const ALL: [ImportDirection; 13] = [
        ImportDirection::Normal,
        ImportDirection::MirrorX,
        ImportDirection::MirrorY,
        ImportDirection::MirrorZ,
        ImportDirection::RotateY90,
        ImportDirection::RotateY180,
        ImportDirection::RotateY270,
        ImportDirection::RotateX90,
        ImportDirection::RotateX180,
        ImportDirection::RotateX270,
        ImportDirection::RotateZ90,
        ImportDirection::RotateZ180,
        ImportDirection::RotateZ270,
    ];

    /// The extent of a matrix after this transform.
    ///
    /// 90°/270° rotations swap the two extent axes perpendicular to the
    /// rotation axis; everything else preserves the extent.
    pub const fn transformed_extent(self, extent: UVec3) -> UVec3 {
        match self {
            ImportDirection::RotateY90 | ImportDirection::RotateY270 => {
                UVec3::new(extent.z, extent.y, extent.x)
            }
            ImportDirection::RotateX90 | ImportDirection::RotateX270 => {
                UVec3::new(extent.x, extent.z, extent.y)
            }
            ImportDirection::RotateZ90 | ImportDirection::RotateZ270 => {
                UVec3::new(extent.y, extent.x, extent.z)
            }
            _ => extent,
        }
    }

    /// Maps a source cell coordinate to its transformed coordinate.
    ///
    /// `extent` is the source matrix extent; `cell` must lie within it. The
    /// result lies within [`transformed_extent`](Self::transformed_extent).
    pub const fn apply(self, extent: UVec3, cell: UVec3) -> UVec3 {
        let (sx, sy, sz) = (extent.x, extent.y, extent.z);
        let (x, y, z) = (cell.x, cell.y, cell.z);
        match self {
            ImportDirection::Normal => UVec3::new(x, y, z),
            ImportDirection::MirrorX => UVec3::new(sx - 1 - x, y, z),
            ImportDirection::MirrorY => UVec3::new(x, sy - 1 - y, z),
            ImportDirection::MirrorZ => UVec3::new(x, y, sz - 1 - z),
            ImportDirection::RotateY90 => UVec3::new(z, y, sx - 1 - x),
            ImportDirection::RotateY180 => UVec3::new(sx - 1 - x, y, sz - 1 - z),
            ImportDirection::RotateY270 => UVec3::new(sz - 1 - z, y, x),
            ImportDirection::RotateX90 => UVec3::new(x, z, sy - 1 - y),
            ImportDirection::RotateX180 => UVec3::new(x, sy - 1 - y, sz - 1 - z),
            ImportDirection::RotateX270 => UVec3::new(x, sz - 1 - z, y),
            ImportDirection::RotateZ90 => UVec3::new(y, sx - 1 - x, z),
            ImportDirection::RotateZ180 => UVec3::new(sx - 1 - x, sy - 1 - y, z),
            ImportDirection::RotateZ270 => UVec3::new(sy - 1 - y, x, z),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
