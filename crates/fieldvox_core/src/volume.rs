//! The output volume: a regular 3D grid of voxels.

use fieldvox_data::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// Numeric precision of the exported scalar. Chosen by the caller; the
/// engine always samples in f32 and the writer converts on export.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScalarPrecision {
    U8,
    U16,
    U32,
    F32,
}

impl ScalarPrecision {
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// Geometry of the output grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VolumeDescriptor {
    /// World position of the grid's minimum corner.
    pub origin: Vec3,
    /// Isotropic voxel edge length in world units.
    pub spacing: f32,
    /// Voxel count per axis (x, y, z).
    pub resolution: [usize; 3],
    /// Export precision, supplied by the caller.
    pub precision: ScalarPrecision,
}

impl VolumeDescriptor {
    /// A cubic grid of `voxels` per side covering `bbox`: origin at the box
    /// minimum, spacing from its largest extent.
    #[must_use]
    pub fn fit(bbox: &Aabb, voxels: usize, precision: ScalarPrecision) -> Self {
        let voxels = voxels.max(1);
        // A degenerate box still yields a nonzero spacing.
        let extent = bbox.max_dimension().max(f32::EPSILON);
        Self {
            origin: bbox.min(),
            spacing: extent / voxels as f32,
            resolution: [voxels; 3],
            precision,
        }
    }

    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.resolution[0] * self.resolution[1] * self.resolution[2]
    }

    /// World position of the center of voxel `(x, y, z)`.
    #[must_use]
    pub fn voxel_center(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.origin
            + Vec3::new(
                (x as f32 + 0.5) * self.spacing,
                (y as f32 + 0.5) * self.spacing,
                (z as f32 + 0.5) * self.spacing,
            )
    }
}

/// Descriptor plus scalar buffer, allocated once and refilled per frame.
pub struct Volume {
    descriptor: VolumeDescriptor,
    data: Vec<f32>,
}

impl Volume {
    #[must_use]
    pub fn new(descriptor: VolumeDescriptor) -> Self {
        let data = vec![0.0; descriptor.voxel_count()];
        Self { descriptor, data }
    }

    #[must_use]
    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value of voxel `(x, y, z)`.
    #[must_use]
    pub fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        let [nx, ny, _] = self.descriptor.resolution;
        self.data[(z * ny + y) * nx + x]
    }

    /// Atomically replaces the buffer with a fully sampled one.
    ///
    /// The previous buffer lands in `other` for reuse as the next scratch
    /// space. Used by the voxelizer so a failed pass never exposes a
    /// mixed-frame image.
    pub(crate) fn swap_data(&mut self, other: &mut Vec<f32>) {
        debug_assert_eq!(other.len(), self.data.len());
        std::mem::swap(&mut self.data, other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_descriptor() {
        let bbox = Aabb::from_points([Vec3::new(1.0, 1.0, 1.0), Vec3::new(5.0, 3.0, 2.0)]);
        let desc = VolumeDescriptor::fit(&bbox, 8, ScalarPrecision::F32);
        assert_eq!(desc.origin, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(desc.spacing, 0.5);
        assert_eq!(desc.voxel_count(), 512);
        let center = desc.voxel_center(0, 0, 0);
        assert_eq!(center, Vec3::new(1.25, 1.25, 1.25));
    }

    #[test]
    fn test_degenerate_box_has_positive_spacing() {
        let bbox = Aabb::from_points([Vec3::new(2.0, 2.0, 2.0)]);
        let desc = VolumeDescriptor::fit(&bbox, 4, ScalarPrecision::U8);
        assert!(desc.spacing > 0.0);
    }

    #[test]
    fn test_precision_bytes() {
        assert_eq!(ScalarPrecision::U8.bytes(), 1);
        assert_eq!(ScalarPrecision::U16.bytes(), 2);
        assert_eq!(ScalarPrecision::U32.bytes(), 4);
        assert_eq!(ScalarPrecision::F32.bytes(), 4);
    }
}
