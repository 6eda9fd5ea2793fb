//! Oriented bounding volumes
//!
//! A [`BoundingVolume`] stores model-space extents together with the scale
//! and border inflation of the entity it belongs to, and a local-to-world
//! matrix applied lazily. World-space geometry is only materialised as an
//! [`OrientedBox`] when an intersection test needs it.

mod oriented_box;

pub use oriented_box::OrientedBox;

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Model-space box with scale, border inflation and a world transform.
///
/// Instances never share state; consumers that need a working copy either
/// own a scratch volume and call [`BoundingVolume::copy_from`], or clone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    min: Vec3,
    max: Vec3,
    scale: Vec3,
    border: Vec3,
    transform: Mat4,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }
}

impl BoundingVolume {
    /// Create a volume from model-space extents with unit scale and no border
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let mut volume = Self {
            min,
            max,
            scale: Vec3::new(1.0, 1.0, 1.0),
            border: Vec3::zeros(),
            transform: Mat4::identity(),
        };
        volume.set_extents(min, max);
        volume
    }

    /// Create a volume of the given size centred on the model origin
    pub fn from_size(size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(-half, half)
    }

    /// Overwrite this volume with the state of `other` without allocating
    pub fn copy_from(&mut self, other: &Self) {
        self.min = other.min;
        self.max = other.max;
        self.scale = other.scale;
        self.border = other.border;
        self.transform = other.transform;
    }

    /// Set the model-space extents; the corners are reordered if needed
    pub fn set_extents(&mut self, a: Vec3, b: Vec3) {
        self.min = a.inf(&b);
        self.max = a.sup(&b);
    }

    /// Fit the model-space extents around a set of vertices.
    ///
    /// Leaves the volume untouched when `vertices` is empty.
    pub fn set_extents_from_vertices(&mut self, vertices: &[Vec3]) {
        let Some(first) = vertices.first() else {
            return;
        };
        let (min, max) = vertices
            .iter()
            .skip(1)
            .fold((*first, *first), |(min, max), v| (min.inf(v), max.sup(v)));
        self.min = min;
        self.max = max;
    }

    /// Model-space minimum corner, before scale and border
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Model-space maximum corner, before scale and border
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Unscaled size of the model-space box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Scale applied to the model-space extents
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the per-axis scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Border inflation added on every side after scaling
    pub fn border(&self) -> Vec3 {
        self.border
    }

    /// Set the per-axis border inflation
    pub fn set_border(&mut self, border: Vec3) {
        self.border = border;
    }

    /// Current local-to-world matrix
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Replace the local-to-world matrix
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Apply `matrix` on top of the current transform (`matrix * current`)
    pub fn transform_by(&mut self, matrix: &Mat4) {
        self.transform = matrix * self.transform;
    }

    /// Minimum corner after scale and border, still in model space
    pub fn scaled_min(&self) -> Vec3 {
        self.min.component_mul(&self.scale) - self.border
    }

    /// Maximum corner after scale and border, still in model space
    pub fn scaled_max(&self) -> Vec3 {
        self.max.component_mul(&self.scale) + self.border
    }

    /// Centre of the scaled box in model space
    pub fn scaled_center(&self) -> Vec3 {
        (self.scaled_min() + self.scaled_max()) * 0.5
    }

    /// World-space centre
    pub fn world_center(&self) -> Vec3 {
        self.transform
            .transform_point(&Point3::from(self.scaled_center()))
            .coords
    }

    /// Materialise the world-space oriented box
    pub fn oriented_box(&self) -> OrientedBox {
        OrientedBox::from_local(self.scaled_min(), self.scaled_max(), &self.transform)
    }

    /// Bi-directional separating-axis test against another volume.
    ///
    /// `tolerance` is a signed slack: positive values let boxes that are
    /// merely close count as intersecting, negative values require real
    /// overlap of at least that depth.
    pub fn intersects(&self, other: &Self, tolerance: f32) -> bool {
        self.oriented_box().intersects(&other.oriented_box(), tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, constants::HALF_PI};
    use approx::assert_relative_eq;

    fn unit_box_at(x: f32) -> BoundingVolume {
        let mut volume = BoundingVolume::from_size(Vec3::new(1.0, 1.0, 1.0));
        volume.set_transform(Mat4::new_translation(&Vec3::new(x, 0.0, 0.0)));
        volume
    }

    #[test]
    fn test_set_extents_reorders_corners() {
        let volume = BoundingVolume::new(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(volume.min(), Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(volume.max(), Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_extents_from_vertices() {
        let mut volume = BoundingVolume::default();
        volume.set_extents_from_vertices(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, -1.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
        ]);
        assert_eq!(volume.min(), Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(volume.max(), Vec3::new(2.0, 3.0, 0.5));
    }

    #[test]
    fn test_scale_and_border_inflate_extents() {
        let mut volume = BoundingVolume::from_size(Vec3::new(2.0, 2.0, 2.0));
        volume.set_scale(Vec3::new(2.0, 1.0, 1.0));
        volume.set_border(Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(volume.scaled_max(), Vec3::new(2.5, 1.0, 1.0));
        assert_relative_eq!(volume.scaled_min(), Vec3::new(-2.5, -1.0, -1.0));
    }

    #[test]
    fn test_copy_is_independent() {
        let original = unit_box_at(3.0);
        let mut scratch = BoundingVolume::default();
        scratch.copy_from(&original);
        scratch.transform_by(&Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)));

        assert_relative_eq!(original.world_center(), Vec3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(scratch.world_center(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_overlapping_boxes_intersect() {
        assert!(unit_box_at(0.0).intersects(&unit_box_at(0.5), 0.0));
        assert!(!unit_box_at(0.0).intersects(&unit_box_at(2.0), 0.0));
    }

    #[test]
    fn test_touching_boxes_depend_on_tolerance() {
        let a = unit_box_at(0.0);
        let b = unit_box_at(1.0);
        assert!(!a.intersects(&b, -1.0e-4));
        assert!(a.intersects(&b, 1.0e-2));
    }

    #[test]
    fn test_intersection_is_symmetric_for_rotated_boxes() {
        let a = unit_box_at(0.0);
        let mut b = BoundingVolume::from_size(Vec3::new(3.0, 0.2, 0.2));
        b.set_transform(
            Mat4::new_translation(&Vec3::new(1.2, 0.9, 0.0)) * Mat4::rotation_z(HALF_PI * 0.5),
        );

        for tolerance in [-1.0e-4, 0.0, 1.0e-2] {
            assert_eq!(a.intersects(&b, tolerance), b.intersects(&a, tolerance));
        }
    }

    #[test]
    fn test_wider_tolerance_never_removes_a_hit() {
        let a = unit_box_at(0.0);
        for offset in [0.2, 0.9, 0.999, 1.0, 1.005, 1.3] {
            let b = unit_box_at(offset);
            if b.intersects(&a, -1.0e-4) {
                assert!(b.intersects(&a, 1.0e-2), "lost hit at offset {offset}");
            }
        }
    }

    #[test]
    fn test_rotated_box_misses_corner() {
        // A thin diagonal plank next to a unit box whose corner region it avoids
        let a = unit_box_at(0.0);
        let mut plank = BoundingVolume::from_size(Vec3::new(4.0, 0.1, 0.1));
        plank.set_transform(
            Mat4::new_translation(&Vec3::new(1.5, 1.5, 0.0)) * Mat4::rotation_z(-HALF_PI * 0.5),
        );
        assert!(!a.intersects(&plank, 0.0));
    }
}
