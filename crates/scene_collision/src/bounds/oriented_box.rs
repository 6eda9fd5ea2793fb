//! World-space oriented box and the separating-axis test

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axes whose squared length falls below this are treated as degenerate
const DEGENERATE_AXIS_SQ: f32 = 1.0e-6;

/// A box in world space described by centre, orthonormal axes and
/// half-extents along those axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space centre
    pub center: Vec3,
    /// Unit axes of the box (columns of the rotation)
    pub axes: [Vec3; 3],
    /// Half-extent along each axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Build the world box for model-space corners under `transform`.
    ///
    /// Any scale baked into the matrix is folded into the half-extents so
    /// the stored axes stay unit length.
    pub fn from_local(min: Vec3, max: Vec3, transform: &Mat4) -> Self {
        let local_center = (min + max) * 0.5;
        let local_half = (max - min) * 0.5;
        let center = transform.transform_point(&Point3::from(local_center)).coords;

        let basis = [Vec3::x(), Vec3::y(), Vec3::z()];
        let mut axes = basis;
        let mut half_extents = local_half;
        for i in 0..3 {
            let column: Vec3 = transform.fixed_view::<3, 1>(0, i).into_owned();
            let length = column.magnitude();
            if length > f32::EPSILON {
                axes[i] = column / length;
                half_extents[i] = local_half[i] * length;
            } else {
                axes[i] = basis[i];
                half_extents[i] = 0.0;
            }
        }

        Self {
            center,
            axes,
            half_extents,
        }
    }

    /// Projected radius of the box onto a unit axis
    pub fn project_radius(&self, axis: &Vec3) -> f32 {
        self.half_extents.x * self.axes[0].dot(axis).abs()
            + self.half_extents.y * self.axes[1].dot(axis).abs()
            + self.half_extents.z * self.axes[2].dot(axis).abs()
    }

    /// The eight world-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::zeros(); 8];
        for (index, corner) in corners.iter_mut().enumerate() {
            let sx = if index & 1 != 0 { 1.0 } else { -1.0 };
            let sy = if index & 2 != 0 { 1.0 } else { -1.0 };
            let sz = if index & 4 != 0 { 1.0 } else { -1.0 };
            *corner = self.center
                + self.axes[0] * (self.half_extents.x * sx)
                + self.axes[1] * (self.half_extents.y * sy)
                + self.axes[2] * (self.half_extents.z * sz);
        }
        corners
    }

    /// Separating-axis test over the 15 candidate axes of two boxes.
    ///
    /// Both boxes contribute their face normals, and every pair of edges
    /// contributes a cross product, so the result is the same whichever box
    /// the test is called on.
    pub fn intersects(&self, other: &Self, tolerance: f32) -> bool {
        let offset = other.center - self.center;

        let separated = |axis: Vec3| -> bool {
            let length_sq = axis.magnitude_squared();
            if length_sq < DEGENERATE_AXIS_SQ {
                return false;
            }
            let axis = axis / length_sq.sqrt();
            let distance = offset.dot(&axis).abs();
            distance > self.project_radius(&axis) + other.project_radius(&axis) + tolerance
        };

        for axis in self.axes.iter().chain(other.axes.iter()) {
            if separated(*axis) {
                return false;
            }
        }

        for a in &self.axes {
            for b in &other.axes {
                if separated(a.cross(b)) {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_in_matrix_folds_into_extents() {
        let transform = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 3.0));
        let obb = OrientedBox::from_local(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), &transform);
        assert_relative_eq!(obb.half_extents, Vec3::new(2.0, 1.0, 3.0));
        assert_relative_eq!(obb.axes[0], Vec3::x());
    }

    #[test]
    fn test_corners_span_extents() {
        let obb = OrientedBox::from_local(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0), &Mat4::identity());
        let corners = obb.corners();
        assert_relative_eq!(corners[0], Vec3::zeros());
        assert_relative_eq!(corners[7], Vec3::new(2.0, 2.0, 2.0));
    }
}
