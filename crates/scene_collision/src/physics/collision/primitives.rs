//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays and triangles with ray casting and triangle/box overlap
//! tests.

use crate::bounds::OrientedBox;
use crate::foundation::math::Vec3;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal (right-hand rule)
    pub fn raw_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        const EPSILON: f32 = 0.000_001;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle?
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t >= 0.0 {
            Some((t, u, v))
        } else {
            None
        }
    }

    /// Separating-axis test between this triangle and an oriented box.
    ///
    /// Tests 13 axes: the 3 box faces, the triangle normal and the 9
    /// box-axis/triangle-edge cross products. `tolerance` widens (positive)
    /// or shrinks (negative) the box.
    pub fn intersects_box(&self, obb: &OrientedBox, tolerance: f32) -> bool {
        const DEGENERATE_AXIS_SQ: f32 = 1.0e-10;

        let verts = [self.v0 - obb.center, self.v1 - obb.center, self.v2 - obb.center];

        let separated = |axis: Vec3| -> bool {
            let length_sq = axis.magnitude_squared();
            if length_sq < DEGENERATE_AXIS_SQ {
                return false;
            }
            let axis = axis / length_sq.sqrt();
            let p0 = verts[0].dot(&axis);
            let p1 = verts[1].dot(&axis);
            let p2 = verts[2].dot(&axis);
            let tri_min = p0.min(p1).min(p2);
            let tri_max = p0.max(p1).max(p2);
            let radius = obb.project_radius(&axis) + tolerance;
            tri_min > radius || tri_max < -radius
        };

        if obb.axes.iter().any(|axis| separated(*axis)) {
            return false;
        }

        if separated(self.raw_normal()) {
            return false;
        }

        let edges = [self.v1 - self.v0, self.v2 - self.v1, self.v0 - self.v2];
        for axis in &obb.axes {
            for edge in &edges {
                if separated(axis.cross(edge)) {
                    return false;
                }
            }
        }

        true
    }
}
