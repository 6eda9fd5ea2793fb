//! Zone collision meshes
//!
//! Rooms, floors and walls are bounded coarsely by their boxes; the exact
//! answer comes from the triangles they actually render. A [`ZoneMesh`]
//! holds those triangles in world space.

use crate::bounds::OrientedBox;
use crate::foundation::math::{Mat4, Point3, Vec3};
use super::primitives::{Ray, Triangle};

/// World-space triangle soup of a zone's rendered geometry
#[derive(Debug, Clone, Default)]
pub struct ZoneMesh {
    /// Triangles in world space
    pub triangles: Vec<Triangle>,
    /// Centre of the bounding sphere
    pub center: Vec3,
    /// Radius of the bounding sphere around `center`
    pub bounding_radius: f32,
}

impl ZoneMesh {
    /// Build a mesh from world-space vertices and a triangle index list.
    ///
    /// Trailing indices that do not form a full triangle and indices that
    /// fall outside `vertices` are skipped.
    pub fn from_vertices(vertices: &[Vec3], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .filter_map(|chunk| {
                let v0 = vertices.get(chunk[0] as usize)?;
                let v1 = vertices.get(chunk[1] as usize)?;
                let v2 = vertices.get(chunk[2] as usize)?;
                Some(Triangle::new(*v0, *v1, *v2))
            })
            .collect();
        Self::from_triangles(triangles)
    }

    /// Build a mesh from world-space triangles
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let vertex_count = triangles.len() * 3;
        let center = if vertex_count == 0 {
            Vec3::zeros()
        } else {
            let sum = triangles
                .iter()
                .fold(Vec3::zeros(), |acc, tri| acc + tri.v0 + tri.v1 + tri.v2);
            #[allow(clippy::cast_precision_loss)]
            let count = vertex_count as f32;
            sum / count
        };

        let mut max_distance_sq = 0.0f32;
        for tri in &triangles {
            for vertex in [tri.v0, tri.v1, tri.v2] {
                max_distance_sq = max_distance_sq.max((vertex - center).magnitude_squared());
            }
        }

        Self {
            triangles,
            center,
            bounding_radius: max_distance_sq.sqrt(),
        }
    }

    /// Copy of this mesh with every vertex moved by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let apply = |v: Vec3| matrix.transform_point(&Point3::from(v)).coords;
        Self::from_triangles(
            self.triangles
                .iter()
                .map(|tri| Triangle::new(apply(tri.v0), apply(tri.v1), apply(tri.v2)))
                .collect(),
        )
    }

    /// Whether any triangle touches the box
    pub fn intersects_box(&self, obb: &OrientedBox, tolerance: f32) -> bool {
        // Quick reject: box and mesh bounding spheres
        let box_radius = obb.half_extents.magnitude();
        let reach = self.bounding_radius + box_radius + tolerance.max(0.0);
        if (obb.center - self.center).magnitude_squared() > reach * reach {
            return false;
        }

        self.triangles
            .iter()
            .any(|triangle| triangle.intersects_box(obb, tolerance))
    }

    /// Closest ray hit, returned as (distance, world point)
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        self.triangles
            .iter()
            .filter_map(|triangle| triangle.intersect_ray(ray))
            .map(|(t, _, _)| t)
            .min_by(f32::total_cmp)
            .map(|t| (t, ray.point_at(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_floor() -> ZoneMesh {
        let vertices = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        ZoneMesh::from_vertices(&vertices, &[0, 1, 2, 0, 2, 3, 7])
    }

    #[test]
    fn test_incomplete_and_invalid_indices_are_skipped() {
        let mesh = ZoneMesh::from_vertices(&[Vec3::zeros(), Vec3::x(), Vec3::z()], &[0, 1, 2, 0, 1, 9]);
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(quad_floor().triangles.len(), 2);
    }

    #[test]
    fn test_ray_reports_closest_hit() {
        let ray = Ray::new(Vec3::new(1.0, 3.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
        let (t, point) = quad_floor().intersect_ray(&ray).expect("hit floor");
        assert!((t - 3.0).abs() < 1e-5);
        assert!(point.y.abs() < 1e-5);
    }

    #[test]
    fn test_transformed_mesh_moves_with_matrix() {
        let moved = quad_floor().transformed(&Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0)));
        let ray = Ray::new(Vec3::new(1.0, 3.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(moved.intersect_ray(&ray).is_none());
        assert!((moved.center.x - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_far_box_rejected_by_sphere() {
        let obb = OrientedBox::from_local(
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, 0.5),
            &Mat4::new_translation(&Vec3::new(50.0, 0.0, 0.0)),
        );
        assert!(!quad_floor().intersects_box(&obb, 0.01));
    }
}
