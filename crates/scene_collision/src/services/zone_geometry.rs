//! Mesh-backed picking and exact zone checks

use std::collections::BTreeMap;

use crate::bounds::BoundingVolume;
use crate::core::CollisionConfig;
use crate::physics::{Ray, ZoneMesh};
use crate::scene::EntityId;
use crate::wrapper::WrapperView;
use super::{GeometryChecker, PickHit, PickService};

/// Rendered geometry of every zone in the active location, in world space.
///
/// Acts as both the pick service (rays only strike zone meshes) and the
/// exact checker. A zone without a registered mesh is taken at its box.
#[derive(Debug, Clone)]
pub struct ZoneGeometry {
    meshes: BTreeMap<EntityId, ZoneMesh>,
    contact_epsilon: f32,
}

impl Default for ZoneGeometry {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}

impl ZoneGeometry {
    /// Create an empty geometry store using the config's contact epsilon
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            meshes: BTreeMap::new(),
            contact_epsilon: config.contact_epsilon,
        }
    }

    /// Register or replace the mesh of a zone
    pub fn insert(&mut self, zone: EntityId, mesh: ZoneMesh) -> Option<ZoneMesh> {
        self.meshes.insert(zone, mesh)
    }

    /// Builder pattern: register a mesh
    pub fn with_mesh(mut self, zone: EntityId, mesh: ZoneMesh) -> Self {
        self.insert(zone, mesh);
        self
    }

    /// Drop the mesh of a removed zone
    pub fn remove(&mut self, zone: EntityId) -> Option<ZoneMesh> {
        self.meshes.remove(&zone)
    }

    /// Mesh of a zone
    pub fn mesh(&self, zone: EntityId) -> Option<&ZoneMesh> {
        self.meshes.get(&zone)
    }
}

impl PickService for ZoneGeometry {
    fn cast_ray(&self, ray: &Ray) -> Vec<PickHit> {
        let mut hits: Vec<PickHit> = self
            .meshes
            .iter()
            .filter_map(|(zone, mesh)| {
                mesh.intersect_ray(ray).map(|(distance, point)| PickHit {
                    entity: *zone,
                    point,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl GeometryChecker for ZoneGeometry {
    fn check(&self, volume: &BoundingVolume, target: &dyn WrapperView, use_epsilon: bool) -> bool {
        let Some(mesh) = self.meshes.get(&target.entity_id()) else {
            log::trace!("no mesh for zone {}, accepting box hit", target.entity_id());
            return true;
        };
        let tolerance = if use_epsilon { -self.contact_epsilon } else { 0.0 };
        mesh.intersects_box(&volume.oriented_box(), tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Vec3};
    use crate::scene::{Entity, EntityKind};
    use crate::wrapper::EntityWrapper;

    fn floor(x_offset: f32) -> ZoneMesh {
        let vertices = [
            Vec3::new(x_offset, 0.0, 0.0),
            Vec3::new(x_offset + 4.0, 0.0, 0.0),
            Vec3::new(x_offset + 4.0, 0.0, 4.0),
            Vec3::new(x_offset, 0.0, 4.0),
        ];
        ZoneMesh::from_vertices(&vertices, &[0, 1, 2, 0, 2, 3])
    }

    fn zone_wrapper(raw: u32) -> EntityWrapper {
        EntityWrapper::new(
            &Entity::new(EntityId::new(raw), EntityKind::Zone),
            BoundingVolume::from_size(Vec3::new(4.0, 3.0, 4.0)),
        )
    }

    fn cube_at(center: Vec3) -> BoundingVolume {
        let mut volume = BoundingVolume::from_size(Vec3::new(1.0, 1.0, 1.0));
        volume.set_transform(Mat4::new_translation(&center));
        volume
    }

    #[test]
    fn test_ray_hits_sorted_nearest_first() {
        let geometry = ZoneGeometry::default()
            .with_mesh(EntityId::new(1), floor(0.0))
            .with_mesh(EntityId::new(2), floor(0.0).transformed(&Mat4::new_translation(&Vec3::new(0.0, -2.0, 0.0))));
        let ray = Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::new(0.0, -1.0, 0.0));

        let hits = geometry.cast_ray(&ray);
        assert_eq!(hits.iter().map(|hit| hit.entity).collect::<Vec<_>>(), vec![EntityId::new(1), EntityId::new(2)]);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_resting_contact_is_not_a_hit_with_epsilon() {
        let geometry = ZoneGeometry::default().with_mesh(EntityId::new(1), floor(0.0));
        let resting = cube_at(Vec3::new(1.0, 0.5, 1.0));
        assert!(!geometry.check(&resting, &zone_wrapper(1), true));
        assert!(geometry.check(&resting, &zone_wrapper(1), false));
        assert!(geometry.check(&cube_at(Vec3::new(1.0, 0.2, 1.0)), &zone_wrapper(1), true));
    }

    #[test]
    fn test_zone_without_mesh_accepts_box_hit() {
        let geometry = ZoneGeometry::default();
        assert!(geometry.check(&cube_at(Vec3::zeros()), &zone_wrapper(5), true));
    }
}
