//! Wall segment wrappers
//!
//! Segments have no placement of their own: a segment sits between its two
//! end vertices, is as thick as its wall and as tall as its taller end.
//! Vertex positions are plan coordinates of the owning container, with
//! height along +Z.

use crate::bounds::BoundingVolume;
use crate::core::CollisionConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Quat, Transform, Vec3};
use crate::scene::properties::{KEY_HEIGHT, KEY_THICKNESS, SHEET_WALL};
use crate::scene::{Entity, EntityId, EntityKind, SceneModel};
use super::WrapperView;

/// Placement and local bounds of a segment derived from its end vertices
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGeometry {
    /// Midpoint on the floor plane
    pub position: Vec3,
    /// Rotation about +Z aligning local +X with the segment
    pub rotation: Quat,
    /// Local bounds with unit scale
    pub bounds: BoundingVolume,
}

impl SegmentGeometry {
    /// Derive the segment placement from its end points.
    ///
    /// The local box runs the full length along X, is centred on the wall
    /// line across Y and rises from the floor to `height` along Z.
    pub fn from_endpoints(start: Vec3, end: Vec3, thickness: f32, height: f32) -> Self {
        let delta = Vec3::new(end.x - start.x, end.y - start.y, 0.0);
        let length = delta.magnitude();
        let angle = delta.y.atan2(delta.x);
        let midpoint = Vec3::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5, 0.0);

        let local = Mat4::new_translation(&midpoint) * Mat4::rotation_z(angle);
        let placement = Transform::from_matrix(&local);

        let half_length = length * 0.5;
        let half_thickness = thickness.abs() * 0.5;
        let bounds = BoundingVolume::new(
            Vec3::new(-half_length, -half_thickness, 0.0),
            Vec3::new(half_length, half_thickness, height.max(0.0)),
        );

        Self {
            position: placement.position,
            rotation: placement.rotation,
            bounds,
        }
    }

    /// Wall thickness of a segment, falling back to the configured default
    pub fn thickness_of(scene: &dyn SceneModel, segment: EntityId, config: &CollisionConfig) -> f32 {
        scene
            .property(segment, SHEET_WALL, KEY_THICKNESS)
            .and_then(|value| value.first())
            .unwrap_or(config.default_wall_thickness)
    }

    /// Height of a vertex, falling back to the configured default
    pub fn height_of(scene: &dyn SceneModel, vertex: EntityId, config: &CollisionConfig) -> f32 {
        scene
            .property(vertex, SHEET_WALL, KEY_HEIGHT)
            .and_then(|value| value.as_float())
            .unwrap_or(config.default_wall_height)
    }
}

/// Wrapper of a rendered wall segment
#[derive(Debug, Clone)]
pub struct SegmentWrapper {
    entity_id: EntityId,
    geometry: SegmentGeometry,
    extended_bounds: BoundingVolume,
    enabled: bool,
}

impl SegmentWrapper {
    /// Wrap a segment with explicit geometry
    pub fn new(entity_id: EntityId, geometry: SegmentGeometry) -> Self {
        Self {
            entity_id,
            extended_bounds: geometry.bounds.clone(),
            geometry,
            enabled: true,
        }
    }

    /// Wrap a segment entity, reading its vertices and wall properties from
    /// the scene. Returns `None` when the entity is not a segment or one of
    /// its vertices is missing.
    pub fn from_scene(segment: &Entity, scene: &dyn SceneModel, config: &CollisionConfig) -> Option<Self> {
        if segment.kind != EntityKind::Segment {
            return None;
        }
        let ends = segment.segment?;
        let start = scene.entity(ends.start)?;
        let end = scene.entity(ends.end)?;

        let thickness = SegmentGeometry::thickness_of(scene, segment.id, config);
        let height = SegmentGeometry::height_of(scene, ends.start, config)
            .max(SegmentGeometry::height_of(scene, ends.end, config));

        Some(Self::new(
            segment.id,
            SegmentGeometry::from_endpoints(start.position, end.position, thickness, height),
        ))
    }

    /// Geometry derived from the end vertices
    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    /// Enable or disable the wrapper
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl WrapperView for SegmentWrapper {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Segment
    }

    fn position(&self) -> Vec3 {
        self.geometry.position
    }

    fn rotation(&self) -> Quat {
        self.geometry.rotation
    }

    fn parent_id(&self, scene: &dyn SceneModel) -> Option<EntityId> {
        scene.entity(self.entity_id).and_then(|entity| entity.parent)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn bounds(&self) -> &BoundingVolume {
        &self.geometry.bounds
    }

    fn extended_bounds(&self) -> &BoundingVolume {
        &self.extended_bounds
    }
}
