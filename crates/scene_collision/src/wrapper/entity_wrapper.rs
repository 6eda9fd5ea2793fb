//! Standard entity wrapper

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Quat, Vec3};
use crate::scene::{Entity, EntityId, EntityKind, SceneModel};
use super::WrapperView;

/// Cached placement and bounds of a rendered entity
#[derive(Debug, Clone)]
pub struct EntityWrapper {
    entity_id: EntityId,
    kind: EntityKind,
    position: Vec3,
    rotation: Quat,
    enabled: bool,
    bounds: BoundingVolume,
    extended_bounds: BoundingVolume,
}

impl EntityWrapper {
    /// Wrap an entity with model-space bounds; the extended bounds start as
    /// a copy of the standard ones.
    pub fn new(entity: &Entity, mut bounds: BoundingVolume) -> Self {
        bounds.set_scale(entity.scale);
        Self {
            entity_id: entity.id,
            kind: entity.kind,
            position: entity.position,
            rotation: entity.rotation,
            enabled: true,
            extended_bounds: bounds.clone(),
            bounds,
        }
    }

    /// Builder pattern: set extended bounds (scale follows the entity)
    pub fn with_extended_bounds(mut self, mut extended: BoundingVolume) -> Self {
        extended.set_scale(self.bounds.scale());
        self.extended_bounds = extended;
        self
    }

    /// Refresh placement and scale after a committed change
    pub fn sync_from(&mut self, entity: &Entity) {
        self.position = entity.position;
        self.rotation = entity.rotation;
        self.bounds.set_scale(entity.scale);
        self.extended_bounds.set_scale(entity.scale);
    }

    /// Enable or disable the wrapper
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl WrapperView for EntityWrapper {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn parent_id(&self, scene: &dyn SceneModel) -> Option<EntityId> {
        scene.entity(self.entity_id).and_then(|entity| entity.parent)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    fn extended_bounds(&self) -> &BoundingVolume {
        &self.extended_bounds
    }
}
