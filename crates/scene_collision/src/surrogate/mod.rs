//! Surrogates: entities as they would be after a pending command
//!
//! A surrogate never replaces the real wrapper in the registry. Queries
//! that enable surrogates look them up first, so a pending move, rotation
//! or reparent is visible to collision tests before anything is committed.
//!
//! - [`SurrogateWrapper`] - the pending placement and bounds of one entity
//! - [`SurrogateOverlay`] - live surrogates by id plus the side-pocket journal
//! - [`SurrogateBuilder`] - derives a surrogate from a command

mod builder;
mod overlay;

pub use builder::SurrogateBuilder;
pub use overlay::{SurrogateJournal, SurrogateOverlay};

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::scene::{EntityId, EntityKind, SceneModel};
use crate::wrapper::WrapperView;

/// Pending placement and bounds of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateWrapper {
    entity_id: EntityId,
    kind: EntityKind,
    parent: EntityId,
    position: Vec3,
    rotation: Quat,
    bounds: BoundingVolume,
    extended_bounds: BoundingVolume,
    transaction: Option<u64>,
}

impl SurrogateWrapper {
    /// Create a surrogate. Both volumes take `scale`; their transforms are
    /// reset so they stay in model space until a query places them.
    pub fn new(
        entity_id: EntityId,
        kind: EntityKind,
        parent: EntityId,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
        mut bounds: BoundingVolume,
        mut extended_bounds: BoundingVolume,
    ) -> Self {
        for volume in [&mut bounds, &mut extended_bounds] {
            volume.set_scale(scale);
            volume.set_transform(Mat4::identity());
        }
        Self {
            entity_id,
            kind,
            parent,
            position,
            rotation,
            bounds,
            extended_bounds,
            transaction: None,
        }
    }

    /// Pending parent
    pub fn parent(&self) -> EntityId {
        self.parent
    }

    /// Transaction of the edit this surrogate belongs to, once tracked
    pub fn transaction(&self) -> Option<u64> {
        self.transaction
    }

    /// Tag the surrogate with the edit it belongs to
    pub fn set_transaction(&mut self, transaction: u64) {
        self.transaction = Some(transaction);
    }

    /// Move the pending position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Change the pending rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Change the pending scale of both volumes
    pub fn set_scale(&mut self, scale: Vec3) {
        self.bounds.set_scale(scale);
        self.extended_bounds.set_scale(scale);
    }
}

impl WrapperView for SurrogateWrapper {
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

    fn parent_id(&self, _scene: &dyn SceneModel) -> Option<EntityId> {
        Some(self.parent)
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn is_surrogate(&self) -> bool {
        true
    }

    fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    fn extended_bounds(&self) -> &BoundingVolume {
        &self.extended_bounds
    }
}
