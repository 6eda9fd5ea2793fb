//! Rendering-side entity wrappers
//!
//! A wrapper caches the resolved bounding volumes of one live entity and
//! the local-to-parent placement used to build its transform. Real
//! wrappers, segment wrappers and surrogates all expose the same
//! [`WrapperView`] capabilities, so hierarchy walks never need to know
//! which variant they are looking at.

mod entity_wrapper;
mod registry;
mod segment;

pub use entity_wrapper::EntityWrapper;
pub use registry::WrapperRegistry;
pub use segment::{SegmentGeometry, SegmentWrapper};

use crate::bounds::BoundingVolume;
use crate::foundation::math::{rigid_matrix, Mat4, Quat, Vec3};
use crate::scene::{EntityId, EntityKind, SceneModel};

/// Placement and bounds capabilities shared by every wrapper variant
pub trait WrapperView {
    /// Id of the wrapped entity
    fn entity_id(&self) -> EntityId;

    /// Kind of the wrapped entity
    fn kind(&self) -> EntityKind;

    /// Position relative to the parent
    fn position(&self) -> Vec3;

    /// Rotation relative to the parent
    fn rotation(&self) -> Quat;

    /// Per-axis scale, as carried by the standard bounds
    fn scale(&self) -> Vec3 {
        self.bounds().scale()
    }

    /// Parent id. Real wrappers defer to the committed entity; surrogates
    /// answer from their own pending state.
    fn parent_id(&self, scene: &dyn SceneModel) -> Option<EntityId>;

    /// Disabled (hidden) wrappers break every chain that passes through them
    fn is_enabled(&self) -> bool;

    /// Whether this is a surrogate for a pending command
    fn is_surrogate(&self) -> bool {
        false
    }

    /// Standard bounds in model space
    fn bounds(&self) -> &BoundingVolume;

    /// Extended bounds in model space (clearances, swing areas)
    fn extended_bounds(&self) -> &BoundingVolume;

    /// Standard or extended bounds
    fn bounds_for(&self, extended: bool) -> &BoundingVolume {
        if extended {
            self.extended_bounds()
        } else {
            self.bounds()
        }
    }

    /// Local-to-parent matrix, translation and rotation only
    fn local_matrix(&self) -> Mat4 {
        rigid_matrix(&self.position(), &self.rotation())
    }
}

/// Id-keyed wrapper lookup, implemented by the registry and by per-query
/// active sets
pub trait WrapperLookup {
    /// Wrapper of an entity, if one is live
    fn wrapper(&self, id: EntityId) -> Option<&dyn WrapperView>;
}

/// A wrapper as stored in the registry
#[derive(Debug, Clone)]
pub enum Wrapper {
    /// Wrapper of a model, zone, vertex or container
    Entity(EntityWrapper),
    /// Wrapper of a wall segment, placed from its end vertices
    Segment(SegmentWrapper),
}

impl Wrapper {
    fn view(&self) -> &dyn WrapperView {
        match self {
            Self::Entity(wrapper) => wrapper,
            Self::Segment(wrapper) => wrapper,
        }
    }

    /// Enable or disable the wrapper
    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Self::Entity(wrapper) => wrapper.set_enabled(enabled),
            Self::Segment(wrapper) => wrapper.set_enabled(enabled),
        }
    }
}

impl From<EntityWrapper> for Wrapper {
    fn from(wrapper: EntityWrapper) -> Self {
        Self::Entity(wrapper)
    }
}

impl From<SegmentWrapper> for Wrapper {
    fn from(wrapper: SegmentWrapper) -> Self {
        Self::Segment(wrapper)
    }
}

impl WrapperView for Wrapper {
    fn entity_id(&self) -> EntityId {
        self.view().entity_id()
    }

    fn kind(&self) -> EntityKind {
        self.view().kind()
    }

    fn position(&self) -> Vec3 {
        self.view().position()
    }

    fn rotation(&self) -> Quat {
        self.view().rotation()
    }

    fn parent_id(&self, scene: &dyn SceneModel) -> Option<EntityId> {
        self.view().parent_id(scene)
    }

    fn is_enabled(&self) -> bool {
        self.view().is_enabled()
    }

    fn bounds(&self) -> &BoundingVolume {
        self.view().bounds()
    }

    fn extended_bounds(&self) -> &BoundingVolume {
        self.view().extended_bounds()
    }
}
