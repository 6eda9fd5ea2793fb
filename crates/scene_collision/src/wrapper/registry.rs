//! Per-zone wrapper registry

use std::collections::BTreeMap;

use crate::scene::EntityId;
use super::{Wrapper, WrapperLookup, WrapperView};

/// Wrappers of every live, renderable entity in the active zone.
///
/// Entries are created and destroyed in lockstep with entity add/remove
/// notifications by the rendering side. Iteration is ordered by id.
#[derive(Debug, Default, Clone)]
pub struct WrapperRegistry {
    wrappers: BTreeMap<EntityId, Wrapper>,
}

impl WrapperRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the wrapper of an entity
    pub fn insert(&mut self, wrapper: impl Into<Wrapper>) -> Option<Wrapper> {
        let wrapper = wrapper.into();
        self.wrappers.insert(wrapper.entity_id(), wrapper)
    }

    /// Drop the wrapper of a removed entity
    pub fn remove(&mut self, id: EntityId) -> Option<Wrapper> {
        self.wrappers.remove(&id)
    }

    /// Wrapper of an entity
    pub fn get(&self, id: EntityId) -> Option<&Wrapper> {
        self.wrappers.get(&id)
    }

    /// Mutable wrapper of an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Wrapper> {
        self.wrappers.get_mut(&id)
    }

    /// Enable or disable a wrapper; returns `false` for unknown ids
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.wrappers.get_mut(&id) {
            Some(wrapper) => {
                wrapper.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// All wrappers in id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Wrapper)> {
        self.wrappers.iter().map(|(id, wrapper)| (*id, wrapper))
    }

    /// Number of wrappers
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    /// Whether the registry holds no wrappers
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}

impl WrapperLookup for WrapperRegistry {
    fn wrapper(&self, id: EntityId) -> Option<&dyn WrapperView> {
        self.wrappers.get(&id).map(|wrapper| wrapper as &dyn WrapperView)
    }
}
