//! Per-query union of real wrappers and surrogates

use std::collections::BTreeMap;

use crate::scene::EntityId;
use crate::surrogate::SurrogateOverlay;
use crate::wrapper::{WrapperLookup, WrapperRegistry, WrapperView};

/// Wrappers taking part in one query, keyed by entity.
///
/// Built fresh at the start of every query and dropped at its end. A
/// surrogate shadows the real wrapper of the same entity.
pub struct ActiveSet<'a> {
    members: BTreeMap<EntityId, &'a dyn WrapperView>,
}

impl<'a> ActiveSet<'a> {
    /// Real wrappers of `registry`, shadowed by the surrogates of `overlay`
    pub fn build(registry: &'a WrapperRegistry, overlay: Option<&'a SurrogateOverlay>) -> Self {
        let mut members: BTreeMap<EntityId, &'a dyn WrapperView> = registry
            .iter()
            .map(|(id, wrapper)| (id, wrapper as &dyn WrapperView))
            .collect();
        if let Some(overlay) = overlay {
            for (id, surrogate) in overlay.iter() {
                members.insert(id, surrogate);
            }
        }
        Self { members }
    }

    /// Add or shadow one member
    pub fn insert(&mut self, wrapper: &'a dyn WrapperView) {
        self.members.insert(wrapper.entity_id(), wrapper);
    }

    /// Builder pattern: shadow members with views derived for this query,
    /// such as walls rebuilt around dragged vertices
    pub fn with_derived<W: WrapperView>(mut self, derived: &'a [W]) -> Self {
        for wrapper in derived {
            self.insert(wrapper);
        }
        self
    }

    /// Member for an entity
    pub fn get(&self, id: EntityId) -> Option<&'a dyn WrapperView> {
        self.members.get(&id).copied()
    }

    /// Members in id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &'a dyn WrapperView)> + '_ {
        self.members.iter().map(|(id, wrapper)| (*id, *wrapper))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl WrapperLookup for ActiveSet<'_> {
    fn wrapper(&self, id: EntityId) -> Option<&dyn WrapperView> {
        self.members.get(&id).copied()
    }
}
