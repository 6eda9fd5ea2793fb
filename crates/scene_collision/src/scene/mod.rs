//! Scene model
//!
//! The authoritative entity tree is owned elsewhere; the collision engine
//! only reads it through [`SceneModel`]. [`EntityTree`] is a plain
//! in-memory implementation used by tools and tests.

mod entity;
mod entity_tree;
pub mod properties;

pub use entity::{Entity, EntityId, EntityKind, KindTraits, SegmentEnds};
pub use entity_tree::EntityTree;
pub use properties::PropertyValue;

/// Read access to the authoritative scene
pub trait SceneModel {
    /// Look up an entity by id
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Id of the content root every resolvable chain ends at
    fn content_root(&self) -> EntityId;

    /// Hand out a fresh transaction id
    fn issue_transaction_id(&self) -> u64;

    /// Children of an entity, empty when the entity is unknown
    fn children(&self, id: EntityId) -> &[EntityId] {
        self.entity(id).map_or(&[][..], |entity| entity.children.as_slice())
    }

    /// Typed property read
    fn property(&self, id: EntityId, sheet: &str, key: &str) -> Option<&PropertyValue> {
        self.entity(id).and_then(|entity| entity.property(sheet, key))
    }

    /// All descendants of `id` in depth-first pre-order, excluding `id`.
    ///
    /// Uses an explicit worklist so deep trees cannot exhaust the stack;
    /// a node reached twice (a malformed, cyclic tree) is not revisited.
    fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut seen = std::collections::HashSet::new();
        seen.insert(id);
        let mut worklist: Vec<EntityId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = worklist.pop() {
            if !seen.insert(next) {
                continue;
            }
            result.push(next);
            worklist.extend(self.children(next).iter().rev().copied());
        }
        result
    }

    /// Whether `ancestor` appears on the committed parent chain of `id`
    fn is_ancestor(&self, ancestor: EntityId, id: EntityId, max_depth: usize) -> bool {
        let mut current = self.entity(id).and_then(|entity| entity.parent);
        for _ in 0..max_depth {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = self.entity(parent).and_then(|entity| entity.parent),
                None => return false,
            }
        }
        false
    }
}
