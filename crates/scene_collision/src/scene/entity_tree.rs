//! In-memory scene model

use std::cell::Cell;
use std::collections::HashMap;

use super::entity::{Entity, EntityId, EntityKind};
use super::SceneModel;

/// Hash-map backed entity tree with a single content root.
///
/// Suitable for tools and tests. Mutation takes `&mut self`; the engine
/// only ever reads through [`SceneModel`].
#[derive(Debug)]
pub struct EntityTree {
    entities: HashMap<EntityId, Entity>,
    root: EntityId,
    next_transaction: Cell<u64>,
}

impl EntityTree {
    /// Create a tree holding only the content root
    pub fn new(root: EntityId) -> Self {
        let mut entities = HashMap::new();
        entities.insert(root, Entity::new(root, EntityKind::Container));
        Self {
            entities,
            root,
            next_transaction: Cell::new(1),
        }
    }

    /// Insert an entity and link it under its parent.
    ///
    /// An existing entity with the same id is replaced. Returns `false`
    /// when the parent is unknown; the entity is still stored so callers
    /// can model dangling references.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let id = entity.id;
        let parent = entity.parent;
        self.entities.insert(id, entity);

        match parent.and_then(|parent| self.entities.get_mut(&parent)) {
            Some(parent) => {
                if !parent.children.contains(&id) {
                    parent.children.push(id);
                }
                true
            }
            None => false,
        }
    }

    /// Remove an entity and its whole subtree
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        for descendant in self.descendants(id) {
            self.entities.remove(&descendant);
        }
        let removed = self.entities.remove(&id)?;
        if let Some(parent) = removed.parent.and_then(|parent| self.entities.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
        Some(removed)
    }

    /// Move an entity under a new parent
    pub fn set_parent(&mut self, id: EntityId, new_parent: EntityId) -> bool {
        if !self.entities.contains_key(&new_parent) {
            return false;
        }
        let Some(old_parent) = self.entities.get(&id).map(|entity| entity.parent) else {
            return false;
        };
        if let Some(old) = old_parent.and_then(|old| self.entities.get_mut(&old)) {
            old.children.retain(|child| *child != id);
        }
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.parent = Some(new_parent);
        }
        if let Some(parent) = self.entities.get_mut(&new_parent) {
            parent.children.push(id);
        }
        true
    }

    /// Mutable access to an entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Number of entities including the root
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether only the root is present
    pub fn is_empty(&self) -> bool {
        self.entities.len() <= 1
    }
}

impl SceneModel for EntityTree {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn content_root(&self) -> EntityId {
        self.root
    }

    fn issue_transaction_id(&self) -> u64 {
        let id = self.next_transaction.get();
        self.next_transaction.set(id + 1);
        id
    }
}
