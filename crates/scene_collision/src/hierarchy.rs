//! World transforms from wrapper hierarchies
//!
//! The resolver walks parent links from a wrapper up to the content root,
//! collecting each hop's local matrix, then composes them root-most first.
//! Only translation and rotation propagate; scale stays on the bounds of
//! the entity that owns it.
//!
//! Segmentable containers have no wrapper of their own. A chain passing
//! through one takes a fixed quarter turn about X for that hop, which
//! stands their plan coordinates (height along +Z) upright: plan +Z
//! becomes world +Y and plan +Y becomes world -Z.

use crate::foundation::math::{constants::HALF_PI, Mat4, Mat4Ext};
use crate::scene::{EntityId, SceneModel};
use crate::services::IntegrityWarning;
use crate::wrapper::{WrapperLookup, WrapperView};

/// Why a wrapper has no world transform
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// A wrapper on the chain is disabled; a normal, silent outcome
    #[error("ancestor {0} is disabled")]
    DisabledAncestor(EntityId),

    /// A parent with no wrapper that is not a segmentable container
    #[error("entity {entity} has parent {parent} with no wrapper")]
    OrphanedWrapper {
        /// Last entity reached
        entity: EntityId,
        /// Its parent
        parent: EntityId,
    },

    /// A parent id the scene does not know
    #[error("entity {entity} has unknown parent {parent}")]
    UnknownParent {
        /// Last entity reached
        entity: EntityId,
        /// The unknown id
        parent: EntityId,
    },

    /// The chain ended before the content root
    #[error("entity {0} has no parent")]
    MissingParent(EntityId),

    /// The chain is longer than allowed, or loops
    #[error("parent chain of {entity} is longer than {limit}")]
    DepthExceeded {
        /// Entity the walk started from
        entity: EntityId,
        /// Configured bound
        limit: usize,
    },
}

impl Unresolved {
    /// Warning to report, `None` for the silent disabled case
    pub fn warning(&self) -> Option<IntegrityWarning> {
        match *self {
            Self::DisabledAncestor(_) => None,
            Self::OrphanedWrapper { entity, parent } => {
                Some(IntegrityWarning::OrphanedWrapper { entity, parent })
            }
            Self::UnknownParent { entity, parent } => {
                Some(IntegrityWarning::UnknownParent { entity, parent })
            }
            Self::MissingParent(entity) => Some(IntegrityWarning::MissingParent(entity)),
            Self::DepthExceeded { entity, limit } => {
                Some(IntegrityWarning::DepthExceeded { entity, limit })
            }
        }
    }
}

/// Composes world transforms with a reusable matrix stack.
///
/// The stack grows on demand and is never shrunk, so steady-state
/// resolution does not allocate. One resolver belongs to one engine.
#[derive(Debug, Clone)]
pub struct TransformResolver {
    stack: Vec<Mat4>,
    max_depth: usize,
}

impl TransformResolver {
    /// Create a resolver that gives up after `max_depth` hops
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::with_capacity(8),
            max_depth,
        }
    }

    /// Current capacity of the scratch stack
    pub fn stack_capacity(&self) -> usize {
        self.stack.len()
    }

    fn put(&mut self, depth: usize, matrix: Mat4) {
        if let Some(slot) = self.stack.get_mut(depth) {
            *slot = matrix;
        } else {
            self.stack.push(matrix);
        }
    }

    /// World transform of `wrapper`.
    ///
    /// Parents are looked up in `lookup`, so a surrogate parent placed
    /// there is honoured. The wrapper's own enabled state is not checked;
    /// only its ancestors can break the chain.
    pub fn resolve(
        &mut self,
        wrapper: &dyn WrapperView,
        lookup: &dyn WrapperLookup,
        scene: &dyn SceneModel,
    ) -> Result<Mat4, Unresolved> {
        let root = scene.content_root();
        let start = wrapper.entity_id();

        self.put(0, wrapper.local_matrix());
        let mut depth = 1;
        let mut current = start;
        let mut parent = wrapper.parent_id(scene);

        loop {
            let Some(parent_id) = parent else {
                return Err(Unresolved::MissingParent(current));
            };
            if parent_id == root {
                break;
            }
            if depth > self.max_depth {
                return Err(Unresolved::DepthExceeded {
                    entity: start,
                    limit: self.max_depth,
                });
            }

            if let Some(parent_wrapper) = lookup.wrapper(parent_id) {
                if !parent_wrapper.is_enabled() {
                    return Err(Unresolved::DisabledAncestor(parent_id));
                }
                self.put(depth, parent_wrapper.local_matrix());
                parent = parent_wrapper.parent_id(scene);
            } else {
                match scene.entity(parent_id) {
                    Some(entity) if entity.kind.is_segmentable() => {
                        // Quarter turn about X: plan +Z (height) to world +Y,
                        // plan +Y to world -Z
                        self.put(depth, Mat4::rotation_x(-HALF_PI));
                        parent = entity.parent;
                    }
                    Some(_) => {
                        return Err(Unresolved::OrphanedWrapper {
                            entity: current,
                            parent: parent_id,
                        });
                    }
                    None => {
                        return Err(Unresolved::UnknownParent {
                            entity: current,
                            parent: parent_id,
                        });
                    }
                }
            }
            current = parent_id;
            depth += 1;
        }

        log::trace!("resolved {start} through {depth} levels");
        Ok(self.stack[..depth]
            .iter()
            .rev()
            .fold(Mat4::identity(), |world, local| world * local))
    }
}
