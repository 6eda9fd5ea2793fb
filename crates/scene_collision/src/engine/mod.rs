//! # Collision Engine
//!
//! Answers "what would this pending command run into?" and "what lies next
//! to this entity along an axis?" without touching the scene.
//!
//! ## Architecture
//!
//! A query runs synchronously to completion:
//!
//! 1. The command is validated and its entity's post-command state is
//!    built as a surrogate.
//! 2. The active set is assembled: every wrapper of the current zone,
//!    shadowed by live surrogates when the query enables them, plus the
//!    source surrogate.
//! 3. World transforms are resolved for the members; those that fail are
//!    left out and, unless merely hidden, reported.
//! 4. Bounds are tested pairwise, with zone targets confirmed against
//!    their rendered geometry.
//!
//! ## Sessions
//!
//! The engine owns its scratch state (matrix stack, surrogate overlay), so
//! one engine serves one editing session. Editors working concurrently
//! each need their own engine; nothing here is `Send`.

mod active_set;
mod collision;
mod proximity;

pub use active_set::ActiveSet;

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::{Command, SegmentCommand};
use crate::core::CollisionConfig;
use crate::foundation::math::Mat4;
use crate::hierarchy::TransformResolver;
use crate::scene::{EntityId, EntityKind, SceneModel};
use crate::services::{ErrorReporter, GeometryChecker, LogReporter, PickService};
use crate::surrogate::{SurrogateBuilder, SurrogateOverlay, SurrogateWrapper};
use crate::wrapper::{WrapperRegistry, WrapperView};

/// Why a command could not be evaluated.
///
/// Callers that only need a yes/no answer treat every variant like "no
/// collisions"; `test_command` does exactly that.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unevaluable {
    /// No wrapper registry is active
    #[error("no active zone")]
    NoActiveZone,

    /// The command leaves nothing to test
    #[error("'{0}' commands cannot be evaluated")]
    UnsupportedCommand(&'static str),

    /// The entity is not a collision source
    #[error("entity {0} of kind {1:?} cannot be evaluated")]
    UnsupportedEntity(EntityId, EntityKind),

    /// The scene does not know the entity
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// No parent could be resolved for the post-command state
    #[error("no parent could be resolved for entity {0}")]
    UnresolvedParent(EntityId),

    /// The post-command state has no world transform
    #[error("world transform of entity {0} could not be resolved")]
    UnresolvedTransform(EntityId),
}

/// Flags of a collision query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Let live surrogates stand in for their committed entities
    pub use_surrogates: bool,
    /// Test the source with its extended bounds
    pub source_extended: bool,
    /// Test targets with their extended bounds
    pub target_extended: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            use_surrogates: true,
            source_extended: false,
            target_extended: false,
        }
    }
}

impl QueryOptions {
    /// Builder pattern: enable or disable surrogates
    pub fn with_surrogates(mut self, enabled: bool) -> Self {
        self.use_surrogates = enabled;
        self
    }

    /// Builder pattern: choose standard or extended bounds on both sides
    pub fn with_extended(mut self, source: bool, target: bool) -> Self {
        self.source_extended = source;
        self.target_extended = target;
        self
    }
}

/// Speculative collision and proximity queries over one editing session
pub struct CollisionEngine {
    scene: Rc<RefCell<dyn SceneModel>>,
    registry: Option<Rc<RefCell<WrapperRegistry>>>,
    overlay: SurrogateOverlay,
    config: CollisionConfig,
    resolver: TransformResolver,
    reporter: Rc<dyn ErrorReporter>,
    checker: Option<Rc<dyn GeometryChecker>>,
    picker: Option<Rc<dyn PickService>>,
}

impl CollisionEngine {
    /// Create an engine reading `scene`, with no active zone yet.
    ///
    /// Warnings go to the log until a reporter is set.
    pub fn new(scene: Rc<RefCell<dyn SceneModel>>, config: CollisionConfig) -> Self {
        let resolver = TransformResolver::new(config.max_hierarchy_depth);
        Self {
            scene,
            registry: None,
            overlay: SurrogateOverlay::new(),
            config,
            resolver,
            reporter: Rc::new(LogReporter),
            checker: None,
            picker: None,
        }
    }

    /// Builder pattern: set the warning sink
    pub fn with_reporter(mut self, reporter: Rc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Builder pattern: set the triangle-level zone checker.
    ///
    /// Without one, a box hit against a zone is accepted as is.
    pub fn with_geometry_checker(mut self, checker: Rc<dyn GeometryChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Builder pattern: set the pick service used to find adjoining zones
    pub fn with_pick_service(mut self, picker: Rc<dyn PickService>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Point the engine at the wrapper registry of the active zone.
    ///
    /// `None` means no zone is active; every query then comes back empty.
    pub fn set_entity_manager(&mut self, registry: Option<Rc<RefCell<WrapperRegistry>>>) {
        log::debug!("active zone {}", if registry.is_some() { "set" } else { "cleared" });
        self.registry = registry;
    }

    /// Whether a zone is active
    pub fn has_entity_manager(&self) -> bool {
        self.registry.is_some()
    }

    /// Configuration in use
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Surrogate tracking
    // ---------------------------------------------------------------------

    /// Build the surrogate for `command` and keep it as its entity's live
    /// surrogate, superseding any previous one.
    pub fn update_surrogate(&mut self, command: &Command) -> Result<(), Unevaluable> {
        let registry = self.registry.clone().ok_or(Unevaluable::NoActiveZone)?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();

        let mut surrogate = self.prepare_source(&*scene, &registry, command, true)?;
        surrogate.set_transaction(scene.issue_transaction_id());
        log::debug!("tracking surrogate for {} ({})", command.entity_id(), command.name());
        self.overlay.insert(surrogate);
        Ok(())
    }

    /// Drop the live surrogate of an entity
    pub fn discard_surrogate(&mut self, id: EntityId) -> Option<SurrogateWrapper> {
        self.overlay.remove(id)
    }

    /// Restore every side-pocketed state, then drop every surrogate.
    /// Returns the number of snapshots restored.
    pub fn clear_surrogates(&mut self) -> usize {
        self.overlay.clear()
    }

    /// Live surrogate of an entity
    pub fn surrogate(&self, id: EntityId) -> Option<&SurrogateWrapper> {
        self.overlay.get(id)
    }

    /// Mutable live surrogate of an entity, for trial edits
    pub fn surrogate_mut(&mut self, id: EntityId) -> Option<&mut SurrogateWrapper> {
        self.overlay.get_mut(id)
    }

    /// Whether any surrogate is live
    pub fn has_surrogates(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// The surrogate overlay
    pub fn surrogates(&self) -> &SurrogateOverlay {
        &self.overlay
    }

    /// Snapshot the surrogate of `id` before a trial edit. Only the first
    /// snapshot per entity is kept.
    pub fn set_side_pocketed_original_surrogate_state(&mut self, id: EntityId) -> bool {
        self.overlay.begin_trial(id)
    }

    /// Roll the surrogate of `id` back to its snapshot
    pub fn remove_side_pocketed_original_surrogate_state(&mut self, id: EntityId) -> bool {
        self.overlay.rollback_trial(id)
    }

    /// Keep the trial state of `id` and drop its snapshot
    pub fn commit_side_pocketed_surrogate_state(&mut self, id: EntityId) -> bool {
        self.overlay.commit_trial(id)
    }

    // ---------------------------------------------------------------------
    // Validation and transforms
    // ---------------------------------------------------------------------

    /// Whether `command` can be evaluated, without running any
    /// intersection test
    pub fn validate(&mut self, command: &Command, use_surrogates: bool) -> Result<(), Unevaluable> {
        let registry = self.registry.clone().ok_or(Unevaluable::NoActiveZone)?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;

        let source = self.prepare_source(scene, &registry, command, use_surrogates)?;
        let overlay = use_surrogates.then_some(&self.overlay);
        let derived = self.derived_segments(scene, &registry, overlay);
        let mut active = ActiveSet::build(&registry, overlay).with_derived(&derived);
        active.insert(&source);
        collision::place(&mut self.resolver, &active, scene, &*self.reporter, &source)
            .map(|_| ())
            .ok_or(Unevaluable::UnresolvedTransform(source.entity_id()))
    }

    /// World transform of an entity's wrapper, surrogates included.
    /// `None` when no zone is active, the entity has no wrapper, or its
    /// chain does not reach the content root.
    pub fn resolve_world_transform(&mut self, id: EntityId) -> Option<Mat4> {
        let registry = self.registry.clone()?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;

        let derived = self.derived_segments(scene, &registry, Some(&self.overlay));
        let active = ActiveSet::build(&registry, Some(&self.overlay)).with_derived(&derived);
        let wrapper = active.get(id)?;
        collision::place(&mut self.resolver, &active, scene, &*self.reporter, wrapper)
            .map(|placed| placed.world)
    }

    /// Walls rebuilt from the pending positions of their end vertices.
    ///
    /// Only segments without a surrogate of their own and with at least one
    /// end vertex under a live surrogate are rebuilt; the rest keep their
    /// rendered geometry.
    fn derived_segments(
        &self,
        scene: &dyn SceneModel,
        registry: &WrapperRegistry,
        overlay: Option<&SurrogateOverlay>,
    ) -> Vec<SurrogateWrapper> {
        let Some(overlay) = overlay.filter(|overlay| !overlay.is_empty()) else {
            return Vec::new();
        };
        let builder = SurrogateBuilder::new(scene, registry, &self.config, &*self.reporter).with_overlay(Some(overlay));

        registry
            .iter()
            .filter(|(id, wrapper)| wrapper.kind() == EntityKind::Segment && overlay.get(*id).is_none())
            .filter_map(|(id, _)| {
                let ends = scene.entity(id)?.segment?;
                if overlay.get(ends.start).is_none() && overlay.get(ends.end).is_none() {
                    return None;
                }
                let rebuild = Command::MoveSegment(SegmentCommand {
                    segment: id,
                    start_position: None,
                    end_position: None,
                });
                match builder.build(&rebuild) {
                    Ok(segment) => Some(segment),
                    Err(reason) => {
                        log::trace!("segment {id} keeps its rendered geometry: {reason}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Check the command and entity kinds, then build the source surrogate
    fn prepare_source(
        &self,
        scene: &dyn SceneModel,
        registry: &WrapperRegistry,
        command: &Command,
        use_surrogates: bool,
    ) -> Result<SurrogateWrapper, Unevaluable> {
        if !command.is_mutating() {
            return Err(Unevaluable::UnsupportedCommand(command.name()));
        }
        let id = command.entity_id();
        let kind = match command.pending_entity() {
            Some(entity) => entity.kind,
            None => scene.entity(id).ok_or(Unevaluable::UnknownEntity(id))?.kind,
        };
        if !kind.is_collision_source() {
            return Err(Unevaluable::UnsupportedEntity(id, kind));
        }

        SurrogateBuilder::new(scene, registry, &self.config, &*self.reporter)
            .with_overlay(use_surrogates.then_some(&self.overlay))
            .build(command)
    }
}
