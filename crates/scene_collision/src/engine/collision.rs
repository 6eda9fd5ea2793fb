//! Pending-command collision tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::bounds::BoundingVolume;
use crate::command::Command;
use crate::core::CollisionConfig;
use crate::foundation::math::Mat4;
use crate::hierarchy::TransformResolver;
use crate::scene::{EntityId, EntityKind, SceneModel};
use crate::services::{ErrorReporter, GeometryChecker};
use crate::wrapper::{WrapperLookup, WrapperView};
use super::{ActiveSet, CollisionEngine, QueryOptions, Unevaluable};

/// A member of the active set with its bounds moved into world space
pub(crate) struct Placed<'a> {
    pub view: &'a dyn WrapperView,
    pub world: Mat4,
    pub bounds: BoundingVolume,
    pub extended: BoundingVolume,
}

impl Placed<'_> {
    pub fn id(&self) -> EntityId {
        self.view.entity_id()
    }

    pub fn kind(&self) -> EntityKind {
        self.view.kind()
    }

    pub fn bounds_for(&self, extended: bool) -> &BoundingVolume {
        if extended {
            &self.extended
        } else {
            &self.bounds
        }
    }
}

/// Resolve `view` and transform private copies of its bounds into world
/// space. Failures are reported (unless merely hidden) and yield `None`.
pub(crate) fn place<'a>(
    resolver: &mut TransformResolver,
    lookup: &dyn WrapperLookup,
    scene: &dyn SceneModel,
    reporter: &dyn ErrorReporter,
    view: &'a dyn WrapperView,
) -> Option<Placed<'a>> {
    match resolver.resolve(view, lookup, scene) {
        Ok(world) => {
            let mut bounds = view.bounds().clone();
            bounds.transform_by(&world);
            let mut extended = view.extended_bounds().clone();
            extended.transform_by(&world);
            Some(Placed {
                view,
                world,
                bounds,
                extended,
            })
        }
        Err(unresolved) => {
            match unresolved.warning() {
                Some(warning) => reporter.report(warning),
                None => log::trace!("{} skipped: {unresolved}", view.entity_id()),
            }
            None
        }
    }
}

/// Read-only collaborators of one collision pass
struct Pass<'a> {
    config: &'a CollisionConfig,
    checker: Option<&'a dyn GeometryChecker>,
    options: QueryOptions,
}

impl Pass<'_> {
    /// Box test with zone slack, confirmed on geometry for zone targets
    fn collides(&self, source: &Placed<'_>, target: &Placed<'_>, target_extended: bool) -> bool {
        let zone_involved = source.kind().is_zone() || target.kind().is_zone();
        let source_bounds = source.bounds_for(self.options.source_extended);
        let target_bounds = target.bounds_for(target_extended);

        if !source_bounds.intersects(target_bounds, self.config.tolerance(zone_involved)) {
            log::trace!("{} / {}: clear", source.id(), target.id());
            return false;
        }
        if !target.kind().is_zone() {
            log::trace!("{} / {}: boxes overlap", source.id(), target.id());
            return true;
        }
        let confirmed = self
            .checker
            .map_or(true, |checker| checker.check(source_bounds, target.view, true));
        log::trace!("{} / zone {}: geometry {}", source.id(), target.id(), if confirmed { "hit" } else { "clear" });
        confirmed
    }
}

/// Whether a member takes part as a target
fn is_target(view: &dyn WrapperView) -> bool {
    view.is_enabled() && !view.kind().is_grouping()
}

impl CollisionEngine {
    /// Entities the post-command state of the command's entity would
    /// collide with; empty when the command cannot be evaluated
    pub fn test_command(&mut self, command: &Command, options: QueryOptions) -> Vec<EntityId> {
        self.evaluate(command, options).unwrap_or_else(|reason| {
            log::debug!("{} on {} not evaluated: {reason}", command.name(), command.entity_id());
            Vec::new()
        })
    }

    /// Like [`Self::test_command`], but also tests every descendant of the
    /// command's entity. Keys are the entity and each placed descendant.
    pub fn test_command_extended(
        &mut self,
        command: &Command,
        options: QueryOptions,
    ) -> BTreeMap<EntityId, Vec<EntityId>> {
        self.evaluate_extended(command, options).unwrap_or_else(|reason| {
            log::debug!("{} on {} not evaluated: {reason}", command.name(), command.entity_id());
            BTreeMap::new()
        })
    }

    /// [`Self::test_command`] with the reason when nothing could be tested
    pub fn evaluate(&mut self, command: &Command, options: QueryOptions) -> Result<Vec<EntityId>, Unevaluable> {
        let registry = self.registry.clone().ok_or(Unevaluable::NoActiveZone)?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;
        let reporter = &*self.reporter;

        let source = self.prepare_source(scene, &registry, command, options.use_surrogates)?;
        let overlay = options.use_surrogates.then_some(&self.overlay);
        let derived = self.derived_segments(scene, &registry, overlay);
        let mut active = ActiveSet::build(&registry, overlay).with_derived(&derived);
        active.insert(&source);

        let source_id = command.entity_id();
        let placed_source = place(&mut self.resolver, &active, scene, reporter, &source)
            .ok_or(Unevaluable::UnresolvedTransform(source_id))?;

        let pass = Pass {
            config: &self.config,
            checker: self.checker.as_deref(),
            options,
        };
        let carried: HashSet<EntityId> = scene.descendants(source_id).into_iter().collect();

        let mut hits = Vec::new();
        for (id, view) in active.iter() {
            if id == source_id || carried.contains(&id) || !is_target(view) {
                continue;
            }
            let Some(target) = place(&mut self.resolver, &active, scene, reporter, view) else {
                continue;
            };
            if pass.collides(&placed_source, &target, options.target_extended) {
                hits.push(id);
            }
        }

        log::debug!(
            "{} on {}: {} active, {} colliding",
            command.name(),
            source_id,
            active.len(),
            hits.len()
        );
        Ok(hits)
    }

    /// [`Self::test_command_extended`] with the reason when nothing could
    /// be tested
    pub fn evaluate_extended(
        &mut self,
        command: &Command,
        options: QueryOptions,
    ) -> Result<BTreeMap<EntityId, Vec<EntityId>>, Unevaluable> {
        let registry = self.registry.clone().ok_or(Unevaluable::NoActiveZone)?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;
        let reporter = &*self.reporter;
        let max_depth = self.config.max_hierarchy_depth;

        let source = self.prepare_source(scene, &registry, command, options.use_surrogates)?;
        let overlay = options.use_surrogates.then_some(&self.overlay);
        let derived = self.derived_segments(scene, &registry, overlay);
        let mut active = ActiveSet::build(&registry, overlay).with_derived(&derived);
        active.insert(&source);

        let source_id = command.entity_id();
        let placed_source = place(&mut self.resolver, &active, scene, reporter, &source)
            .ok_or(Unevaluable::UnresolvedTransform(source_id))?;

        // The command's entity and its descendants move together
        let descendants = if command.pending_entity().is_some() {
            Vec::new()
        } else {
            scene.descendants(source_id)
        };
        let subtree_ids: HashSet<EntityId> = descendants.iter().copied().chain([source_id]).collect();
        let mut subtree = vec![placed_source];
        for id in &descendants {
            let Some(view) = active.get(*id).filter(|view| is_target(*view)) else {
                continue;
            };
            if let Some(placed) = place(&mut self.resolver, &active, scene, reporter, view) {
                subtree.push(placed);
            }
        }

        let mut outside = Vec::new();
        for (id, view) in active.iter() {
            if subtree_ids.contains(&id) || !is_target(view) {
                continue;
            }
            if let Some(placed) = place(&mut self.resolver, &active, scene, reporter, view) {
                outside.push(placed);
            }
        }

        let pass = Pass {
            config: &self.config,
            checker: self.checker.as_deref(),
            options,
        };
        let mut memo: HashMap<(EntityId, EntityId), bool> = HashMap::new();
        let mut results = BTreeMap::new();

        for member in &subtree {
            let mut hits: Vec<EntityId> = outside
                .iter()
                .filter(|target| pass.collides(member, target, options.target_extended))
                .map(Placed::id)
                .collect();

            for other in &subtree {
                let (a, b) = (member.id(), other.id());
                if a == b || scene.is_ancestor(a, b, max_depth) || scene.is_ancestor(b, a, max_depth) {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                let collides = match memo.get(&key) {
                    Some(cached) => *cached,
                    None => {
                        let result = pass.collides(member, other, options.target_extended);
                        memo.insert(key, result);
                        result
                    }
                };
                if collides {
                    hits.push(b);
                }
            }

            results.insert(member.id(), hits);
        }

        log::debug!(
            "{} on {} with {} descendants: {} active, {} pairs memoised",
            command.name(),
            source_id,
            subtree.len() - 1,
            active.len(),
            memo.len()
        );
        Ok(results)
    }
}
