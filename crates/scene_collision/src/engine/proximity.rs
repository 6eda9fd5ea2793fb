//! Nearest-neighbor search along an axis

use std::collections::HashSet;
use std::rc::Rc;

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Axis, Vec3};
use crate::neighbors::{order_by_bisection, probe_region, Candidate};
use crate::physics::Ray;
use crate::scene::{EntityId, SceneModel};
use super::collision::place;
use super::{ActiveSet, CollisionEngine};

impl CollisionEngine {
    /// Probe region of a neighbor search from `entity` along `axis`, in
    /// world space. `None` when the entity cannot be placed.
    pub fn probe_region(&mut self, entity: EntityId, axis: Axis, adjust: Option<Vec3>) -> Option<BoundingVolume> {
        let registry = self.registry.clone()?;
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;

        let overlay = self.config.surrogates_in_neighbor_search.then_some(&self.overlay);
        let derived = self.derived_segments(scene, &registry, overlay);
        let active = ActiveSet::build(&registry, overlay).with_derived(&derived);
        let subject = place(&mut self.resolver, &active, scene, &*self.reporter, active.get(entity)?)?;
        Some(probe_region(subject.view.bounds(), &subject.world, axis, adjust))
    }

    /// Entities next to `entity` along `axis`, nearest first.
    ///
    /// Candidates are the entities of `zone` and, when a ray from the
    /// entity's centre strikes another zone first, that zone and its
    /// entities. Entities that cannot be placed are left out.
    pub fn nearest_neighbors(
        &mut self,
        zone: EntityId,
        entity: EntityId,
        axis: Axis,
        adjust: Option<Vec3>,
    ) -> Vec<EntityId> {
        let Some(registry) = self.registry.clone() else {
            return Vec::new();
        };
        let registry = registry.borrow();
        let scene = Rc::clone(&self.scene);
        let scene = scene.borrow();
        let scene: &dyn SceneModel = &*scene;
        let reporter = &*self.reporter;

        let overlay = self.config.surrogates_in_neighbor_search.then_some(&self.overlay);
        let derived = self.derived_segments(scene, &registry, overlay);
        let active = ActiveSet::build(&registry, overlay).with_derived(&derived);
        let Some(subject) = active
            .get(entity)
            .and_then(|view| place(&mut self.resolver, &active, scene, reporter, view))
        else {
            return Vec::new();
        };

        let probe = probe_region(subject.view.bounds(), &subject.world, axis, adjust);

        let adjoining = self.picker.as_ref().and_then(|picker| {
            let direction = subject.world.transform_vector(&axis.unit());
            let ray = Ray::new(subject.bounds.world_center(), direction);
            picker
                .cast_ray(&ray)
                .into_iter()
                .map(|hit| hit.entity)
                .find(|hit| {
                    *hit != zone
                        && *hit != entity
                        && scene.entity(*hit).is_some_and(|struck| struck.kind.is_zone())
                })
        });

        let mut pool = scene.descendants(zone);
        if let Some(adjoining) = adjoining {
            log::trace!("ray from {entity} along {axis:?} strikes zone {adjoining}");
            pool.push(adjoining);
            pool.extend(scene.descendants(adjoining));
        }

        let mut skip: HashSet<EntityId> = scene.descendants(entity).into_iter().collect();
        skip.insert(entity);

        let mut candidates = Vec::new();
        for id in pool {
            if !skip.insert(id) {
                continue;
            }
            let Some(view) = active
                .get(id)
                .filter(|view| view.is_enabled() && !view.kind().is_grouping())
            else {
                continue;
            };
            let Some(placed) = place(&mut self.resolver, &active, scene, reporter, view) else {
                continue;
            };
            let tolerance = self.config.tolerance(placed.kind().is_zone()).max(0.0);
            if probe.intersects(&placed.bounds, tolerance) {
                candidates.push(Candidate {
                    entity: id,
                    bounds: placed.bounds,
                    tolerance,
                });
            }
        }

        let found = candidates.len();
        let ordered = order_by_bisection(&probe, axis, candidates, self.config.bisection_min_thickness);
        log::debug!("neighbors of {entity} along {axis:?}: {found} in probe");
        ordered
    }
}
