//! Directional probes and bisection ordering
//!
//! A neighbor search looks outward from an entity along one signed axis.
//! The probe is the entity's own box, optionally grown, with the half
//! behind the entity cut away. Candidates found by the probe are ordered
//! by halving it across the axis and settling whatever lands alone in a
//! half, near half first. Entities that cannot be told apart before the
//! slabs get thinner than the configured threshold are settled together,
//! in the order they were found.

use crate::bounds::BoundingVolume;
use crate::foundation::math::{Axis, Mat4, Vec3};
use crate::scene::EntityId;

/// Bisection never goes deeper than this, whatever the threshold
const MAX_BISECTION_DEPTH: usize = 48;

/// A neighbor candidate with its bounds in world space
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Candidate entity
    pub entity: EntityId,
    /// World-space bounds
    pub bounds: BoundingVolume,
    /// Slack used when testing this candidate against probe slabs
    pub tolerance: f32,
}

/// Probe region for a search from `bounds` along `axis`.
///
/// The scaled extents of `bounds` are grown by `adjust` on every side,
/// then the side opposite `axis` is cut back to the entity origin. The
/// result carries `world` as its transform.
pub fn probe_region(bounds: &BoundingVolume, world: &Mat4, axis: Axis, adjust: Option<Vec3>) -> BoundingVolume {
    let adjust = adjust.unwrap_or_else(Vec3::zeros);
    let mut min = bounds.scaled_min() - adjust;
    let mut max = bounds.scaled_max() + adjust;

    let index = axis.index();
    if axis.is_positive() {
        min[index] = 0.0;
        max[index] = max[index].max(0.0);
    } else {
        max[index] = 0.0;
        min[index] = min[index].min(0.0);
    }

    let mut probe = BoundingVolume::new(min, max);
    probe.set_transform(*world);
    probe
}

/// Order `candidates` nearest first along `axis` within `probe`
pub fn order_by_bisection(
    probe: &BoundingVolume,
    axis: Axis,
    candidates: Vec<Candidate>,
    min_thickness: f32,
) -> Vec<EntityId> {
    let mut ordered = Vec::with_capacity(candidates.len());
    if candidates.len() <= 1 {
        ordered.extend(candidates.into_iter().map(|candidate| candidate.entity));
        return ordered;
    }
    bisect(probe, axis, candidates, min_thickness, 0, &mut ordered);
    ordered
}

fn bisect(
    probe: &BoundingVolume,
    axis: Axis,
    candidates: Vec<Candidate>,
    min_thickness: f32,
    depth: usize,
    ordered: &mut Vec<EntityId>,
) {
    let index = axis.index();
    let (low, high) = (probe.min()[index], probe.max()[index]);
    let middle = (low + high) * 0.5;
    let halves = if axis.is_positive() {
        [(low, middle), (middle, high)]
    } else {
        [(middle, high), (low, middle)]
    };

    let mut remaining = candidates;
    for (start, end) in halves {
        if remaining.is_empty() {
            return;
        }

        let mut min = probe.min();
        let mut max = probe.max();
        min[index] = start;
        max[index] = end;
        let mut half = probe.clone();
        half.set_extents(min, max);

        let (hits, rest): (Vec<Candidate>, Vec<Candidate>) = remaining
            .into_iter()
            .partition(|candidate| half.intersects(&candidate.bounds, candidate.tolerance));
        remaining = rest;

        if hits.is_empty() {
            continue;
        }
        if hits.len() == 1 || end - start < min_thickness || depth >= MAX_BISECTION_DEPTH {
            ordered.extend(hits.into_iter().map(|candidate| candidate.entity));
        } else {
            bisect(&half, axis, hits, min_thickness, depth + 1, ordered);
        }
    }

    // Only reachable through rounding at a slab boundary
    ordered.extend(remaining.into_iter().map(|candidate| candidate.entity));
}
