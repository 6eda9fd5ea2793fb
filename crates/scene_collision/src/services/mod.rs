//! Collaborators the engine consults
//!
//! Everything here is a seam: the editor plugs in its own picking,
//! triangle-level checks and warning sink. [`ZoneGeometry`] is a
//! mesh-backed implementation of the first two, [`LogReporter`] and
//! [`RecordingReporter`] cover the third.

mod zone_geometry;

pub use zone_geometry::ZoneGeometry;

use std::cell::RefCell;

use crate::bounds::BoundingVolume;
use crate::foundation::math::Vec3;
use crate::physics::Ray;
use crate::scene::EntityId;
use crate::wrapper::WrapperView;

/// Data integrity problems found while answering a query.
///
/// These never abort a query; the offending entity is left out and the
/// warning goes to the [`ErrorReporter`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IntegrityWarning {
    /// A wrapper whose parent has neither a wrapper nor a segmentable entity
    #[error("orphaned wrapper: entity {entity} has parent {parent} with no wrapper")]
    OrphanedWrapper {
        /// Entity whose chain broke
        entity: EntityId,
        /// Parent without a wrapper
        parent: EntityId,
    },

    /// A parent id the scene does not know
    #[error("entity {entity} names unknown parent {parent}")]
    UnknownParent {
        /// Entity naming the parent
        entity: EntityId,
        /// The unknown id
        parent: EntityId,
    },

    /// An entity off the content root with no parent at all
    #[error("entity {0} has no parent and is not the content root")]
    MissingParent(EntityId),

    /// Parent chain longer than the configured bound, or cyclic
    #[error("parent chain of entity {entity} exceeds {limit} levels")]
    DepthExceeded {
        /// Entity whose chain was walked
        entity: EntityId,
        /// Configured bound
        limit: usize,
    },

    /// A property holding a value of the wrong shape
    #[error("property '{key}' of entity {entity} is malformed: expected {expected}, found {found}")]
    MalformedProperty {
        /// Owner of the property
        entity: EntityId,
        /// Property key
        key: String,
        /// Shape the engine reads
        expected: &'static str,
        /// Shape actually stored
        found: String,
    },
}

/// Sink for human-readable data integrity warnings
pub trait ErrorReporter {
    /// Record one warning; must not panic
    fn report(&self, warning: IntegrityWarning);
}

/// Reporter that forwards every warning to `log::warn!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, warning: IntegrityWarning) {
        log::warn!("{warning}");
    }
}

/// Reporter that keeps every warning, for tests and tooling
#[derive(Debug, Default)]
pub struct RecordingReporter {
    warnings: RefCell<Vec<IntegrityWarning>>,
}

impl RecordingReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every warning received so far
    pub fn warnings(&self) -> Vec<IntegrityWarning> {
        self.warnings.borrow().clone()
    }

    /// Number of warnings received
    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// Forget all warnings
    pub fn clear(&self) {
        self.warnings.borrow_mut().clear();
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, warning: IntegrityWarning) {
        log::debug!("recorded warning: {warning}");
        self.warnings.borrow_mut().push(warning);
    }
}

/// One object struck by a pick ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Entity that was hit
    pub entity: EntityId,
    /// World-space hit point
    pub point: Vec3,
    /// Distance along the ray
    pub distance: f32,
}

/// Scene picking
pub trait PickService {
    /// Every object along the ray, nearest first
    fn cast_ray(&self, ray: &Ray) -> Vec<PickHit>;
}

/// Triangle-level confirmation of a coarse hit against a zone
pub trait GeometryChecker {
    /// Whether `volume` (already in world space) touches the rendered
    /// geometry of `target`. With `use_epsilon`, surfaces that only touch
    /// within the contact epsilon do not count.
    fn check(&self, volume: &BoundingVolume, target: &dyn WrapperView, use_epsilon: bool) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.report(IntegrityWarning::MissingParent(EntityId::new(1)));
        reporter.report(IntegrityWarning::UnknownParent {
            entity: EntityId::new(2),
            parent: EntityId::new(9),
        });

        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.warnings()[0], IntegrityWarning::MissingParent(EntityId::new(1)));
        reporter.clear();
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_warning_messages_name_the_entities() {
        let warning = IntegrityWarning::OrphanedWrapper {
            entity: EntityId::new(4),
            parent: EntityId::new(3),
        };
        let message = warning.to_string();
        assert!(message.contains("#4") && message.contains("#3"), "{message}");
    }
}
