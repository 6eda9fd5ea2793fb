//! # Scene Collision
//!
//! Speculative collision and proximity queries for an editable 3D scene.
//!
//! Given a pending edit to an entity (move, rotate, scale, reparent,
//! insert, wall segment edit), the engine works out what the edited entity
//! would overlap once the edit lands, without mutating the scene. It can
//! also list what sits next to an entity along an axis, nearest first.
//!
//! ## Features
//!
//! - **Surrogates**: pending state of an entity kept beside the committed
//!   scene, with snapshot and rollback for trial edits
//! - **Hierarchy resolution**: world transforms through partially pending
//!   parent chains
//! - **Oriented boxes**: separating-axis tests with context-dependent slack
//! - **Zone confirmation**: coarse hits on rooms and walls are checked
//!   against their rendered triangles
//! - **Neighbor ordering**: recursive bisection of a directional probe
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use scene_collision::prelude::*;
//!
//! let root = EntityId::new(0);
//! let scene = Rc::new(RefCell::new(EntityTree::new(root)));
//! let registry = Rc::new(RefCell::new(WrapperRegistry::new()));
//!
//! let mut engine = CollisionEngine::new(scene, CollisionConfig::default());
//! engine.set_entity_manager(Some(registry));
//!
//! let command = Command::Move(MoveCommand {
//!     entity: EntityId::new(7),
//!     end_position: Vec3::new(1.0, 0.0, 2.0),
//! });
//! for hit in engine.test_command(&command, QueryOptions::default()) {
//!     println!("would collide with {hit}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core configuration
pub mod core;
pub mod config;

pub mod foundation;
pub mod bounds;
pub mod physics;
pub mod scene;
pub mod wrapper;
pub mod command;
pub mod surrogate;
pub mod hierarchy;
pub mod services;
pub mod neighbors;
pub mod engine;

#[cfg(test)]
mod tests;

pub use engine::{CollisionEngine, QueryOptions, Unevaluable};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        CollisionEngine, QueryOptions, Unevaluable,
        bounds::{BoundingVolume, OrientedBox},
        command::{
            ChangePropertyCommand, Command, DeleteCommand, InsertCommand, MoveCommand,
            ReparentCommand, RotateCommand, ScaleCommand, SegmentCommand,
        },
        config::Config,
        core::CollisionConfig,
        foundation::math::{Axis, Mat4, Quat, Vec3},
        hierarchy::Unresolved,
        physics::{Ray, Triangle, ZoneMesh},
        scene::{Entity, EntityId, EntityKind, EntityTree, PropertyValue, SceneModel},
        services::{
            ErrorReporter, GeometryChecker, IntegrityWarning, LogReporter, PickHit, PickService,
            RecordingReporter, ZoneGeometry,
        },
        surrogate::{SurrogateOverlay, SurrogateWrapper},
        wrapper::{EntityWrapper, SegmentWrapper, WrapperRegistry, WrapperView},
    };
}
