//! Geometry-level collision support
//!
//! Exact tests against rendered geometry. The coarse box tests live in
//! [`crate::bounds`]; this module only handles the triangle-level cases.

pub mod collision;

pub use collision::{Ray, Triangle, ZoneMesh};
