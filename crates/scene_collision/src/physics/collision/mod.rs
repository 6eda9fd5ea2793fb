//! Triangle primitives and zone meshes
//!
//! - [`primitives`] - rays and triangles with their intersection tests
//! - [`mesh`] - world-space triangle soups for zone geometry

pub mod primitives;
pub mod mesh;

pub use primitives::{Ray, Triangle};
pub use mesh::ZoneMesh;
