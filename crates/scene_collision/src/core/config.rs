//! # Collision Configuration
//!
//! Every tolerance and default the collision engine relies on. Values are in
//! scene units (metres).

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Tunable constants for intersection tests, segment reconstruction and
/// neighbor ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Overlap required before two non-zone boxes count as colliding.
    /// Boxes that only touch within this distance do not collide.
    pub contact_epsilon: f32,
    /// Slack granted whenever a zone takes part in a test. Boxes closer
    /// than this distance count as intersecting.
    pub zone_epsilon: f32,
    /// Probe slabs thinner than this along the query axis stop subdividing.
    pub bisection_min_thickness: f32,
    /// Wall thickness used when a segment carries no thickness property
    pub default_wall_thickness: f32,
    /// Vertex height used when a vertex carries no height property
    pub default_wall_height: f32,
    /// Longest parent chain walked before giving up
    pub max_hierarchy_depth: usize,
    /// Whether live surrogates take part in neighbor searches
    pub surrogates_in_neighbor_search: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            contact_epsilon: 1.0e-4,
            zone_epsilon: 1.0e-2,
            bisection_min_thickness: 0.01,
            default_wall_thickness: 0.1,
            default_wall_height: 2.5,
            max_hierarchy_depth: 64,
            surrogates_in_neighbor_search: true,
        }
    }
}

impl Config for CollisionConfig {
    fn check(&self) -> Result<(), String> {
        self.validate()
    }
}

impl CollisionConfig {
    /// Builder pattern: set the zone tolerance
    pub fn with_zone_epsilon(mut self, epsilon: f32) -> Self {
        self.zone_epsilon = epsilon;
        self
    }

    /// Builder pattern: set the strict contact tolerance
    pub fn with_contact_epsilon(mut self, epsilon: f32) -> Self {
        self.contact_epsilon = epsilon;
        self
    }

    /// Signed slack for a box test: positive widens, negative shrinks.
    pub fn tolerance(&self, use_epsilon: bool) -> f32 {
        if use_epsilon {
            self.zone_epsilon
        } else {
            -self.contact_epsilon
        }
    }

    /// Validate that the configuration is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_epsilon < 0.0 || self.zone_epsilon < 0.0 {
            return Err("epsilons must be non-negative".to_string());
        }
        if self.bisection_min_thickness <= 0.0 {
            return Err("bisection_min_thickness must be positive".to_string());
        }
        if self.max_hierarchy_depth == 0 {
            return Err("max_hierarchy_depth must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CollisionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.tolerance(true) > config.tolerance(false));
    }

    #[test]
    fn test_toml_roundtrip_through_file() {
        let path = std::env::temp_dir().join("scene_collision_config_test.toml");

        let config = CollisionConfig::default().with_zone_epsilon(0.05);
        config.save_to_file(&path).expect("save config");
        let loaded = CollisionConfig::load_from_file(&path).expect("load config");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = CollisionConfig::parse("(zone_epsilon: 0.2)", ConfigFormat::Ron).expect("parse ron");
        assert_eq!(config.zone_epsilon, 0.2);
        assert_eq!(config.max_hierarchy_depth, 64);
    }

    #[test]
    fn test_inconsistent_values_are_rejected_on_load() {
        let result = CollisionConfig::parse("max_hierarchy_depth = 0", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = CollisionConfig::load_from_file("collision.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
        assert!(CollisionConfig::default().save_to_file("collision.json").is_err());
    }
}
