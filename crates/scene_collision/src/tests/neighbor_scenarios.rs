//! Nearest-neighbor searches across the showroom

use std::cell::RefCell;
use std::rc::Rc;

use super::fixtures::*;
use crate::core::CollisionConfig;
use crate::engine::CollisionEngine;
use crate::foundation::math::{Axis, Vec3};
use crate::scene::{Entity, EntityId, EntityKind, SceneModel};
use crate::wrapper::EntityWrapper;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_probe_is_cut_behind_the_entity() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let probe = engine
            .probe_region(TABLE, Axis::PosX, Some(Vec3::new(12.0, 0.0, 0.0)))
            .expect("table is placeable");
        assert_relative_eq!(probe.min(), Vec3::new(0.0, -0.5, -0.5));
        assert_relative_eq!(probe.max(), Vec3::new(12.5, 0.5, 0.5));
        assert_relative_eq!(probe.world_center(), Vec3::new(8.25, 0.5, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ray_pulls_in_the_adjoining_zone() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let neighbors = engine.nearest_neighbors(ROOM, TABLE, Axis::PosX, Some(Vec3::new(12.0, 0.0, 0.0)));
        assert_eq!(neighbors, vec![CHAIR, HALL, SOFA]);
    }

    #[test]
    fn test_without_pick_service_only_the_given_zone_is_searched() {
        let showroom = Showroom::new();
        let scene: Rc<RefCell<dyn SceneModel>> = showroom.tree.clone();
        let mut engine = CollisionEngine::new(scene, CollisionConfig::default())
            .with_geometry_checker(showroom.geometry.clone());
        engine.set_entity_manager(Some(Rc::clone(&showroom.registry)));

        let neighbors = engine.nearest_neighbors(ROOM, TABLE, Axis::PosX, Some(Vec3::new(12.0, 0.0, 0.0)));
        assert_eq!(neighbors, vec![CHAIR]);
    }

    #[test]
    fn test_negative_axis_lists_table_then_lamp() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let neighbors = engine.nearest_neighbors(ROOM, CHAIR, Axis::NegX, Some(Vec3::new(5.0, 0.5, 0.0)));
        assert_eq!(neighbors, vec![TABLE, LAMP]);
    }

    #[test]
    fn test_three_in_a_row_come_back_nearest_first() {
        let showroom = Showroom::new();
        {
            let mut tree = showroom.tree.borrow_mut();
            let mut registry = showroom.registry.borrow_mut();
            // Inserted far to near so that encounter order is reversed
            for (raw, x) in [(45, 4.5), (43, 3.5), (41, 2.5)] {
                let crate_box = Entity::new(EntityId::new(raw), EntityKind::Model)
                    .with_parent(ROOM)
                    .with_position(Vec3::new(x, 0.5, 8.0));
                registry.insert(EntityWrapper::new(&crate_box, cube(0.5)));
                tree.insert(crate_box);
            }
            let origin = Entity::new(EntityId::new(40), EntityKind::Model)
                .with_parent(ROOM)
                .with_position(Vec3::new(1.5, 0.5, 8.0));
            registry.insert(EntityWrapper::new(&origin, cube(0.5)));
            tree.insert(origin);
        }
        let mut engine = showroom.engine();

        let neighbors = engine.nearest_neighbors(ROOM, EntityId::new(40), Axis::PosX, Some(Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(
            neighbors,
            vec![EntityId::new(41), EntityId::new(43), EntityId::new(45)]
        );
    }

    #[test]
    fn test_surrogates_take_part_when_configured() {
        let showroom = Showroom::new();
        let adjust = Some(Vec3::new(12.0, 0.0, 0.0));

        let mut engine = showroom.engine();
        engine
            .update_surrogate(&move_to(CHAIR, 8.0, 0.5, 8.0))
            .expect("chair surrogate");
        assert_eq!(engine.nearest_neighbors(ROOM, TABLE, Axis::PosX, adjust), vec![HALL, SOFA]);

        let config = CollisionConfig {
            surrogates_in_neighbor_search: false,
            ..CollisionConfig::default()
        };
        let mut committed_only = showroom.engine_with(config);
        committed_only
            .update_surrogate(&move_to(CHAIR, 8.0, 0.5, 8.0))
            .expect("chair surrogate");
        assert_eq!(
            committed_only.nearest_neighbors(ROOM, TABLE, Axis::PosX, adjust),
            vec![CHAIR, HALL, SOFA]
        );
    }

    #[test]
    fn test_unplaceable_entity_has_no_neighbors() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        assert!(engine.nearest_neighbors(ROOM, EntityId::new(99), Axis::PosX, None).is_empty());
        assert!(engine.probe_region(EntityId::new(99), Axis::PosX, None).is_none());

        engine.set_entity_manager(None);
        assert!(engine.nearest_neighbors(ROOM, TABLE, Axis::PosX, None).is_empty());
    }
}
