//! Surrogate tracking, trial edits and transform resolution

use super::fixtures::*;
use crate::command::{ChangePropertyCommand, Command, ReparentCommand, ScaleCommand};
use crate::engine::{CollisionEngine, QueryOptions};
use crate::foundation::math::{Point3, Vec3};
use crate::scene::properties::KEY_POSITION;
use crate::scene::{EntityId, PropertyValue};
use crate::wrapper::WrapperView;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world_origin(engine: &mut CollisionEngine, id: EntityId) -> Vec3 {
        engine
            .resolve_world_transform(id)
            .map(|world| world.transform_point(&Point3::origin()).coords)
            .expect("resolvable")
    }

    #[test]
    fn test_lamp_follows_committed_then_pending_table() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        assert_relative_eq!(world_origin(&mut engine, LAMP), Vec3::new(2.0, 1.2, 2.0), epsilon = 1e-5);

        engine
            .update_surrogate(&move_to(TABLE, 6.0, 0.5, 3.0))
            .expect("table surrogate");
        assert_relative_eq!(world_origin(&mut engine, LAMP), Vec3::new(6.0, 1.2, 3.0), epsilon = 1e-5);

        engine.discard_surrogate(TABLE);
        assert_relative_eq!(world_origin(&mut engine, LAMP), Vec3::new(2.0, 1.2, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_wall_stands_upright_in_the_room() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let world = engine.resolve_world_transform(WALL).expect("wall resolves");
        let top = world.transform_point(&Point3::new(0.0, 0.0, 2.5)).coords;
        let bottom = world.transform_point(&Point3::origin()).coords;
        assert_relative_eq!(bottom, Vec3::new(6.0, 0.0, 7.5), epsilon = 1e-5);
        assert_relative_eq!(top, Vec3::new(6.0, 2.5, 7.5), epsilon = 1e-5);
    }

    #[test]
    fn test_unrelated_property_leaves_wall_in_place() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        let committed = engine.resolve_world_transform(WALL).expect("wall resolves");

        let colour = Command::ChangeProperty(ChangePropertyCommand {
            entity: WALL,
            name: "colour".to_string(),
            value: PropertyValue::Text("red".to_string()),
        });
        engine.update_surrogate(&colour).expect("wall surrogate");

        let pending = engine.resolve_world_transform(WALL).expect("wall resolves");
        assert!(engine.surrogate(WALL).is_some());
        assert_relative_eq!(pending, committed, epsilon = 1e-5);
    }

    #[test]
    fn test_dragged_vertex_swings_its_wall() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        let table_in_place = move_to(TABLE, 2.0, 0.5, 2.0);
        assert!(engine.test_command(&table_in_place, QueryOptions::default()).is_empty());

        // Wall now runs diagonally from (6, 6) to the room corner
        engine
            .update_surrogate(&move_to(WALL_END, 0.0, 0.0, 0.0))
            .expect("vertex surrogate");
        assert!(engine.surrogate(WALL).is_none());
        assert_relative_eq!(world_origin(&mut engine, WALL), Vec3::new(3.0, 0.0, 3.0), epsilon = 1e-5);
        assert_eq!(engine.test_command(&table_in_place, QueryOptions::default()), vec![WALL]);
        assert!(engine
            .test_command(&table_in_place, QueryOptions::default().with_surrogates(false))
            .is_empty());

        engine.discard_surrogate(WALL_END);
        assert_relative_eq!(world_origin(&mut engine, WALL), Vec3::new(6.0, 0.0, 7.5), epsilon = 1e-5);
    }

    #[test]
    fn test_reparent_surrogate_moves_lamp_to_chair() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let reparent = Command::Reparent(ReparentCommand {
            entity: LAMP,
            end_parent: CHAIR,
            end_position: None,
            end_rotation: None,
        });
        engine.update_surrogate(&reparent).expect("lamp surrogate");
        assert_relative_eq!(world_origin(&mut engine, LAMP), Vec3::new(5.0, 1.2, 2.0), epsilon = 1e-5);
        assert_eq!(engine.surrogate(LAMP).map(|lamp| lamp.parent()), Some(CHAIR));
    }

    #[test]
    fn test_surrogate_takes_precedence_only_when_enabled() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        engine
            .update_surrogate(&move_to(CHAIR, 8.0, 0.5, 8.0))
            .expect("chair surrogate");

        let onto_old_chair = move_to(TABLE, 5.0, 0.5, 2.0);
        assert!(engine.test_command(&onto_old_chair, QueryOptions::default()).is_empty());
        assert_eq!(
            engine.test_command(&onto_old_chair, QueryOptions::default().with_surrogates(false)),
            vec![CHAIR]
        );
        assert_eq!(
            engine.test_command(&move_to(TABLE, 8.0, 0.5, 8.0), QueryOptions::default()),
            vec![CHAIR]
        );
    }

    #[test]
    fn test_successive_commands_build_on_the_live_surrogate() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        engine
            .update_surrogate(&move_to(CHAIR, 7.0, 0.5, 3.0))
            .expect("moved");
        engine
            .update_surrogate(&Command::Scale(ScaleCommand {
                entity: CHAIR,
                end_scale: Vec3::new(2.0, 1.0, 1.0),
            }))
            .expect("scaled");

        let chair = engine.surrogate(CHAIR).expect("live surrogate");
        assert_relative_eq!(chair.position(), Vec3::new(7.0, 0.5, 3.0));
        assert_relative_eq!(chair.scale(), Vec3::new(2.0, 1.0, 1.0));
        assert!(chair.is_surrogate());
        assert!(chair.transaction().is_some());
    }

    #[test]
    fn test_property_change_moves_surrogate() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        let change = Command::ChangeProperty(ChangePropertyCommand {
            entity: CHAIR,
            name: KEY_POSITION.to_string(),
            value: PropertyValue::vec3(2.0, 0.5, 2.4),
        });
        assert_eq!(engine.test_command(&change, QueryOptions::default()), vec![TABLE]);

        let malformed = Command::ChangeProperty(ChangePropertyCommand {
            entity: CHAIR,
            name: KEY_POSITION.to_string(),
            value: PropertyValue::Float(2.0),
        });
        assert!(engine.test_command(&malformed, QueryOptions::default()).is_empty());
        assert_eq!(showroom.reporter.len(), 1);
    }

    #[test]
    fn test_trial_edit_rolls_back_bit_for_bit() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        engine
            .update_surrogate(&move_to(CHAIR, 7.0, 0.5, 3.0))
            .expect("chair surrogate");
        let before = engine.surrogate(CHAIR).cloned();

        assert!(engine.set_side_pocketed_original_surrogate_state(CHAIR));
        assert!(engine.surrogates().journal().is_open(CHAIR));
        if let Some(chair) = engine.surrogate_mut(CHAIR) {
            chair.set_position(Vec3::new(2.0, 0.5, 2.0));
        }
        // A second snapshot keeps the first one
        assert!(!engine.set_side_pocketed_original_surrogate_state(CHAIR));
        if let Some(chair) = engine.surrogate_mut(CHAIR) {
            chair.set_scale(Vec3::new(3.0, 3.0, 3.0));
        }
        assert_eq!(
            engine.test_command(&move_to(TABLE, 2.0, 0.5, 2.0), QueryOptions::default()),
            vec![CHAIR]
        );

        assert!(engine.remove_side_pocketed_original_surrogate_state(CHAIR));
        assert_eq!(engine.surrogate(CHAIR).cloned(), before);
        assert!(!engine.remove_side_pocketed_original_surrogate_state(CHAIR));
    }

    #[test]
    fn test_trial_without_prior_surrogate_rolls_back_to_none() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();

        assert!(engine.set_side_pocketed_original_surrogate_state(TABLE));
        engine
            .update_surrogate(&move_to(TABLE, 6.0, 0.5, 3.0))
            .expect("table surrogate");
        assert!(engine.has_surrogates());

        assert!(engine.remove_side_pocketed_original_surrogate_state(TABLE));
        assert!(engine.surrogate(TABLE).is_none());
    }

    #[test]
    fn test_committed_trial_keeps_its_state() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        engine
            .update_surrogate(&move_to(CHAIR, 7.0, 0.5, 3.0))
            .expect("chair surrogate");

        engine.set_side_pocketed_original_surrogate_state(CHAIR);
        if let Some(chair) = engine.surrogate_mut(CHAIR) {
            chair.set_position(Vec3::new(8.0, 0.5, 3.0));
        }
        assert!(engine.commit_side_pocketed_surrogate_state(CHAIR));
        assert!(!engine.remove_side_pocketed_original_surrogate_state(CHAIR));
        assert_relative_eq!(
            engine.surrogate(CHAIR).map(|chair| chair.position()).expect("live"),
            Vec3::new(8.0, 0.5, 3.0)
        );
    }

    #[test]
    fn test_clear_restores_open_trials_then_drops_everything() {
        let showroom = Showroom::new();
        let mut engine = showroom.engine();
        engine
            .update_surrogate(&move_to(CHAIR, 7.0, 0.5, 3.0))
            .expect("chair surrogate");
        engine
            .update_surrogate(&move_to(TABLE, 3.0, 0.5, 8.0))
            .expect("table surrogate");
        engine.set_side_pocketed_original_surrogate_state(CHAIR);

        assert_eq!(engine.clear_surrogates(), 1);
        assert!(!engine.has_surrogates());
        assert!(engine.surrogates().journal().is_empty());
    }
}
