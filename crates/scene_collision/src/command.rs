//! Pending edit commands
//!
//! The engine never executes a command; it only reads the fields it needs
//! to picture the scene after the command. Each kind carries exactly those
//! fields.

use crate::foundation::math::{Quat, Vec3};
use crate::scene::{Entity, EntityId, PropertyValue};

/// Move an entity within its parent
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    /// Entity being moved
    pub entity: EntityId,
    /// Position after the move
    pub end_position: Vec3,
}

/// Rotate an entity within its parent
#[derive(Debug, Clone, PartialEq)]
pub struct RotateCommand {
    /// Entity being rotated
    pub entity: EntityId,
    /// Rotation after the command
    pub end_rotation: Quat,
}

/// Scale an entity
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleCommand {
    /// Entity being scaled
    pub entity: EntityId,
    /// Scale after the command
    pub end_scale: Vec3,
}

/// Change one named property
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePropertyCommand {
    /// Entity whose property changes
    pub entity: EntityId,
    /// Property key; only position, rotation and scale affect placement
    pub name: String,
    /// New value
    pub value: PropertyValue,
}

/// Move an entity under a different parent
#[derive(Debug, Clone, PartialEq)]
pub struct ReparentCommand {
    /// Entity being reparented
    pub entity: EntityId,
    /// Parent after the command
    pub end_parent: EntityId,
    /// Position in the new parent, if the command sets one
    pub end_position: Option<Vec3>,
    /// Rotation in the new parent, if the command sets one
    pub end_rotation: Option<Quat>,
}

/// Insert a new entity that has not been rendered yet
#[derive(Debug, Clone, PartialEq)]
pub struct InsertCommand {
    /// The full record of the entity to insert
    pub entity: Entity,
}

/// Edit of a wall segment's end positions
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCommand {
    /// Affected segment
    pub segment: EntityId,
    /// New start vertex position, if it changes
    pub start_position: Option<Vec3>,
    /// New end vertex position, if it changes
    pub end_position: Option<Vec3>,
}

/// Remove an entity
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCommand {
    /// Entity being removed
    pub entity: EntityId,
}

/// Every command shape the engine understands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Committed move
    Move(MoveCommand),
    /// Interactive move still being dragged
    TransientMove(MoveCommand),
    /// Committed rotation
    Rotate(RotateCommand),
    /// Interactive rotation
    TransientRotate(RotateCommand),
    /// Committed scale
    Scale(ScaleCommand),
    /// Interactive scale
    TransientScale(ScaleCommand),
    /// Property edit
    ChangeProperty(ChangePropertyCommand),
    /// Reparent, possibly with a new placement
    Reparent(ReparentCommand),
    /// Insert of a not yet rendered entity
    Insert(InsertCommand),
    /// Move of one or both ends of a wall segment
    MoveSegment(SegmentCommand),
    /// Removal of a vertex, leaving the segment spanning new ends
    RemoveSegmentVertex(SegmentCommand),
    /// Removal of an entity
    Delete(DeleteCommand),
}

impl Command {
    /// Id of the entity the command acts on
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Move(command) | Self::TransientMove(command) => command.entity,
            Self::Rotate(command) | Self::TransientRotate(command) => command.entity,
            Self::Scale(command) | Self::TransientScale(command) => command.entity,
            Self::ChangeProperty(command) => command.entity,
            Self::Reparent(command) => command.entity,
            Self::Insert(command) => command.entity.id,
            Self::MoveSegment(command) | Self::RemoveSegmentVertex(command) => command.segment,
            Self::Delete(command) => command.entity,
        }
    }

    /// The entity record carried by an insert, which the scene does not know yet
    pub fn pending_entity(&self) -> Option<&Entity> {
        match self {
            Self::Insert(command) => Some(&command.entity),
            _ => None,
        }
    }

    /// Whether the command leaves something in the scene to collide with
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Delete(_))
    }

    /// Whether the command is an in-progress interactive edit
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransientMove(_) | Self::TransientRotate(_) | Self::TransientScale(_)
        )
    }

    /// Short command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::TransientMove(_) => "transient-move",
            Self::Rotate(_) => "rotate",
            Self::TransientRotate(_) => "transient-rotate",
            Self::Scale(_) => "scale",
            Self::TransientScale(_) => "transient-scale",
            Self::ChangeProperty(_) => "change-property",
            Self::Reparent(_) => "reparent",
            Self::Insert(_) => "insert",
            Self::MoveSegment(_) => "move-segment",
            Self::RemoveSegmentVertex(_) => "remove-segment-vertex",
            Self::Delete(_) => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::EntityKind;

    #[test]
    fn test_entity_id_for_every_shape() {
        let id = EntityId::new(5);
        let commands = [
            Command::TransientMove(MoveCommand { entity: id, end_position: Vec3::zeros() }),
            Command::Insert(InsertCommand { entity: Entity::new(id, EntityKind::Model) }),
            Command::RemoveSegmentVertex(SegmentCommand {
                segment: id,
                start_position: None,
                end_position: None,
            }),
            Command::Delete(DeleteCommand { entity: id }),
        ];
        for command in &commands {
            assert_eq!(command.entity_id(), id, "{}", command.name());
        }
        assert!(commands[0].is_transient());
        assert!(commands[1].pending_entity().is_some());
        assert!(!commands[3].is_mutating());
    }
}
