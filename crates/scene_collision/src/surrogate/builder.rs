//! Surrogate construction from pending commands

use crate::bounds::BoundingVolume;
use crate::command::{ChangePropertyCommand, Command, SegmentCommand};
use crate::core::CollisionConfig;
use crate::engine::Unevaluable;
use crate::foundation::math::{quat_from_axis_angle, Quat, Vec3};
use crate::scene::properties::{
    KEY_BOUNDS_BORDER, KEY_MINIMUM_EXTENT, KEY_POSITION, KEY_ROTATION, KEY_SCALE, KEY_SIZE,
    SHEET_DIMENSIONS,
};
use crate::scene::{Entity, EntityId, EntityKind, PropertyValue, SceneModel};
use crate::services::{ErrorReporter, IntegrityWarning};
use crate::wrapper::{SegmentGeometry, WrapperRegistry, WrapperView};
use super::{SurrogateOverlay, SurrogateWrapper};

/// Placement fields a command may overwrite
#[derive(Debug, Clone, Copy)]
struct Placement {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    parent: Option<EntityId>,
}

/// Derives the post-command state of an entity.
///
/// Starting values come from the entity's live surrogate when an overlay
/// is given and holds one, otherwise from the committed entity. Bounds are
/// cloned from the surrogate or the rendered wrapper; entities that were
/// never rendered fall back to their declared dimension properties.
pub struct SurrogateBuilder<'a> {
    scene: &'a dyn SceneModel,
    registry: &'a WrapperRegistry,
    overlay: Option<&'a SurrogateOverlay>,
    config: &'a CollisionConfig,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> SurrogateBuilder<'a> {
    /// Create a builder that ignores live surrogates
    pub fn new(
        scene: &'a dyn SceneModel,
        registry: &'a WrapperRegistry,
        config: &'a CollisionConfig,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            scene,
            registry,
            overlay: None,
            config,
            reporter,
        }
    }

    /// Builder pattern: start from live surrogates in `overlay`
    pub fn with_overlay(mut self, overlay: Option<&'a SurrogateOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Build the surrogate for `command`.
    ///
    /// Fails when the entity is unknown, the command leaves nothing to
    /// place, or no parent can be resolved.
    pub fn build(&self, command: &Command) -> Result<SurrogateWrapper, Unevaluable> {
        let id = command.entity_id();
        let entity = match command.pending_entity() {
            Some(entity) => entity,
            None => self.scene.entity(id).ok_or(Unevaluable::UnknownEntity(id))?,
        };
        let is_new = command.pending_entity().is_some();

        match command {
            Command::Move(move_command) | Command::TransientMove(move_command) => {
                self.build_placed(entity, is_new, |placement| {
                    placement.position = move_command.end_position;
                })
            }
            Command::Rotate(rotate) | Command::TransientRotate(rotate) => {
                self.build_placed(entity, is_new, |placement| {
                    placement.rotation = rotate.end_rotation;
                })
            }
            Command::Scale(scale) | Command::TransientScale(scale) => {
                self.build_placed(entity, is_new, |placement| {
                    placement.scale = scale.end_scale;
                })
            }
            Command::ChangeProperty(change) => self.build_placed(entity, is_new, |placement| {
                self.apply_property(entity.id, change, placement);
            }),
            Command::Reparent(reparent) => self.build_placed(entity, is_new, |placement| {
                placement.parent = Some(reparent.end_parent);
                if let Some(position) = reparent.end_position {
                    placement.position = position;
                }
                if let Some(rotation) = reparent.end_rotation {
                    placement.rotation = rotation;
                }
            }),
            Command::Insert(_) => self.build_placed(entity, is_new, |_| {}),
            Command::MoveSegment(segment) | Command::RemoveSegmentVertex(segment) => {
                self.build_segment(entity, segment)
            }
            Command::Delete(_) => Err(Unevaluable::UnsupportedCommand(command.name())),
        }
    }

    fn build_placed(
        &self,
        entity: &Entity,
        is_new: bool,
        apply: impl FnOnce(&mut Placement),
    ) -> Result<SurrogateWrapper, Unevaluable> {
        let existing = self.overlay.and_then(|overlay| overlay.get(entity.id));
        let rendered = if is_new { None } else { self.registry.get(entity.id) };

        let (mut placement, bounds, extended) = if let Some(surrogate) = existing {
            (
                Placement {
                    position: surrogate.position(),
                    rotation: surrogate.rotation(),
                    scale: surrogate.scale(),
                    parent: Some(surrogate.parent()),
                },
                surrogate.bounds().clone(),
                surrogate.extended_bounds().clone(),
            )
        } else {
            let mut placement = Placement {
                position: entity.position,
                rotation: entity.rotation,
                scale: entity.scale,
                parent: entity.parent,
            };
            match rendered {
                // A segment's placement lives on its wrapper, not its entity
                Some(wrapper) => {
                    placement.position = wrapper.position();
                    placement.rotation = wrapper.rotation();
                    (placement, wrapper.bounds().clone(), wrapper.extended_bounds().clone())
                }
                None => {
                    let declared = self.declared_bounds(entity);
                    (placement, declared.clone(), declared)
                }
            }
        };

        apply(&mut placement);
        self.enforce_minimum_extent(entity, bounds.size(), &mut placement.scale);
        let parent = self.resolve_parent(entity.id, placement.parent)?;

        Ok(SurrogateWrapper::new(
            entity.id,
            entity.kind,
            parent,
            placement.position,
            placement.rotation,
            placement.scale,
            bounds,
            extended,
        ))
    }

    fn build_segment(
        &self,
        entity: &Entity,
        command: &SegmentCommand,
    ) -> Result<SurrogateWrapper, Unevaluable> {
        let ends = match (entity.kind, entity.segment) {
            (EntityKind::Segment, Some(ends)) => ends,
            _ => return Err(Unevaluable::UnsupportedEntity(entity.id, entity.kind)),
        };

        let start = match command.start_position {
            Some(position) => position,
            None => self.vertex_position(ends.start)?,
        };
        let end = match command.end_position {
            Some(position) => position,
            None => self.vertex_position(ends.end)?,
        };

        let thickness = SegmentGeometry::thickness_of(self.scene, entity.id, self.config);
        let height = SegmentGeometry::height_of(self.scene, ends.start, self.config)
            .max(SegmentGeometry::height_of(self.scene, ends.end, self.config));
        let geometry = SegmentGeometry::from_endpoints(start, end, thickness, height);

        let existing_parent = self
            .overlay
            .and_then(|overlay| overlay.get(entity.id))
            .map(SurrogateWrapper::parent);
        let parent = self.resolve_parent(entity.id, existing_parent.or(entity.parent))?;

        Ok(SurrogateWrapper::new(
            entity.id,
            EntityKind::Segment,
            parent,
            geometry.position,
            geometry.rotation,
            Vec3::new(1.0, 1.0, 1.0),
            geometry.bounds.clone(),
            geometry.bounds,
        ))
    }

    /// Position of a vertex, pending if it has a live surrogate
    fn vertex_position(&self, vertex: EntityId) -> Result<Vec3, Unevaluable> {
        if let Some(surrogate) = self.overlay.and_then(|overlay| overlay.get(vertex)) {
            return Ok(surrogate.position());
        }
        self.scene
            .entity(vertex)
            .map(|entity| entity.position)
            .ok_or(Unevaluable::UnknownEntity(vertex))
    }

    fn resolve_parent(&self, id: EntityId, parent: Option<EntityId>) -> Result<EntityId, Unevaluable> {
        let parent = parent.ok_or(Unevaluable::UnresolvedParent(id))?;
        if parent != self.scene.content_root() && self.scene.entity(parent).is_none() {
            self.reporter.report(IntegrityWarning::UnknownParent { entity: id, parent });
            return Err(Unevaluable::UnresolvedParent(id));
        }
        Ok(parent)
    }

    /// Bounds of a never-rendered entity from its size and border properties
    fn declared_bounds(&self, entity: &Entity) -> BoundingVolume {
        let size = self
            .vec3_property(entity, KEY_SIZE)
            .unwrap_or_else(Vec3::zeros);
        let mut volume = BoundingVolume::from_size(size);
        if let Some(border) = self.vec3_property(entity, KEY_BOUNDS_BORDER) {
            volume.set_border(border);
        }
        volume
    }

    /// Grow `scale` so that `size * scale` honours the declared minimum
    fn enforce_minimum_extent(&self, entity: &Entity, size: Vec3, scale: &mut Vec3) {
        let Some(minimum) = self.vec3_property(entity, KEY_MINIMUM_EXTENT) else {
            return;
        };
        for axis in 0..3 {
            if size[axis] <= f32::EPSILON {
                continue;
            }
            if size[axis] * scale[axis].abs() < minimum[axis] {
                scale[axis] = (minimum[axis] / size[axis]).copysign(scale[axis]);
            }
        }
    }

    fn apply_property(&self, id: EntityId, change: &ChangePropertyCommand, placement: &mut Placement) {
        match change.name.as_str() {
            KEY_POSITION => {
                if let Some([x, y, z]) = self.expect_array::<3>(id, KEY_POSITION, &change.value) {
                    placement.position = Vec3::new(x, y, z);
                }
            }
            KEY_ROTATION => {
                if let Some([x, y, z, angle]) = self.expect_array::<4>(id, KEY_ROTATION, &change.value) {
                    placement.rotation = quat_from_axis_angle(Vec3::new(x, y, z), angle);
                }
            }
            KEY_SCALE => {
                if let Some([x, y, z]) = self.expect_array::<3>(id, KEY_SCALE, &change.value) {
                    placement.scale = Vec3::new(x, y, z);
                }
            }
            other => log::trace!("property '{other}' does not affect placement of {id}"),
        }
    }

    fn vec3_property(&self, entity: &Entity, key: &str) -> Option<Vec3> {
        let value = entity.property(SHEET_DIMENSIONS, key)?;
        self.expect_array::<3>(entity.id, key, value)
            .map(|[x, y, z]| Vec3::new(x, y, z))
    }

    fn expect_array<const N: usize>(&self, id: EntityId, key: &str, value: &PropertyValue) -> Option<[f32; N]> {
        let array = value.as_array::<N>();
        if array.is_none() {
            self.reporter.report(IntegrityWarning::MalformedProperty {
                entity: id,
                key: key.to_string(),
                expected: if N == 4 { "list of 4" } else { "list of 3" },
                found: value.shape(),
            });
        }
        array
    }
}
