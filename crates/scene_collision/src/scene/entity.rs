//! Entity records

use std::collections::HashMap;

use bitflags::bitflags;

use crate::foundation::math::{Quat, Vec3};
use super::properties::PropertyValue;

/// Stable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// Create an id from its raw value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Behavioural traits shared by entity kinds
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindTraits: u8 {
        /// Bounds other entities; tested with slack and confirmed on geometry
        const ZONE = 1 << 0;
        /// May be the subject of a collision query
        const SOURCE = 1 << 1;
        /// Container of wall segments and vertices without a wrapper of its own
        const SEGMENTABLE = 1 << 2;
    }
}

/// Type tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Furniture, fixtures and other placed models
    Model,
    /// A model that carries zones of its own
    ModelWithZones,
    /// A room, floor or similar boundary
    Zone,
    /// A wall segment between two vertices
    Segment,
    /// A wall vertex
    Vertex,
    /// Holder of segments and vertices (a wall run)
    SegmentableContainer,
    /// Plain grouping node
    Container,
}

impl EntityKind {
    /// Traits of this kind
    pub const fn traits(self) -> KindTraits {
        match self {
            Self::Model | Self::ModelWithZones | Self::Vertex => KindTraits::SOURCE,
            Self::Segment => KindTraits::ZONE.union(KindTraits::SOURCE),
            Self::Zone => KindTraits::ZONE,
            Self::SegmentableContainer => KindTraits::SEGMENTABLE,
            Self::Container => KindTraits::empty(),
        }
    }

    /// Whether this kind gets relaxed, geometry-confirmed collision treatment
    pub const fn is_zone(self) -> bool {
        self.traits().contains(KindTraits::ZONE)
    }

    /// Whether commands on this kind can be evaluated
    pub const fn is_collision_source(self) -> bool {
        self.traits().contains(KindTraits::SOURCE)
    }

    /// Whether this kind is a segmentable container
    pub const fn is_segmentable(self) -> bool {
        self.traits().contains(KindTraits::SEGMENTABLE)
    }

    /// Pure grouping nodes have no geometry of their own to collide with
    pub const fn is_grouping(self) -> bool {
        matches!(self, Self::Container | Self::SegmentableContainer)
    }
}

/// Vertex ids at either end of a wall segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEnds {
    /// Start vertex
    pub start: EntityId,
    /// End vertex
    pub end: EntityId,
}

/// A node of the logical scene tree
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Identity
    pub id: EntityId,
    /// Committed parent, `None` only for the content root
    pub parent: Option<EntityId>,
    /// Type tag
    pub kind: EntityKind,
    /// Committed position relative to the parent
    pub position: Vec3,
    /// Committed rotation relative to the parent
    pub rotation: Quat,
    /// Committed scale
    pub scale: Vec3,
    /// Child ids in insertion order
    pub children: Vec<EntityId>,
    /// End vertices, for segments
    pub segment: Option<SegmentEnds>,
    properties: HashMap<String, HashMap<String, PropertyValue>>,
}

impl Entity {
    /// Create an entity at the origin with unit scale
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            parent: None,
            kind,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            children: Vec::new(),
            segment: None,
            properties: HashMap::new(),
        }
    }

    /// Builder pattern: set parent
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder pattern: set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: set segment end vertices
    pub fn with_segment(mut self, start: EntityId, end: EntityId) -> Self {
        self.segment = Some(SegmentEnds { start, end });
        self
    }

    /// Builder pattern: set a property
    pub fn with_property(mut self, sheet: &str, key: &str, value: PropertyValue) -> Self {
        self.set_property(sheet, key, value);
        self
    }

    /// Set a property value
    pub fn set_property(&mut self, sheet: &str, key: &str, value: PropertyValue) {
        self.properties
            .entry(sheet.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Read a property value
    pub fn property(&self, sheet: &str, key: &str) -> Option<&PropertyValue> {
        self.properties.get(sheet)?.get(key)
    }
}
