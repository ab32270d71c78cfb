//! Attachment points: where a tree (or shared-root group) shows up.

use crate::element::Position;
use crate::types::Identifier;
use serde::{Deserialize, Serialize};

/// Which identifiers an attachment point binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttachmentTarget {
    /// A perspective root with this id
    Perspective { id: String },
    /// Any content record of this type
    EntityType { entity_type: String },
    /// One specific content record
    Record { entity_type: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPoint {
    #[serde(flatten)]
    pub target: AttachmentTarget,
    #[serde(default)]
    pub position: Position,
    /// Higher sorts first among results at the same position
    #[serde(default)]
    pub priority: i32,
}

impl AttachmentPoint {
    pub fn new(target: AttachmentTarget, position: Position) -> Self {
        Self {
            target,
            position,
            priority: 0,
        }
    }

    pub fn perspective(id: impl Into<String>, position: Position) -> Self {
        Self::new(AttachmentTarget::Perspective { id: id.into() }, position)
    }

    pub fn entity_type(entity_type: impl Into<String>, position: Position) -> Self {
        Self::new(
            AttachmentTarget::EntityType {
                entity_type: entity_type.into(),
            },
            position,
        )
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn matches(&self, identifier: &Identifier) -> bool {
        match (&self.target, identifier) {
            (AttachmentTarget::Perspective { id }, Identifier::PerspectiveRoot { id: other }) => {
                id == other
            }
            (
                AttachmentTarget::EntityType { entity_type },
                Identifier::ContentRecord {
                    entity_type: other, ..
                },
            ) => entity_type == other,
            (
                AttachmentTarget::Record { entity_type, key },
                Identifier::ContentRecord {
                    entity_type: other_type,
                    key: other_key,
                },
            ) => entity_type == other_type && key == other_key,
            _ => false,
        }
    }
}
