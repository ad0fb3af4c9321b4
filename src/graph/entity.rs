//! Entity references and metadata values

use super::types::{NodeType, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Address of a research artifact: its type plus its id within that type
///
/// The core never stores entity bodies; an entity exists for the graph
/// only through the edges that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: NodeType,
    pub id: String,
}

impl EntityRef {
    /// Create a reference without validating the id
    pub fn new(entity_type: NodeType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }

    /// Parse a reference from raw caller input.
    ///
    /// Trims the id and rejects empty ids.
    pub fn parse(entity_type: &str, id: &str) -> Result<Self, ValidationError> {
        let entity_type: NodeType = entity_type.parse()?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(Self::new(entity_type, id))
    }

    /// Reference to a tag entity
    pub fn tag(text: impl Into<String>) -> Self {
        Self::new(NodeType::Tag, text)
    }

    /// Visited-set key, `"type:id"`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// Typed metadata values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
    Object(HashMap<String, PropertyValue>),
}

/// Free-form edge metadata
pub type Metadata = HashMap<String, PropertyValue>;

/// Convert caller-supplied JSON into edge metadata.
///
/// `null` means no metadata. Anything other than an object of
/// strings, numbers, booleans, arrays and nested objects is rejected.
pub fn metadata_from_json(value: serde_json::Value) -> Result<Metadata, ValidationError> {
    match value {
        serde_json::Value::Null => Ok(Metadata::new()),
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidMetadata(e.to_string())),
        other => Err(ValidationError::InvalidMetadata(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
