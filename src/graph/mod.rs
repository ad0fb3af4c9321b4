//! Core graph data model: entity and relation types, entity references, edges

mod edge;
mod entity;
mod types;

pub use edge::{Edge, EdgeId, EdgeKey};
pub use entity::{metadata_from_json, EntityRef, Metadata, PropertyValue};
pub use types::{NodeType, RelationType, ValidationError};
