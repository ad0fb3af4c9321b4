//! Tag index
//!
//! A tag attachment is an ordinary edge `entity -[has_tag]-> tag:<text>`;
//! there is no separate tag table. Every operation here is a thin view
//! over the edge repository.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::QuantlinkResult;
use crate::graph::{Edge, EdgeKey, EntityRef, NodeType, RelationType, ValidationError};
use crate::storage::EdgeRepository;

/// Normalize raw tag text: trimmed, never empty
pub fn normalize_tag(tag: &str) -> Result<String, ValidationError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(ValidationError::EmptyTag);
    }
    Ok(tag.to_string())
}

/// A tag and the number of distinct entities carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Tag operations over an edge repository
pub struct TagIndex<'a> {
    store: &'a dyn EdgeRepository,
}

impl<'a> TagIndex<'a> {
    pub fn new(store: &'a dyn EdgeRepository) -> Self {
        Self { store }
    }

    fn key(entity: &EntityRef, tag: &str) -> QuantlinkResult<EdgeKey> {
        Ok(EdgeKey::new(
            entity.clone(),
            EntityRef::tag(normalize_tag(tag)?),
            RelationType::HasTag,
        ))
    }

    /// Attach a tag. Re-adding an existing tag is a no-op.
    ///
    /// Returns the stored edge and whether this call created it.
    pub fn add_tag(&self, entity: &EntityRef, tag: &str) -> QuantlinkResult<(Edge, bool)> {
        let key = Self::key(entity, tag)?;
        let edge = Edge::new(key.source, key.target, key.relation);
        let (id, created) = self.store.create(&edge)?;
        Ok((Edge { id, ..edge }, created))
    }

    /// Detach a tag; false if it was not attached
    pub fn remove_tag(&self, entity: &EntityRef, tag: &str) -> QuantlinkResult<bool> {
        let key = Self::key(entity, tag)?;
        Ok(self.store.delete(&key)?)
    }

    /// Tags on an entity, most recently attached first
    pub fn entity_tags(&self, entity: &EntityRef) -> QuantlinkResult<Vec<String>> {
        let tags = self
            .store
            .edges_from(entity, false)?
            .into_iter()
            .rev()
            .filter(is_tag_edge)
            .map(|edge| edge.target.id)
            .collect();
        Ok(tags)
    }

    /// Entities carrying a tag, optionally restricted to one entity type
    pub fn entities_by_tag(
        &self,
        tag: &str,
        type_filter: Option<NodeType>,
    ) -> QuantlinkResult<Vec<EntityRef>> {
        let tag = EntityRef::tag(normalize_tag(tag)?);
        let entities = self
            .store
            .edges_to(&tag)?
            .into_iter()
            .filter(is_tag_edge)
            .map(|edge| edge.source)
            .filter(|source| type_filter.map_or(true, |t| source.entity_type == t))
            .collect();
        Ok(entities)
    }

    /// Every tag in use, by count descending, then tag ascending
    pub fn all_tags(&self) -> QuantlinkResult<Vec<TagCount>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for edge in self.store.edges_with_relation(RelationType::HasTag)? {
            if is_tag_edge(&edge) {
                *counts.entry(edge.target.id).or_default() += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        Ok(tags)
    }
}

fn is_tag_edge(edge: &Edge) -> bool {
    edge.relation == RelationType::HasTag && edge.target.entity_type == NodeType::Tag
}
