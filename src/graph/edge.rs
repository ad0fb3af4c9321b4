//! Typed, directed edges between research artifacts

use super::entity::{EntityRef, Metadata};
use super::types::RelationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(Uuid);

impl EdgeId {
    /// Create a new random EdgeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an EdgeId from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The uniqueness key of an edge: at most one edge exists per key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: EntityRef,
    pub target: EntityRef,
    pub relation: RelationType,
}

impl EdgeKey {
    pub fn new(source: EntityRef, target: EntityRef, relation: RelationType) -> Self {
        Self {
            source,
            target,
            relation,
        }
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.relation, self.target)
    }
}

/// A directed, typed relationship between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: EntityRef,
    pub target: EntityRef,
    pub relation: RelationType,
    /// Also surfaced when querying from the target side
    pub is_bidirectional: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge using the relation's canonical bidirectionality
    pub fn new(source: EntityRef, target: EntityRef, relation: RelationType) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            target,
            relation,
            is_bidirectional: relation.is_bidirectional(),
            metadata: Metadata::new(),
            created_at: Utc::now(),
        }
    }

    /// Override the per-edge bidirectional flag
    pub fn bidirectional(mut self, is_bidirectional: bool) -> Self {
        self.is_bidirectional = is_bidirectional;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone(), self.relation)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The endpoint opposite to `entity`, if `entity` is an endpoint
    pub fn other_end(&self, entity: &EntityRef) -> Option<&EntityRef> {
        if &self.source == entity {
            Some(&self.target)
        } else if &self.target == entity {
            Some(&self.source)
        } else {
            None
        }
    }
}
