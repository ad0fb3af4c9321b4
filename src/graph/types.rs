//! Type registry: the closed sets of entity and relation types
//!
//! Raw strings are parsed into these enums once, at the API boundary.
//! Everything behind the boundary works on the typed variants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating caller input, before any storage access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown entity type: '{0}' (expected one of {1})")]
    UnknownNodeType(String, String),

    #[error("unknown relation type: '{0}' (expected one of {1})")]
    UnknownRelationType(String, String),

    #[error("unknown direction: '{0}' (expected 'backward' or 'forward')")]
    UnknownDirection(String),

    #[error("entity id must not be empty")]
    EmptyId,

    #[error("tag must not be empty")]
    EmptyTag,

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}

/// Kind of research artifact an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Market data series (e.g. a symbol)
    Data,
    Factor,
    Strategy,
    Note,
    /// Research report
    Research,
    /// Experience record distilled from past work
    Experience,
    /// Tag; its identity space is the tag text itself
    Tag,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Data,
        NodeType::Factor,
        NodeType::Strategy,
        NodeType::Note,
        NodeType::Research,
        NodeType::Experience,
        NodeType::Tag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Data => "data",
            NodeType::Factor => "factor",
            NodeType::Strategy => "strategy",
            NodeType::Note => "note",
            NodeType::Research => "research",
            NodeType::Experience => "experience",
            NodeType::Tag => "tag",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                ValidationError::UnknownNodeType(
                    s.to_string(),
                    expected(&NodeType::ALL.map(|t| t.as_str())),
                )
            })
    }
}

/// Kind of relationship an edge expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    DerivedFrom,
    AppliedTo,
    Verifies,
    References,
    Summarizes,
    HasTag,
    Related,
}

impl RelationType {
    pub const ALL: [RelationType; 7] = [
        RelationType::DerivedFrom,
        RelationType::AppliedTo,
        RelationType::Verifies,
        RelationType::References,
        RelationType::Summarizes,
        RelationType::HasTag,
        RelationType::Related,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::DerivedFrom => "derived_from",
            RelationType::AppliedTo => "applied_to",
            RelationType::Verifies => "verifies",
            RelationType::References => "references",
            RelationType::Summarizes => "summarizes",
            RelationType::HasTag => "has_tag",
            RelationType::Related => "related",
        }
    }

    /// Canonical bidirectionality of the relation.
    ///
    /// Only used as the creation-time default for `is_bidirectional`.
    /// Readers always honor the flag stored on the edge.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, RelationType::Related)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RelationType::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| {
                ValidationError::UnknownRelationType(
                    s.to_string(),
                    expected(&RelationType::ALL.map(|r| r.as_str())),
                )
            })
    }
}

fn expected(names: &[&str]) -> String {
    names.join(", ")
}
