//! Query types and result structures

use crate::graph::{Edge, EdgeId, EntityRef, NodeType, RelationType, ValidationError};
use serde::{Deserialize, Serialize};

/// Depth used when the caller does not ask for one
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Hard ceiling on traversal depth
pub const MAX_DEPTH_LIMIT: usize = 10;

/// Clamp a requested depth into `[1, MAX_DEPTH_LIMIT]`
pub fn clamp_depth(requested: usize) -> usize {
    requested.clamp(1, MAX_DEPTH_LIMIT)
}

/// Direction of a lineage trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// What does this entity depend on: follow edges source -> target
    #[default]
    Backward,
    /// What depends on this entity: follow edges target -> source
    Forward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Backward => "backward",
            Direction::Forward => "forward",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backward" => Ok(Direction::Backward),
            "forward" => Ok(Direction::Forward),
            _ => Err(ValidationError::UnknownDirection(s.to_string())),
        }
    }
}

/// One node discovered by a lineage trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEntry {
    /// Hops from the origin (1 = direct neighbor)
    pub depth: usize,
    pub node_type: NodeType,
    pub node_id: String,
    /// Relation of the edge through which the node was discovered
    pub relation: RelationType,
    pub direction: Direction,
}

impl LineageEntry {
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.node_type, self.node_id.clone())
    }
}

/// Result of a lineage trace
#[derive(Debug, Clone)]
pub struct LineageResult {
    pub origin: EntityRef,
    pub direction: Direction,
    pub max_depth: usize,
    /// Discovered nodes in pre-order
    pub entries: Vec<LineageEntry>,
}

impl LineageResult {
    pub fn new(origin: EntityRef, direction: Direction, max_depth: usize) -> Self {
        Self {
            origin,
            direction,
            max_depth,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries discovered at a specific depth
    pub fn at_depth(&self, depth: usize) -> Vec<&LineageEntry> {
        self.entries.iter().filter(|e| e.depth == depth).collect()
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.entries
            .iter()
            .any(|e| e.node_type == entity.entity_type && e.node_id == entity.id)
    }
}

/// How a path step relates to the stored direction of its edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// The walk goes from the edge's source to its target
    Forward,
    /// The walk goes from the edge's target to its source
    Reverse,
}

/// One element of a path: nodes and relationships alternate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathElement {
    Node {
        position: usize,
        #[serde(rename = "type")]
        node_type: NodeType,
        id: String,
    },
    Relationship {
        position: usize,
        edge_id: EdgeId,
        relation: RelationType,
        source: EntityRef,
        target: EntityRef,
        traversal: Traversal,
    },
}

impl PathElement {
    pub fn node(position: usize, entity: &EntityRef) -> Self {
        PathElement::Node {
            position,
            node_type: entity.entity_type,
            id: entity.id.clone(),
        }
    }

    pub fn relationship(position: usize, edge: &Edge, traversal: Traversal) -> Self {
        PathElement::Relationship {
            position,
            edge_id: edge.id,
            relation: edge.relation,
            source: edge.source.clone(),
            target: edge.target.clone(),
            traversal,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            PathElement::Node { position, .. } | PathElement::Relationship { position, .. } => {
                *position
            }
        }
    }
}

/// Result of a path query
#[derive(Debug, Clone)]
pub struct PathResult {
    /// Whether a path was found
    pub found: bool,
    /// Alternating node / relationship elements, starting and ending with a node
    pub elements: Vec<PathElement>,
}

impl PathResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            elements: Vec::new(),
        }
    }

    pub fn found(elements: Vec<PathElement>) -> Self {
        Self {
            found: true,
            elements,
        }
    }

    /// Path length (number of edges)
    pub fn hops(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, PathElement::Relationship { .. }))
            .count()
    }

    /// The entities along the path, in order
    pub fn nodes(&self) -> Vec<EntityRef> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                PathElement::Node { node_type, id, .. } => {
                    Some(EntityRef::new(*node_type, id.clone()))
                }
                PathElement::Relationship { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_clamped() {
        assert_eq!(clamp_depth(0), 1);
        assert_eq!(clamp_depth(7), 7);
        assert_eq!(clamp_depth(99), MAX_DEPTH_LIMIT);
    }

    #[test]
    fn direction_parses() {
        assert_eq!("Forward".parse::<Direction>().unwrap(), Direction::Forward);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(ValidationError::UnknownDirection(_))
        ));
        assert_eq!(Direction::default(), Direction::Backward);
    }

    #[test]
    fn path_elements_serialize_with_kind_tag() {
        let node = PathElement::node(0, &EntityRef::new(NodeType::Factor, "A"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "node");
        assert_eq!(json["type"], "factor");
        assert_eq!(json["position"], 0);
    }
}
