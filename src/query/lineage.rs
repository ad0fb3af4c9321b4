//! Lineage tracing: what an entity depends on, or what depends on it

use std::collections::HashSet;

use super::types::{clamp_depth, Direction, LineageEntry, LineageResult, DEFAULT_MAX_DEPTH};
use crate::graph::EntityRef;
use crate::storage::{EdgeRepository, StorageResult};

/// Depth-bounded, cycle-safe lineage trace from a starting entity
#[derive(Debug, Clone)]
pub struct LineageQuery {
    /// Starting entity
    pub origin: EntityRef,
    pub direction: Direction,
    /// Deepest level reported (always within `[1, MAX_DEPTH_LIMIT]`)
    pub max_depth: usize,
}

impl LineageQuery {
    /// Create a backward trace from `origin` with the default depth
    pub fn from(origin: EntityRef) -> Self {
        Self {
            origin,
            direction: Direction::Backward,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the maximum depth, clamped into the allowed range
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = clamp_depth(max_depth);
        self
    }

    /// Run the trace.
    ///
    /// Depth-first, pre-order. Backward follows `edges_from` (source to
    /// target); forward follows `edges_to` (target to source). Each entity
    /// is reported once, at the first depth the walk discovers it, and the
    /// origin is never reported. Expansion is guarded separately: an entity
    /// is expanded at most once, and only when reached at a depth below
    /// `max_depth`, so one first seen at the limit can still be expanded
    /// from a shorter branch later. Siblings come out in the repository's insertion order.
    pub fn execute<S: EdgeRepository + ?Sized>(&self, store: &S) -> StorageResult<LineageResult> {
        let max_depth = clamp_depth(self.max_depth);
        let mut result = LineageResult::new(self.origin.clone(), self.direction, max_depth);

        let mut state = Walk {
            max_depth,
            reported: HashSet::from([self.origin.key()]),
            expanded: HashSet::new(),
            out: &mut result.entries,
        };
        self.walk(store, &self.origin, 1, &mut state)?;
        Ok(result)
    }

    fn walk<S: EdgeRepository + ?Sized>(
        &self,
        store: &S,
        node: &EntityRef,
        depth: usize,
        state: &mut Walk<'_>,
    ) -> StorageResult<()> {
        if depth > state.max_depth || !state.expanded.insert(node.key()) {
            return Ok(());
        }

        let edges = match self.direction {
            Direction::Backward => store.edges_from(node, false)?,
            Direction::Forward => store.edges_to(node)?,
        };

        for edge in edges {
            let next = match self.direction {
                Direction::Backward => &edge.target,
                Direction::Forward => &edge.source,
            };

            if state.reported.insert(next.key()) {
                state.out.push(LineageEntry {
                    depth,
                    node_type: next.entity_type,
                    node_id: next.id.clone(),
                    relation: edge.relation,
                    direction: self.direction,
                });
            }

            self.walk(store, next, depth + 1, state)?;
        }

        Ok(())
    }
}

/// State shared by one trace
struct Walk<'a> {
    max_depth: usize,
    /// `type:id` keys already emitted, seeded with the origin
    reported: HashSet<String>,
    /// `type:id` keys whose edges have been fetched
    expanded: HashSet<String>,
    out: &'a mut Vec<LineageEntry>,
}
