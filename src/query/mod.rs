//! Traversal over the edge repository
//!
//! Lineage tracing follows edge direction depth-first; path finding treats
//! edges as undirected and searches breadth-first. Both only use the
//! repository's `edges_from` / `edges_to` primitives.

mod lineage;
mod path;
mod types;

pub use lineage::LineageQuery;
pub use path::PathQuery;
pub use types::{
    clamp_depth, Direction, LineageEntry, LineageResult, PathElement, PathResult, Traversal,
    DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT,
};
