//! quantlink: typed lineage and relationship graph for quant research artifacts
//!
//! Records typed edges between research artifacts (market data, factors,
//! strategies, notes, research reports, experience records and tags) and
//! answers lineage, connectivity and tag questions over them. Entity
//! bodies live elsewhere; the graph only knows entities by `(type, id)`.
//!
//! # Core Concepts
//!
//! - **Edges**: `source -[relation]-> target`, unique per key, with a per-edge
//!   bidirectional flag and free-form metadata
//! - **Lineage**: depth-bounded, cycle-safe walks along edge direction
//! - **Paths**: shortest undirected connection between two entities
//! - **Tags**: `has_tag` edges pointing at `tag:<text>` entities
//!
//! # Example
//!
//! ```
//! use quantlink::QuantlinkApi;
//!
//! let api = QuantlinkApi::in_memory();
//! api.create_link("factor", "Mom_v2", "factor", "Mom_v1", "derived_from", None, None)
//!     .unwrap();
//! let lineage = api.trace_lineage("factor", "Mom_v2", None, None).unwrap();
//! assert_eq!(lineage.count, 1);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod events;
mod graph;
pub mod mcp;
pub mod query;
pub mod storage;
pub mod tags;

pub use api::QuantlinkApi;
pub use config::Config;
pub use error::{QuantlinkError, QuantlinkResult};
pub use events::{EdgeObserver, GraphEvent, TracingObserver};
pub use graph::{
    metadata_from_json, Edge, EdgeId, EdgeKey, EntityRef, Metadata, NodeType, PropertyValue,
    RelationType, ValidationError,
};
pub use query::{Direction, LineageEntry, LineageQuery, PathElement, PathQuery, PathResult};
pub use storage::{EdgeRepository, MemoryStore, OpenStore, SqliteStore, StorageError, StorageResult};
pub use tags::{TagCount, TagIndex};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
