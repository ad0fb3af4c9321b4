//! Post-write notifications.
//!
//! The API layer fires a `GraphEvent` after every write that changed the
//! store. Duplicate creates and deletes of missing edges fire nothing.
//! Export or sync layers subscribe by registering an `EdgeObserver`.

use crate::graph::{Edge, EdgeKey, EntityRef};
use serde::Serialize;
use tracing::trace;

/// A change applied to the edge store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    EdgeCreated { edge: Edge },
    EdgeDeleted { key: EdgeKey },
    EntityPurged { entity: EntityRef, edges_removed: usize },
}

impl GraphEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::EdgeCreated { .. } => "edge_created",
            GraphEvent::EdgeDeleted { .. } => "edge_deleted",
            GraphEvent::EntityPurged { .. } => "entity_purged",
        }
    }
}

/// Receives events after the write has been committed
pub trait EdgeObserver: Send + Sync {
    fn on_event(&self, event: &GraphEvent);
}

/// Observer that only logs
#[derive(Debug, Default)]
pub struct TracingObserver;

impl EdgeObserver for TracingObserver {
    fn on_event(&self, event: &GraphEvent) {
        match event {
            GraphEvent::EdgeCreated { edge } => trace!("{}: {}", event.kind(), edge.key()),
            GraphEvent::EdgeDeleted { key } => trace!("{}: {}", event.kind(), key),
            GraphEvent::EntityPurged {
                entity,
                edges_removed,
            } => trace!("{}: {} ({} edges)", event.kind(), entity, edges_removed),
        }
    }
}
