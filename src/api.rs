//! Transport-independent API layer.
//!
//! `QuantlinkApi` is the single entry point for consumer-facing operations.
//! Transports (MCP, CLI, direct embedding) call `QuantlinkApi` methods with
//! raw strings; it validates them through the type registry, clamps
//! traversal depth, dispatches to the repository, tag index or traversals,
//! and notifies observers after writes that changed the store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::QuantlinkResult;
use crate::events::{EdgeObserver, GraphEvent};
use crate::graph::{metadata_from_json, Edge, EdgeKey, EntityRef, NodeType, RelationType};
use crate::query::{
    Direction, LineageEntry, LineageQuery, PathElement, PathQuery, DEFAULT_MAX_DEPTH,
    MAX_DEPTH_LIMIT,
};
use crate::storage::{EdgeRepository, MemoryStore, OpenStore, SqliteStore, StorageResult};
use crate::tags::{TagCount, TagIndex};

#[derive(Debug, Clone, Serialize)]
pub struct CreateLinkResponse {
    /// False when an edge with the same key already existed
    pub created: bool,
    pub edge: Edge,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteLinkResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgesResponse {
    pub count: usize,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineageResponse {
    pub count: usize,
    pub nodes: Vec<LineageEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathResponse {
    /// Number of path elements (nodes plus relationships)
    pub count: usize,
    pub path: Vec<PathElement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagWriteResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityTagsResponse {
    pub tags: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitiesByTagResponse {
    pub entities: Vec<EntityRef>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllTagsResponse {
    pub tags: Vec<TagCount>,
    /// Number of distinct tags
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteEntityResponse {
    /// Number of edges removed
    pub deleted: usize,
}

/// Resolve a caller-supplied depth: absent means the default, anything
/// outside `[1, MAX_DEPTH_LIMIT]` is clamped.
pub fn resolve_depth(requested: Option<i64>) -> usize {
    let Some(requested) = requested else {
        return DEFAULT_MAX_DEPTH;
    };
    let clamped = requested.clamp(1, MAX_DEPTH_LIMIT as i64) as usize;
    if clamped as i64 != requested {
        warn!("max_depth {} out of range, clamped to {}", requested, clamped);
    }
    clamped
}

/// Single entry point for all consumer-facing operations.
#[derive(Clone)]
pub struct QuantlinkApi {
    store: Arc<dyn EdgeRepository>,
    observers: Vec<Arc<dyn EdgeObserver>>,
}

impl QuantlinkApi {
    /// Create a new API instance over an existing store.
    pub fn new(store: Arc<dyn EdgeRepository>) -> Self {
        Self {
            store,
            observers: Vec::new(),
        }
    }

    /// API over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// API over a SQLite database file, created if missing.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    /// Register an observer for post-write events.
    pub fn with_observer(mut self, observer: Arc<dyn EdgeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The underlying edge repository.
    pub fn store(&self) -> &dyn EdgeRepository {
        self.store.as_ref()
    }

    fn notify(&self, event: GraphEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    fn tags(&self) -> TagIndex<'_> {
        TagIndex::new(self.store.as_ref())
    }

    fn edge_key(
        source_type: &str,
        source_id: &str,
        target_type: &str,
        target_id: &str,
        relation: &str,
    ) -> QuantlinkResult<EdgeKey> {
        let source = EntityRef::parse(source_type, source_id)?;
        let target = EntityRef::parse(target_type, target_id)?;
        let relation: RelationType = relation.parse()?;
        Ok(EdgeKey::new(source, target, relation))
    }

    // --- Links ---

    /// Create a typed edge. A duplicate key succeeds with `created = false`
    /// and returns the stored edge unchanged.
    ///
    /// `is_bidirectional = None` uses the relation's default.
    #[allow(clippy::too_many_arguments)]
    pub fn create_link(
        &self,
        source_type: &str,
        source_id: &str,
        target_type: &str,
        target_id: &str,
        relation: &str,
        is_bidirectional: Option<bool>,
        metadata: Option<serde_json::Value>,
    ) -> QuantlinkResult<CreateLinkResponse> {
        let key = Self::edge_key(source_type, source_id, target_type, target_id, relation)?;
        let metadata = match metadata {
            Some(value) => metadata_from_json(value)?,
            None => Default::default(),
        };

        let edge = Edge::new(key.source.clone(), key.target.clone(), key.relation)
            .bidirectional(is_bidirectional.unwrap_or_else(|| key.relation.is_bidirectional()))
            .with_metadata(metadata);

        let (id, created) = self.store.create(&edge)?;
        if created {
            info!("Created edge {} ({})", key, id);
            self.notify(GraphEvent::EdgeCreated { edge: edge.clone() });
            return Ok(CreateLinkResponse { created, edge });
        }

        debug!("Edge {} already exists ({})", key, id);
        let existing = self.store.get(&key)?.unwrap_or(Edge { id, ..edge });
        Ok(CreateLinkResponse {
            created,
            edge: existing,
        })
    }

    /// Delete the edge with this exact key.
    pub fn delete_link(
        &self,
        source_type: &str,
        source_id: &str,
        target_type: &str,
        target_id: &str,
        relation: &str,
    ) -> QuantlinkResult<DeleteLinkResponse> {
        let key = Self::edge_key(source_type, source_id, target_type, target_id, relation)?;
        let deleted = self.store.delete(&key)?;
        if deleted {
            info!("Deleted edge {}", key);
            self.notify(GraphEvent::EdgeDeleted { key });
        } else {
            debug!("No edge {} to delete", key);
        }
        Ok(DeleteLinkResponse { deleted })
    }

    /// Outgoing edges of an entity, plus incoming edges flagged bidirectional
    /// when `include_bidirectional` is set.
    pub fn get_edges(
        &self,
        entity_type: &str,
        entity_id: &str,
        include_bidirectional: bool,
    ) -> QuantlinkResult<EdgesResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let edges = self.store.edges_from(&entity, include_bidirectional)?;
        debug!("{} edges for {}", edges.len(), entity);
        Ok(EdgesResponse {
            count: edges.len(),
            edges,
        })
    }

    // --- Traversals ---

    /// Trace lineage from an entity. `direction` defaults to backward.
    pub fn trace_lineage(
        &self,
        entity_type: &str,
        entity_id: &str,
        direction: Option<&str>,
        max_depth: Option<i64>,
    ) -> QuantlinkResult<LineageResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let direction: Direction = match direction {
            Some(raw) => raw.parse()?,
            None => Direction::default(),
        };
        let max_depth = resolve_depth(max_depth);

        let result = LineageQuery::from(entity)
            .direction(direction)
            .max_depth(max_depth)
            .execute(self.store.as_ref())?;
        debug!(
            "Lineage of {} ({}, depth {}): {} nodes",
            result.origin,
            direction,
            max_depth,
            result.len()
        );

        Ok(LineageResponse {
            count: result.len(),
            nodes: result.entries,
        })
    }

    /// Shortest undirected path between two entities; empty if unreachable.
    pub fn find_path(
        &self,
        source_type: &str,
        source_id: &str,
        target_type: &str,
        target_id: &str,
        max_depth: Option<i64>,
    ) -> QuantlinkResult<PathResponse> {
        let source = EntityRef::parse(source_type, source_id)?;
        let target = EntityRef::parse(target_type, target_id)?;
        let max_depth = resolve_depth(max_depth);

        let result = PathQuery::between(source.clone(), target.clone())
            .max_depth(max_depth)
            .execute(self.store.as_ref())?;
        debug!(
            "Path {} -> {} (depth {}): found={} hops={}",
            source,
            target,
            max_depth,
            result.found,
            result.hops()
        );

        Ok(PathResponse {
            count: result.elements.len(),
            path: result.elements,
        })
    }

    // --- Tags ---

    pub fn add_tag(
        &self,
        entity_type: &str,
        entity_id: &str,
        tag: &str,
    ) -> QuantlinkResult<TagWriteResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let (edge, created) = self.tags().add_tag(&entity, tag)?;
        if created {
            info!("Tagged {} with '{}'", entity, edge.target.id);
            self.notify(GraphEvent::EdgeCreated { edge });
        } else {
            debug!("{} already tagged '{}'", entity, edge.target.id);
        }
        Ok(TagWriteResponse { success: true })
    }

    /// `success` is false when the tag was not attached.
    pub fn remove_tag(
        &self,
        entity_type: &str,
        entity_id: &str,
        tag: &str,
    ) -> QuantlinkResult<TagWriteResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let removed = self.tags().remove_tag(&entity, tag)?;
        if removed {
            let key = EdgeKey::new(
                entity.clone(),
                EntityRef::tag(tag.trim()),
                RelationType::HasTag,
            );
            info!("Removed tag '{}' from {}", tag.trim(), entity);
            self.notify(GraphEvent::EdgeDeleted { key });
        }
        Ok(TagWriteResponse { success: removed })
    }

    /// Tags on an entity, most recently attached first.
    pub fn get_entity_tags(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> QuantlinkResult<EntityTagsResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let tags = self.tags().entity_tags(&entity)?;
        Ok(EntityTagsResponse {
            count: tags.len(),
            tags,
        })
    }

    pub fn get_entities_by_tag(
        &self,
        tag: &str,
        entity_type: Option<&str>,
    ) -> QuantlinkResult<EntitiesByTagResponse> {
        let type_filter: Option<NodeType> = entity_type.map(str::parse::<NodeType>).transpose()?;
        let entities = self.tags().entities_by_tag(tag, type_filter)?;
        Ok(EntitiesByTagResponse {
            count: entities.len(),
            entities,
        })
    }

    pub fn list_all_tags(&self) -> QuantlinkResult<AllTagsResponse> {
        let tags = self.tags().all_tags()?;
        Ok(AllTagsResponse {
            total: tags.len(),
            tags,
        })
    }

    // --- Entity lifecycle ---

    /// Remove every edge touching an entity. Entity services call this
    /// when they delete the entity itself.
    pub fn delete_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> QuantlinkResult<DeleteEntityResponse> {
        let entity = EntityRef::parse(entity_type, entity_id)?;
        let deleted = self.store.delete_all_for_entity(&entity)?;
        if deleted > 0 {
            info!("Purged {} edges of {}", deleted, entity);
            self.notify(GraphEvent::EntityPurged {
                entity,
                edges_removed: deleted,
            });
        } else {
            debug!("No edges to purge for {}", entity);
        }
        Ok(DeleteEntityResponse { deleted })
    }
}
