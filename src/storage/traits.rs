//! Edge repository contract

use crate::graph::{Edge, EdgeId, EdgeKey, EntityRef, RelationType};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-agnostic CRUD over edges.
///
/// Implementations must enforce key uniqueness inside the store itself, so
/// that two concurrent `create` calls for one key leave exactly one edge.
/// Every listing returns edges in insertion order, oldest first.
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple request handlers.
pub trait EdgeRepository: Send + Sync {
    /// Insert an edge unless its key already exists.
    ///
    /// Returns the stored edge's id and whether this call inserted it.
    /// A duplicate key is not an error: the existing id comes back with
    /// `false`, and the stored edge is left untouched.
    fn create(&self, edge: &Edge) -> StorageResult<(EdgeId, bool)>;

    /// Delete the edge with this key; true iff a row was removed
    fn delete(&self, key: &EdgeKey) -> StorageResult<bool>;

    /// Check whether an edge with this key exists
    fn exists(&self, key: &EdgeKey) -> StorageResult<bool>;

    /// Load the edge with this key
    fn get(&self, key: &EdgeKey) -> StorageResult<Option<Edge>>;

    /// Edges where `entity` is the source.
    ///
    /// With `include_bidirectional_reverse`, also edges where `entity` is the
    /// target and the edge's own `is_bidirectional` flag is set. An edge
    /// matching both conditions (a bidirectional self-loop) appears once.
    fn edges_from(
        &self,
        entity: &EntityRef,
        include_bidirectional_reverse: bool,
    ) -> StorageResult<Vec<Edge>>;

    /// Edges where `entity` is the target, regardless of bidirectionality
    fn edges_to(&self, entity: &EntityRef) -> StorageResult<Vec<Edge>>;

    /// All edges carrying the given relation
    fn edges_with_relation(&self, relation: RelationType) -> StorageResult<Vec<Edge>>;

    /// Cascade delete: remove every edge where `entity` is source or target.
    ///
    /// Returns the number of edges removed, i.e. the size of the union of
    /// `edges_from(entity, false)` and `edges_to(entity)`. Self-loops are
    /// removed and counted once.
    fn delete_all_for_entity(&self, entity: &EntityRef) -> StorageResult<usize>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: EdgeRepository + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
