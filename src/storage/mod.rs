//! Storage backends for edges
//!
//! Backends implement the `EdgeRepository` trait. `SqliteStore` is the
//! persistent backend; `MemoryStore` serves embedding and tests. Lineage
//! tracing, path finding and the tag index are written against the trait
//! only, so either backend can serve them.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{EdgeRepository, OpenStore, StorageError, StorageResult};
