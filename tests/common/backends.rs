//! Every `EdgeRepository` implementation, opened fresh for a test

use quantlink::{EdgeRepository, MemoryStore, OpenStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

pub struct Backend {
    pub name: &'static str,
    pub store: Arc<dyn EdgeRepository>,
    // Keeps the database directory alive for file-backed stores
    _dir: Option<TempDir>,
}

/// In-memory map, in-memory SQLite and file-backed SQLite
pub fn all_backends() -> Vec<Backend> {
    let dir = tempfile::tempdir().expect("tempdir");
    let file_store = SqliteStore::open(dir.path().join("graph.db")).expect("open sqlite file");

    vec![
        Backend {
            name: "memory",
            store: Arc::new(MemoryStore::new()),
            _dir: None,
        },
        Backend {
            name: "sqlite-memory",
            store: Arc::new(SqliteStore::open_in_memory().expect("open sqlite memory")),
            _dir: None,
        },
        Backend {
            name: "sqlite-file",
            store: Arc::new(file_store),
            _dir: Some(dir),
        },
    ]
}
