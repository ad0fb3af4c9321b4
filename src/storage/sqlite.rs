//! SQLite storage backend

use super::traits::{EdgeRepository, OpenStore, StorageError, StorageResult};
use crate::graph::{Edge, EdgeId, EdgeKey, EntityRef, NodeType, RelationType, ValidationError};
use chrono::DateTime;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, OptionalExtension, Params, ToSql, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const EDGE_COLUMNS: &str = "id, source_type, source_id, target_type, target_id, relation, \
                            is_bidirectional, metadata_json, created_at";

const KEY_MATCH: &str = "source_type = ?1 AND source_id = ?2 AND target_type = ?3 \
                         AND target_id = ?4 AND relation = ?5";

/// Raw column values of one edge row
type EdgeRow = (String, String, String, String, String, String, bool, String, String);

/// SQLite-backed edge repository
///
/// Uses a single `edges` table. Key uniqueness is a `UNIQUE` table
/// constraint; inserts resolve conflicts with `ON CONFLICT DO NOTHING`, so
/// concurrent creators of the same key never both succeed.
/// Listings are ordered by the autoincrement `seq` column (insertion order).
///
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        // Other connections on the same file may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS edges (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                source_type TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_type TEXT NOT NULL,
                target_id TEXT NOT NULL,
                relation TEXT NOT NULL,
                is_bidirectional INTEGER NOT NULL DEFAULT 0,
                metadata_json TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                UNIQUE (source_type, source_id, target_type, target_id, relation)
            );

            -- Traversal indexes
            CREATE INDEX IF NOT EXISTS idx_edges_source
                ON edges(source_type, source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target
                ON edges(target_type, target_id);

            -- Tag lookups (relation = 'has_tag', target_id = tag text)
            CREATE INDEX IF NOT EXISTS idx_edges_relation
                ON edges(relation, target_id);

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn key_params(key: &EdgeKey) -> [&dyn ToSql; 5] {
        [
            &key.source.entity_type,
            &key.source.id,
            &key.target.entity_type,
            &key.target.id,
            &key.relation,
        ]
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EdgeRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
        ))
    }

    /// Deserialize an edge from database columns
    fn row_to_edge(row: EdgeRow) -> StorageResult<Edge> {
        let (
            id,
            source_type,
            source_id,
            target_type,
            target_id,
            relation,
            is_bidirectional,
            metadata_json,
            created_at,
        ) = row;

        Ok(Edge {
            id: EdgeId::parse(&id)
                .ok_or_else(|| StorageError::Corrupt(format!("edge id '{}'", id)))?,
            source: EntityRef::new(parse_stored(&source_type)?, source_id),
            target: EntityRef::new(parse_stored(&target_type)?, target_id),
            relation: parse_stored::<RelationType>(&relation)?,
            is_bidirectional,
            metadata: serde_json::from_str(&metadata_json)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StorageError::DateParse(e.to_string()))?
                .with_timezone(&chrono::Utc),
        })
    }

    fn query_edges<P: Params>(conn: &Connection, sql: &str, params: P) -> StorageResult<Vec<Edge>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::read_row)?;

        let mut edges = Vec::new();
        for row in rows {
            edges.push(Self::row_to_edge(row?)?);
        }
        Ok(edges)
    }
}

impl ToSql for NodeType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl ToSql for RelationType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Parse a type name read back from the database
fn parse_stored<T>(raw: &str) -> StorageResult<T>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    raw.parse().map_err(|e: ValidationError| StorageError::Corrupt(e.to_string()))
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening edge store at: {}", path.as_ref().display());
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl EdgeRepository for SqliteStore {
    fn create(&self, edge: &Edge) -> StorageResult<(EdgeId, bool)> {
        let mut conn = self.lock()?;
        let metadata_json = serde_json::to_string(&edge.metadata)?;

        // Insert and lookup share one write transaction, so another
        // connection cannot delete the conflicting row in between.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            r#"
            INSERT INTO edges (id, source_type, source_id, target_type, target_id, relation,
                               is_bidirectional, metadata_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(source_type, source_id, target_type, target_id, relation) DO NOTHING
            "#,
            params![
                edge.id.to_string(),
                edge.source.entity_type,
                edge.source.id,
                edge.target.entity_type,
                edge.target.id,
                edge.relation,
                edge.is_bidirectional,
                metadata_json,
                edge.created_at.to_rfc3339(),
            ],
        )?;

        if inserted > 0 {
            tx.commit()?;
            return Ok((edge.id, true));
        }

        let existing: String = tx.query_row(
            &format!("SELECT id FROM edges WHERE {}", KEY_MATCH),
            &Self::key_params(&edge.key()),
            |row| row.get(0),
        )?;
        tx.commit()?;
        let id = EdgeId::parse(&existing)
            .ok_or_else(|| StorageError::Corrupt(format!("edge id '{}'", existing)))?;
        Ok((id, false))
    }

    fn delete(&self, key: &EdgeKey) -> StorageResult<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            &format!("DELETE FROM edges WHERE {}", KEY_MATCH),
            &Self::key_params(key),
        )?;
        Ok(rows > 0)
    }

    fn exists(&self, key: &EdgeKey) -> StorageResult<bool> {
        let conn = self.lock()?;
        let found: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM edges WHERE {})", KEY_MATCH),
            &Self::key_params(key),
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn get(&self, key: &EdgeKey) -> StorageResult<Option<Edge>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM edges WHERE {}", EDGE_COLUMNS, KEY_MATCH),
                &Self::key_params(key),
                Self::read_row,
            )
            .optional()?;

        row.map(Self::row_to_edge).transpose()
    }

    fn edges_from(
        &self,
        entity: &EntityRef,
        include_bidirectional_reverse: bool,
    ) -> StorageResult<Vec<Edge>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM edges
             WHERE (source_type = ?1 AND source_id = ?2)
                OR (?3 AND is_bidirectional = 1 AND target_type = ?1 AND target_id = ?2)
             ORDER BY seq",
            EDGE_COLUMNS
        );
        Self::query_edges(
            &conn,
            &sql,
            params![entity.entity_type, entity.id, include_bidirectional_reverse],
        )
    }

    fn edges_to(&self, entity: &EntityRef) -> StorageResult<Vec<Edge>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM edges WHERE target_type = ?1 AND target_id = ?2 ORDER BY seq",
            EDGE_COLUMNS
        );
        Self::query_edges(&conn, &sql, params![entity.entity_type, entity.id])
    }

    fn edges_with_relation(&self, relation: RelationType) -> StorageResult<Vec<Edge>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM edges WHERE relation = ?1 ORDER BY seq",
            EDGE_COLUMNS
        );
        Self::query_edges(&conn, &sql, params![relation])
    }

    fn delete_all_for_entity(&self, entity: &EntityRef) -> StorageResult<usize> {
        let conn = self.lock()?;

        // One statement: a self-loop matches both arms but is one row.
        let removed = conn.execute(
            "DELETE FROM edges
             WHERE (source_type = ?1 AND source_id = ?2)
                OR (target_type = ?1 AND target_id = ?2)",
            params![entity.entity_type, entity.id],
        )?;
        debug!("Removed {} edges touching {}", removed, entity);
        Ok(removed)
    }
}
