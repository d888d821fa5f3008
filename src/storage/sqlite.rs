//! SQLite storage backend for the citation graph

use super::traits::{EdgeStore, PassageStore, StorageError, StorageResult};
use crate::graph::{CrossRef, Passage, PassageId, Reference};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Upper bound on ids bound into a single `IN (...)` list.
///
/// SQLite builds compiled without a raised limit reject statements with more
/// than 999 parameters.
const MAX_IDS_PER_QUERY: usize = 500;

/// SQLite-backed passage and edge store
///
/// Uses a single SQLite database file with one table for passages and one for
/// citation edges. Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Passages keyed by their reading-order id
            CREATE TABLE IF NOT EXISTS passages (
                id INTEGER PRIMARY KEY,
                collection_code TEXT NOT NULL,
                collection_name TEXT NOT NULL,
                chapter INTEGER NOT NULL,
                item INTEGER NOT NULL,
                text TEXT NOT NULL
            );

            -- Alternate key lookup
            CREATE UNIQUE INDEX IF NOT EXISTS idx_passages_reference
                ON passages(collection_code, chapter, item);

            -- Citation edges; duplicates are allowed
            CREATE TABLE IF NOT EXISTS cross_refs (
                from_id INTEGER NOT NULL,
                to_id INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cross_refs_from
                ON cross_refs(from_id);

            -- Concurrent readers while an import is running
            PRAGMA journal_mode = WAL;
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn row_to_passage(row: &Row<'_>) -> rusqlite::Result<Passage> {
        Ok(Passage {
            id: PassageId::new(row.get(0)?),
            collection_code: row.get(1)?,
            collection_name: row.get(2)?,
            chapter: row.get(3)?,
            item: row.get(4)?,
            text: row.get(5)?,
        })
    }

    /// Insert or replace passages. Returns the number of rows written.
    pub fn insert_passages(&self, passages: &[Passage]) -> StorageResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO passages (id, collection_code, collection_name, chapter, item, text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for p in passages {
                written += stmt.execute(params![
                    p.id.get(),
                    p.collection_code,
                    p.collection_name,
                    p.chapter,
                    p.item,
                    p.text
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Append citation edges. Returns the number of rows written.
    pub fn insert_cross_refs(&self, edges: &[CrossRef]) -> StorageResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare("INSERT INTO cross_refs (from_id, to_id) VALUES (?1, ?2)")?;
            for edge in edges {
                written += stmt.execute(params![edge.from.get(), edge.to.get()])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Load every passage, ordered by id
    pub fn load_all_passages(&self) -> StorageResult<Vec<Passage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, collection_code, collection_name, chapter, item, text
             FROM passages ORDER BY id",
        )?;
        let passages = stmt
            .query_map([], Self::row_to_passage)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(passages)
    }

    /// Load every edge in insertion order
    pub fn load_all_cross_refs(&self) -> StorageResult<Vec<CrossRef>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT from_id, to_id FROM cross_refs ORDER BY rowid")?;
        let edges = stmt
            .query_map([], |row| Ok(CrossRef::new(row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    fn placeholders(n: usize) -> String {
        vec!["?"; n].join(", ")
    }
}

#[async_trait]
impl PassageStore for SqliteStore {
    async fn get_by_ids(&self, ids: &[PassageId]) -> StorageResult<Vec<Passage>> {
        let conn = self.lock()?;
        let mut passages = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT id, collection_code, collection_name, chapter, item, text
                 FROM passages WHERE id IN ({}) ORDER BY id",
                Self::placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.get())), Self::row_to_passage)?;
            for row in rows {
                passages.push(row?);
            }
        }

        Ok(passages)
    }

    async fn get_by_range(&self, lo: PassageId, hi: PassageId) -> StorageResult<Vec<Passage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, collection_code, collection_name, chapter, item, text
             FROM passages WHERE id BETWEEN ?1 AND ?2 ORDER BY id",
        )?;
        let passages = stmt
            .query_map(params![lo.get(), hi.get()], Self::row_to_passage)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(passages)
    }

    async fn get_by_reference(&self, reference: &Reference) -> StorageResult<Option<PassageId>> {
        let conn = self.lock()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM passages WHERE collection_code = ?1 AND chapter = ?2 AND item = ?3",
                params![reference.collection_code, reference.chapter, reference.item],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(PassageId::new))
    }
}

#[async_trait]
impl EdgeStore for SqliteStore {
    async fn get_outgoing(&self, source_ids: &[PassageId]) -> StorageResult<Vec<CrossRef>> {
        let conn = self.lock()?;
        let mut rows_with_order: Vec<(i64, CrossRef)> = Vec::new();

        for chunk in source_ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT rowid, from_id, to_id FROM cross_refs WHERE from_id IN ({}) ORDER BY rowid",
                Self::placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.get())), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    CrossRef::new(row.get::<_, i64>(1)?, row.get::<_, i64>(2)?),
                ))
            })?;
            for row in rows {
                rows_with_order.push(row?);
            }
        }

        // Chunks each come back in rowid order; merge them back into one stream
        rows_with_order.sort_by_key(|(rowid, _)| *rowid);
        Ok(rows_with_order.into_iter().map(|(_, edge)| edge).collect())
    }
}
