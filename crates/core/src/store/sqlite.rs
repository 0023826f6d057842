//! SQLite-backed document store implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::patch::Patch;
use super::traits::DocumentStore;
use super::types::{Condition, Document, Page, ScanFilter, StoreError};

/// SQLite-backed document store.
///
/// Documents are stored as JSON text keyed by `(tbl, pk)`. Updates run
/// read-patch-write inside a transaction, so patches and list-appends are
/// atomic with respect to other writers on the same connection.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                tbl TEXT NOT NULL,
                pk TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (tbl, pk)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_tbl ON documents(tbl);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn parse_body(body: &str) -> Result<Document, StoreError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| StoreError::Serialization(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Serialization(format!(
                "document body is not an object: {}",
                other
            ))),
        }
    }

    fn encode_body(doc: &Document) -> Result<String, StoreError> {
        serde_json::to_string(doc).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn read_one(
        conn: &Connection,
        table: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE tbl = ?1 AND pk = ?2",
                params![table, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        body.map(|b| Self::parse_body(&b)).transpose()
    }

    fn write_one(
        conn: &Connection,
        table: &str,
        key: &str,
        doc: &Document,
    ) -> Result<(), StoreError> {
        let body = Self::encode_body(doc)?;
        conn.execute(
            "INSERT OR REPLACE INTO documents (tbl, pk, body) VALUES (?1, ?2, ?3)",
            params![table, key, body],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::read_one(&conn, table, key)
    }

    fn put(&self, table: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::write_one(&conn, table, key, &doc)
    }

    fn update(&self, table: &str, key: &str, patch: Patch) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut doc = Self::read_one(&tx, table, key)?.unwrap_or_default();
        patch.apply(&mut doc)?;
        Self::write_one(&tx, table, key, &doc)?;

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))
    }

    fn update_if(
        &self,
        table: &str,
        key: &str,
        patch: Patch,
        condition: &Condition,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some(mut doc) = Self::read_one(&tx, table, key)? else {
            return Ok(false);
        };
        if !condition.holds(&doc) {
            return Ok(false);
        }

        patch.apply(&mut doc)?;
        Self::write_one(&tx, table, key, &doc)?;
        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(true)
    }

    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM documents WHERE tbl = ?1 AND pk = ?2",
            params![table, key],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn query(&self, table: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT body FROM documents WHERE tbl = ?1 ORDER BY rowid")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let bodies = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for body in bodies {
            let doc = Self::parse_body(&body)?;
            if doc.get(field) == Some(value) {
                items.push(doc);
            }
        }
        Ok(items)
    }

    fn scan(
        &self,
        table: &str,
        filter: Option<&ScanFilter>,
        start: Option<u64>,
        limit: usize,
    ) -> Result<Page, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT rowid, body FROM documents WHERE tbl = ?1 AND rowid > ?2 \
                 ORDER BY rowid LIMIT ?3",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let after = start.unwrap_or(0);
        let rows = stmt
            .query_map(params![table, after, limit as i64], |row| {
                Ok((row.get::<_, u64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        // Another full page may follow only when this one was full.
        let next_token = if rows.len() == limit {
            rows.last().map(|(rowid, _)| *rowid)
        } else {
            None
        };

        let mut items = Vec::new();
        for (_, body) in rows {
            let doc = Self::parse_body(&body)?;
            if filter.map(|f| f.matches(&doc)).unwrap_or(true) {
                items.push(doc);
            }
        }

        Ok(Page { items, next_token })
    }
}
