// SQLite-backed draft document store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{DraftStore, StoreError};
use crate::draft::state::{DraftState, VersionedDocument};

/// Draft documents stored as JSON, one row per key, with an integer version
/// column that every write is conditioned on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_documents (
                key        TEXT PRIMARY KEY,
                version    INTEGER NOT NULL,
                state      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl DraftStore for SqliteStore {
    async fn load(&self, key: &str) -> Result<VersionedDocument, StoreError> {
        let row: Option<(String, i64, String)> = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT state, version, updated_at FROM draft_documents WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
        };

        let (json, version, updated_at) = row.ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })?;
        let state: DraftState = serde_json::from_str(&json)?;

        Ok(VersionedDocument {
            state,
            version: version as u64,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
        })
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        state: &DraftState,
    ) -> Result<bool, StoreError> {
        let json = serde_json::to_string(state)?;
        let conn = self.conn()?;
        // The version predicate and the increment happen in one statement, so
        // the affected-row count is the whole answer.
        let changed = conn.execute(
            "UPDATE draft_documents
                SET state = ?1, version = version + 1, updated_at = ?2
              WHERE key = ?3 AND version = ?4",
            params![json, Utc::now().to_rfc3339(), key, expected_version as i64],
        )?;
        debug!(key, expected_version, swapped = changed == 1, "compare-and-swap");
        Ok(changed == 1)
    }

    async fn reset(
        &self,
        key: &str,
        state: &DraftState,
        initial_version: u64,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO draft_documents (key, version, state, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, initial_version as i64, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
