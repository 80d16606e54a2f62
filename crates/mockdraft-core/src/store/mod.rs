// Versioned document stores with a compare-and-swap write primitive.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::draft::state::{DraftState, VersionedDocument};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Version written by a draft reset.
pub const INITIAL_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document stored under `{key}`")]
    NotFound { key: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize draft document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// A keyed store of whole draft documents. Reads always return a complete
/// document; writes either replace it completely or not at all.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Read the current document and its version.
    async fn load(&self, key: &str) -> Result<VersionedDocument, StoreError>;

    /// Replace the document with `state` and bump its version by one, but only
    /// if the stored version still equals `expected_version`. Returns `false`
    /// when another writer got there first (or the key is missing).
    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        state: &DraftState,
    ) -> Result<bool, StoreError>;

    /// Unconditionally overwrite the document. Only a draft restart does this.
    async fn reset(
        &self,
        key: &str,
        state: &DraftState,
        initial_version: u64,
    ) -> Result<(), StoreError>;
}
