// In-process draft store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{DraftStore, StoreError};
use crate::draft::state::{DraftState, VersionedDocument};

/// Documents kept in a mutex-guarded map. The lock is only held for the copy
/// in or out, never across an await.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, VersionedDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<VersionedDocument, StoreError> {
        let doc = {
            let docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
            docs.get(key).cloned()
        };
        // Hand control back after the snapshot is taken so concurrent callers
        // interleave between read and write, as they would against a remote
        // store.
        tokio::task::yield_now().await;
        doc.ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        state: &DraftState,
    ) -> Result<bool, StoreError> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        match docs.get_mut(key) {
            Some(doc) if doc.version == expected_version => {
                doc.state = state.clone();
                doc.version += 1;
                doc.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reset(
        &self,
        key: &str,
        state: &DraftState,
        initial_version: u64,
    ) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        docs.insert(
            key.to_string(),
            VersionedDocument {
                state: state.clone(),
                version: initial_version,
                updated_at: Some(Utc::now()),
            },
        );
        Ok(())
    }
}
