// Optimistic-concurrency wrapper around every draft mutation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::draft::state::DraftState;
use crate::error::DraftError;
use crate::store::DraftStore;

/// How hard the coordinator tries before giving up on a contended document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total compare-and-swap attempts, including the first.
    pub max_retries: u32,
    /// Pause between a lost race and the next reload.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 5,
            backoff: Duration::from_millis(100),
        }
    }
}

/// The outcome of a committed mutation.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    /// The state exactly as it was written.
    pub state: DraftState,
    /// The stored version after the write.
    pub version: u64,
    /// Whatever the transform returned alongside its changes.
    pub output: T,
    /// Attempts used, 1 if the first compare-and-swap won.
    pub attempts: u32,
}

/// Applies transforms to one stored draft document with at-most-one-winner
/// semantics per version, without holding a lock across the retry window.
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn DraftStore>,
    key: String,
    policy: RetryPolicy,
}

impl Coordinator {
    pub fn new(store: Arc<dyn DraftStore>, key: impl Into<String>, policy: RetryPolicy) -> Self {
        Coordinator {
            store,
            key: key.into(),
            policy,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn DraftStore> {
        &self.store
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Load, transform a private copy, and compare-and-swap it back.
    ///
    /// The transform may run more than once: each lost race reloads the
    /// document and reapplies it to the fresh state. A transform error ends
    /// the call immediately with nothing written. When every attempt loses,
    /// the result is [`DraftError::ConcurrencyExhausted`] and the store holds
    /// only other writers' changes.
    pub async fn mutate<T, F>(&self, mut transform: F) -> Result<Committed<T>, DraftError>
    where
        F: FnMut(&mut DraftState) -> Result<T, DraftError> + Send,
        T: Send,
    {
        let max = self.policy.max_retries;

        for attempt in 1..=max {
            let doc = self.store.load(&self.key).await?;
            let mut working = doc.state;
            let output = transform(&mut working)?;

            if self
                .store
                .compare_and_swap(&self.key, doc.version, &working)
                .await?
            {
                debug!(
                    key = %self.key,
                    version = doc.version + 1,
                    attempt,
                    "draft state committed"
                );
                return Ok(Committed {
                    state: working,
                    version: doc.version + 1,
                    output,
                    attempts: attempt,
                });
            }

            warn!(
                "Version mismatch detected on {} (read version {}), retrying ({}/{})...",
                self.key, doc.version, attempt, max
            );
            if attempt < max {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        error!(
            "Failed to update {} after {} attempts",
            self.key, max
        );
        Err(DraftError::ConcurrencyExhausted { attempts: max })
    }
}
