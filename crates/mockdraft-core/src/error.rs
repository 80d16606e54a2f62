// Error taxonomy for draft mutations.

use thiserror::Error;

use crate::store::StoreError;

/// Domain validation failures. These are never retried: the request itself is
/// wrong for the state it was applied to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid team name: {team}")]
    UnknownTeam { team: String },

    #[error("player not found or already drafted: {name}")]
    UnknownPlayer { name: String },

    #[error("no available picks for {team}")]
    NoOpenPick { team: String },

    #[error("no available players to pick")]
    NoPlayersAvailable,

    #[error("round {round} is outside 1..={max}")]
    InvalidRound { round: u32, max: u32 },

    #[error("pick number {pick_number} does not belong to any round")]
    InvalidPickNumber { pick_number: u32 },

    #[error("{team} does not hold pick {pick_number}")]
    PickNotHeld { team: String, pick_number: u32 },

    #[error("pick {pick_number} has already been used")]
    PickAlreadyFilled { pick_number: u32 },

    #[error("pick {pick_number} appears more than once in the trade")]
    DuplicatePick { pick_number: u32 },

    #[error("{team} cannot trade with itself")]
    SelfTrade { team: String },

    #[error("trade offer gives up no picks")]
    EmptyTrade,
}

/// Everything a draft mutation or read can fail with.
#[derive(Debug, Error)]
pub enum DraftError {
    /// No document has been written under the key yet; a draft must be
    /// started first.
    #[error("draft state not found for key `{key}`")]
    NotFound { key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every compare-and-swap attempt lost to another writer. The store is
    /// unchanged by this request.
    #[error("failed to update draft state after {attempts} attempts, please try again")]
    ConcurrencyExhausted { attempts: u32 },

    #[error("draft store error: {0}")]
    Store(StoreError),
}

impl DraftError {
    /// Whether a caller may reasonably repeat the same request unchanged.
    /// Only exhaustion qualifies; domain errors would fail identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DraftError::ConcurrencyExhausted { .. })
    }

    /// The validation failure behind this error, if it is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            DraftError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<StoreError> for DraftError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => DraftError::NotFound { key },
            other => DraftError::Store(other),
        }
    }
}
