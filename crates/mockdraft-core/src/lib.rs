// Library root for the draft-state mutation engine.

pub mod coordinator;
pub mod draft;
pub mod error;
pub mod offers;
pub mod sequence;
pub mod simulator;
pub mod store;
pub mod trade;

pub use coordinator::{Committed, Coordinator, RetryPolicy};
pub use draft::pick::{HistoryEntry, Pick, Player};
pub use draft::pool::PlayerPool;
pub use draft::state::{DraftState, VersionedDocument};
pub use error::{DraftError, ValidationError};
pub use store::{DraftStore, StoreError};
