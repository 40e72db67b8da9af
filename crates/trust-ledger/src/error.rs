//! Error types for the Ledger.

use trust_ledger_core::{CoreError, KeyError};
use trust_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
///
/// A receipt that fails verification is not an error; it is a verdict inside
/// the returned report.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Structural receipt error.
    #[error("receipt error: {0}")]
    Core(#[from] CoreError),

    /// Key loading error.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// Event lookup error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Event not found.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// The ledger was built without a signing key.
    #[error("no signing key configured")]
    NoSigningKey,

    /// A different receipt is already stored for this event.
    #[error("conflict for event {event_id}: existing receipt {existing_entry_hash:?}")]
    Conflict {
        event_id: String,
        existing_entry_hash: Option<String>,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
