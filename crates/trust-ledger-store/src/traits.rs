//! EventStore trait: the lookup collaborator the ledger reads through.
//!
//! The ledger is storage-agnostic. It only needs to find one event by id,
//! replay a session in creation order and learn a session's current head.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trust_ledger_core::ReceiptRecord;

use crate::error::Result;

/// One recorded event and the receipt issued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: String,
    pub session_id: String,
    /// When the event was recorded (Unix ms). Orders a session's history.
    pub created_at: i64,
    pub record: ReceiptRecord,
}

impl StoredEvent {
    /// The receipt's entry hash as stored, if present.
    pub fn entry_hash(&self) -> Option<&str> {
        self.record.entry_hash.as_deref()
    }
}

/// Result of inserting an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Event was inserted.
    Inserted,
    /// The identical event is already stored (idempotent - not an error).
    AlreadyExists,
    /// A different receipt is already stored under this event id.
    Conflict {
        /// Entry hash of the stored receipt.
        existing_entry_hash: Option<String>,
    },
}

/// Async interface for event lookup and persistence.
///
/// # Design Notes
///
/// - **Idempotent inserts**: Inserting the same event twice returns `AlreadyExists`.
/// - **Conflict detection**: Inserting a different receipt under an existing
///   event id returns `Conflict` and leaves the stored event untouched.
/// - **Ordering**: Session histories are ordered by `created_at`, with ties
///   kept in insertion order.
#[async_trait]
pub trait EventStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Event Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an event.
    async fn insert_event(&self, event: &StoredEvent) -> Result<InsertResult>;

    /// Get an event by id.
    async fn get_event(&self, event_id: &str) -> Result<Option<StoredEvent>>;

    /// Check if an event exists.
    async fn has_event(&self, event_id: &str) -> Result<bool> {
        Ok(self.get_event(event_id).await?.is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All events of a session in creation order. Unknown sessions are empty.
    async fn get_session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>>;

    /// The most recent event of a session.
    async fn get_session_head(&self, session_id: &str) -> Result<Option<StoredEvent>> {
        Ok(self.get_session_events(session_id).await?.pop())
    }

    /// All known session ids.
    async fn list_sessions(&self) -> Result<Vec<String>>;
}
