//! # Trust Ledger Store
//!
//! Event lookup for the Trust Ledger. The ledger never owns storage; it asks
//! an [`EventStore`] for previously recorded events and session histories.
//!
//! ## Key Types
//!
//! - [`EventStore`] - The async trait the ledger reads and writes through
//! - [`MemoryEventStore`] - In-memory implementation for tests and embedding
//! - [`StoredEvent`] - One recorded event and its receipt record
//! - [`InsertResult`] - Result of recording an event
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trust_ledger_store::{EventStore, MemoryEventStore};
//!
//! async fn example() {
//!     let store = MemoryEventStore::new();
//!     let history = store.get_session_events("sess-1").await.unwrap();
//!     assert!(history.is_empty());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: Recording the same event twice returns `AlreadyExists`
//! - **Conflict detection**: A different receipt under a known event id returns `Conflict`
//! - **Session order**: Histories come back in creation order, ties broken by insertion

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryEventStore;
pub use traits::{EventStore, InsertResult, StoredEvent};
