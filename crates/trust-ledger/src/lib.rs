//! # Trust Ledger
//!
//! The Trust Ledger API: tamper-evident receipts for AI interactions.
//!
//! ## Overview
//!
//! Every recorded event gets a receipt that binds digests of its input and
//! output, descriptive metadata and the previous receipt of its session.
//! Receipts come in two shapes:
//!
//! - **Signed**: canonical payload, Ed25519 signature and verification key
//! - **Chain-only**: hash links only, for deployments without a signing key
//!
//! Anyone holding a receipt can re-derive its digests and check its
//! signature. Anyone holding a session's receipts can check that none were
//! altered, dropped or reordered.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use trust_ledger::{EventDescriptor, Ledger, LedgerConfig};
//! use trust_ledger::core::KeyManager;
//! use trust_ledger::store::MemoryEventStore;
//!
//! async fn example() {
//!     let keys = Arc::new(KeyManager::from_seed(&[7; 32]));
//!     let ledger = Ledger::with_signer(keys, MemoryEventStore::new(), LedgerConfig::default());
//!
//!     let event = EventDescriptor::new("evt-1", "sess-1")
//!         .vendor("acme")
//!         .model("m-1")
//!         .input(&b"ping"[..])
//!         .output(&b"pong"[..]);
//!     ledger.record_event(&event).await.unwrap();
//!
//!     let report = ledger.verify_session("sess-1").await.unwrap();
//!     assert!(report.valid);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `trust_ledger::core` - Receipts, keys, verification and auditing
//! - `trust_ledger::store` - Event lookup abstraction

pub mod config;
pub mod error;
pub mod ledger;

// Re-export component crates
pub use trust_ledger_core as core;
pub use trust_ledger_store as store;

pub use config::{KeyEnvConfig, LedgerConfig};
pub use error::{LedgerError, Result};
pub use ledger::{
    EventVerification, Ledger, PublicKeyExport, RecordedEvent, SessionEntry, SessionVerification,
    PUBLIC_KEY_MAX_AGE,
};

// Re-export commonly used core types
pub use trust_ledger_core::{
    Digest, DigestAlgorithm, EventDescriptor, KeyManager, KeyOrigin, Receipt, ReceiptRecord,
    VerificationResult,
};
