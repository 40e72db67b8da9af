//! # Trust Ledger Core
//!
//! Pure primitives for the Trust Ledger: tamper-evident receipts, canonical
//! encoding, signing keys, verification and session-chain auditing.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! deterministic computation over values supplied by the caller.
//!
//! ## Key Types
//!
//! - [`Receipt`] - Either a [`SignedReceipt`] or a [`ChainReceipt`]
//! - [`ReceiptRecord`] - The loosely-typed persisted/exchanged shape
//! - [`KeyManager`] - Ed25519 signing key with an explicit [`KeyOrigin`]
//! - [`ReceiptBuilder`] - Produces receipts from an [`EventDescriptor`]
//! - [`ReceiptVerifier`] - Re-derives digests and signatures for one receipt
//! - [`ChainAuditor`] - Replays an ordered session and reports the first break
//!
//! ## Hashing conventions
//!
//! Signed receipts are identified by `digest(canonical_payload)`. Chain-only
//! receipts are identified by `digest(prev_hash ∥ inputs_hash ∥ outputs_hash)`
//! over the lowercase hex text of the three digests. The two rules are kept
//! as separate algorithms; see [`DigestAlgorithm::chain_digest`].

pub mod builder;
pub mod canonical;
pub mod chain;
pub mod digest;
pub mod error;
pub mod event;
pub mod keys;
pub mod receipt;
pub mod record;
pub mod verify;

pub use builder::ReceiptBuilder;
pub use canonical::{canonical_bytes, canonical_json, canonicalize_str, to_canonical_json};
pub use chain::{audit_chain, AuditResult, AuditSummary, ChainAuditor, EntryAudit};
pub use digest::{digest, digest_hex, Digest, DigestAlgorithm};
pub use error::{CoreError, KeyError, Result};
pub use event::{ComplianceFlags, EventDescriptor};
pub use keys::{
    Ed25519PublicKey, EnvKeySource, EphemeralKey, KeyManager, KeyOrigin, KeyProvision, KeySource,
    SignatureCheck, StaticKeySource,
};
pub use receipt::{
    ChainReceipt, Receipt, ReceiptHeader, ReceiptShape, SignedReceipt, DEFAULT_POLICY_ID,
    GENESIS_PREV_HASH,
};
pub use record::ReceiptRecord;
pub use verify::{
    verify_receipt, Check, CheckStatus, FailureKind, ReceiptVerifier, VerificationResult,
    RECOMMENDED_PAYLOAD_FIELDS,
};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
