//! Error types for the Trust Ledger Core.
//!
//! Only structural problems and key initialization failures are errors.
//! Hash mismatches, bad signatures and chain breaks are verdicts, reported
//! through [`crate::verify::VerificationResult`] and [`crate::chain::AuditResult`].

use thiserror::Error;

/// Core errors that can occur while handling receipts.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Errors raised while loading or validating signing keys.
///
/// These are fatal to signing only. Chain-only receipts can still be built
/// and every receipt shape can still be verified without a key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("ephemeral key rejected: {0}")]
    EphemeralRejected(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
