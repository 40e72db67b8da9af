//! Receipt verification.
//!
//! Verification re-derives what a receipt claims and compares. Every check is
//! reported on its own so callers can show partial diagnostics; the overall
//! verdict is the AND of the checks required for the receipt's shape.
//!
//! An invalid receipt is a normal outcome and is returned as a
//! [`VerificationResult`]. Only a structurally incomplete [`ReceiptRecord`]
//! is an error, and it is rejected before any hashing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::canonical_bytes;
use crate::digest::{Digest, DigestAlgorithm};
use crate::error::CoreError;
use crate::keys::{Ed25519PublicKey, KeyManager};
use crate::receipt::{ChainReceipt, Receipt, ReceiptShape, SignedReceipt};
use crate::record::ReceiptRecord;

/// Payload fields a well-formed event description should carry.
pub const RECOMMENDED_PAYLOAD_FIELDS: [&str; 5] =
    ["event_id", "session_id", "timestamp", "vendor", "model"];

/// Header links that a signed payload repeats and must agree with.
const BOUND_LINK_FIELDS: [&str; 3] = ["inputs_hash", "outputs_hash", "prev_hash"];

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

/// Category of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A recomputed digest differs from the stored one.
    HashMismatch,
    /// The signature does not verify.
    SignatureInvalid,
    /// `prev_hash` does not link to the preceding entry.
    ChainBreak,
}

/// One reported check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub field: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Check {
    /// A passing check.
    pub fn pass(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            status: CheckStatus::Pass,
            kind: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// A failing check.
    pub fn fail(field: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            status: CheckStatus::Fail,
            kind: Some(kind),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// A check that could not be performed.
    pub fn skipped(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            status: CheckStatus::Skipped,
            kind: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attach expected and actual values.
    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Whether the check passed.
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    /// Whether the check failed.
    pub fn failed(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

/// The verdict on one receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub shape: ReceiptShape,
    pub entry_hash: Digest,
    pub checks: Vec<Check>,
    pub warnings: Vec<String>,
}

impl VerificationResult {
    fn new(shape: ReceiptShape, entry_hash: Digest, checks: Vec<Check>, warnings: Vec<String>) -> Self {
        let valid = checks.iter().all(|c| !c.failed());
        Self {
            valid,
            shape,
            entry_hash,
            checks,
            warnings,
        }
    }

    /// The check for `field`, if reported.
    pub fn check(&self, field: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.field == field)
    }

    /// All failing checks.
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.failed())
    }

    /// Whether any check failed with `kind`.
    pub fn has_failure(&self, kind: FailureKind) -> bool {
        self.failures().any(|c| c.kind == Some(kind))
    }

    /// Whether the entry hash (and every bound link) re-derived correctly.
    pub fn hash_valid(&self) -> bool {
        !self.has_failure(FailureKind::HashMismatch)
    }

    /// Signature status: `Some(true/false)` for signed receipts, `None` otherwise.
    pub fn signature_valid(&self) -> Option<bool> {
        match self.check("signature").map(|c| c.status) {
            Some(CheckStatus::Pass) => Some(true),
            Some(CheckStatus::Fail) => Some(false),
            _ => None,
        }
    }
}

/// Verifies receipts.
#[derive(Debug, Clone, Default)]
pub struct ReceiptVerifier {
    algorithm: DigestAlgorithm,
    trusted_key: Option<Ed25519PublicKey>,
}

impl ReceiptVerifier {
    /// A verifier using the default digest algorithm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest algorithm.
    pub fn algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Warn when a signed receipt carries a key other than `key`.
    pub fn trusted_key(mut self, key: Ed25519PublicKey) -> Self {
        self.trusted_key = Some(key);
        self
    }

    /// The digest algorithm in use.
    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Verify a persisted record.
    ///
    /// Fails with [`CoreError::MalformedReceipt`] if the record matches
    /// neither shape; no digest or signature is computed in that case.
    pub fn verify_record(&self, record: &ReceiptRecord) -> Result<VerificationResult, CoreError> {
        let receipt = record.to_receipt()?;
        Ok(self.verify(&receipt))
    }

    /// Verify a typed receipt.
    pub fn verify(&self, receipt: &Receipt) -> VerificationResult {
        match receipt {
            Receipt::Signed(signed) => self.verify_signed(signed),
            Receipt::ChainOnly(chain) => self.verify_chain_only(chain),
        }
    }

    fn verify_signed(&self, receipt: &SignedReceipt) -> VerificationResult {
        let header = &receipt.header;
        let mut checks = Vec::with_capacity(5);
        let mut warnings = Vec::new();

        match serde_json::from_str::<Value>(&receipt.payload) {
            Ok(payload) => {
                checks.push(match canonical_bytes(&payload) {
                    Ok(bytes) => {
                        compare_digest("entry_hash", &header.entry_hash, &self.algorithm.digest(&bytes))
                    }
                    Err(e) => Check::fail(
                        "entry_hash",
                        FailureKind::HashMismatch,
                        format!("payload cannot be canonicalized: {e}"),
                    )
                    .with_values("", header.entry_hash.to_hex()),
                });

                for field in BOUND_LINK_FIELDS {
                    let stored = match field {
                        "inputs_hash" => &header.inputs_hash,
                        "outputs_hash" => &header.outputs_hash,
                        _ => &header.prev_hash,
                    };
                    checks.push(check_bound_link(&payload, field, stored, &mut warnings));
                }

                for field in RECOMMENDED_PAYLOAD_FIELDS {
                    if !has_descriptive_field(&payload, field) {
                        warnings.push(format!("payload is missing recommended field `{field}`"));
                    }
                }
            }
            Err(e) => {
                checks.push(
                    Check::fail(
                        "entry_hash",
                        FailureKind::HashMismatch,
                        format!("payload is not valid JSON, digest cannot be re-derived: {e}"),
                    )
                    .with_values("", header.entry_hash.to_hex()),
                );
                for field in BOUND_LINK_FIELDS {
                    checks.push(Check::skipped(field, "payload could not be parsed"));
                }
            }
        }

        let digest_hex = header.entry_hash.to_hex();
        let signature = KeyManager::check_signature(&digest_hex, &receipt.signature, &receipt.public_key);
        match signature.reason() {
            None => checks.push(Check::pass("signature", "signature valid for entry hash")),
            Some(reason) => {
                tracing::debug!(entry_hash = %digest_hex, %reason, "signature check failed");
                checks.push(Check::fail("signature", FailureKind::SignatureInvalid, reason));
            }
        }

        if let Some(trusted) = &self.trusted_key {
            if !receipt.public_key.trim().eq_ignore_ascii_case(&trusted.to_hex()) {
                warnings.push(format!(
                    "receipt is signed by {} which is not the ledger key {}",
                    receipt.public_key, trusted
                ));
            }
        }

        VerificationResult::new(ReceiptShape::Signed, header.entry_hash, checks, warnings)
    }

    fn verify_chain_only(&self, receipt: &ChainReceipt) -> VerificationResult {
        let header = &receipt.header;
        let computed = self
            .algorithm
            .chain_digest(&header.prev_hash, &header.inputs_hash, &header.outputs_hash);

        let checks = vec![
            compare_digest("entry_hash", &header.entry_hash, &computed),
            Check::skipped("signature", "chain-only receipt carries no signature"),
        ];

        VerificationResult::new(ReceiptShape::ChainOnly, header.entry_hash, checks, Vec::new())
    }
}

/// Verify with a default verifier.
pub fn verify_receipt(receipt: &Receipt) -> VerificationResult {
    ReceiptVerifier::new().verify(receipt)
}

fn compare_digest(field: &str, stored: &Digest, computed: &Digest) -> Check {
    if stored == computed {
        Check::pass(field, "recomputed digest matches")
    } else {
        Check::fail(field, FailureKind::HashMismatch, "recomputed digest does not match stored value")
            .with_values(computed.to_hex(), stored.to_hex())
    }
}

/// Compare a header link with the copy bound inside the signed payload.
fn check_bound_link(payload: &Value, field: &str, stored: &Digest, warnings: &mut Vec<String>) -> Check {
    match payload.get(field).and_then(Value::as_str) {
        Some(bound) if bound.eq_ignore_ascii_case(&stored.to_hex()) => {
            Check::pass(field, "matches value bound in signed payload")
        }
        Some(bound) => Check::fail(
            field,
            FailureKind::HashMismatch,
            "does not match value bound in signed payload",
        )
        .with_values(bound.to_string(), stored.to_hex()),
        None => {
            warnings.push(format!("payload does not bind `{field}`"));
            Check::skipped(field, "not bound in signed payload")
        }
    }
}

fn has_descriptive_field(payload: &Value, field: &str) -> bool {
    match payload.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ReceiptBuilder;
    use crate::digest::digest;
    use crate::event::EventDescriptor;

    fn event() -> EventDescriptor {
        EventDescriptor::new("evt-1", "sess-1")
            .timestamp(1736870400000)
            .vendor("acme")
            .model("m-1")
            .input(&b"ping"[..])
            .output(&b"pong"[..])
    }

    fn keys() -> KeyManager {
        KeyManager::from_seed(&[0x42; 32])
    }

    fn flip_hex_char(s: &str, index: usize) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        chars[index] = if chars[index] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_valid_signed_receipt() {
        let keys = keys();
        let receipt = ReceiptBuilder::new().signer(&keys).build(&event(), None).unwrap();
        let result = verify_receipt(&receipt);

        assert!(result.valid, "{:?}", result.checks);
        assert_eq!(result.shape, ReceiptShape::Signed);
        assert_eq!(result.signature_valid(), Some(true));
        assert!(result.warnings.is_empty());
        assert_eq!(result.checks.len(), 5);
    }

    #[test]
    fn test_valid_chain_only_receipt() {
        let receipt = ReceiptBuilder::new().build(&event(), None).unwrap();
        let result = verify_receipt(&receipt);

        assert!(result.valid);
        assert_eq!(result.shape, ReceiptShape::ChainOnly);
        assert_eq!(result.signature_valid(), None);
        assert_eq!(result.check("signature").unwrap().status, CheckStatus::Skipped);
    }

    #[test]
    fn test_tampered_payload() {
        let keys = keys();
        let mut receipt = ReceiptBuilder::new().signer(&keys).build(&event(), None).unwrap();
        if let Receipt::Signed(signed) = &mut receipt {
            signed.payload = signed.payload.replace("acme", "acmf");
        }

        let result = verify_receipt(&receipt);
        assert!(!result.valid);
        let check = result.check("entry_hash").unwrap();
        assert_eq!(check.kind, Some(FailureKind::HashMismatch));
        assert!(check.expected.is_some() && check.actual.is_some());
        // Signature is over the stored entry hash, which was not touched.
        assert_eq!(result.signature_valid(), Some(true));
    }

    #[test]
    fn test_unparseable_payload() {
        let keys = keys();
        let mut receipt = ReceiptBuilder::new().signer(&keys).build(&event(), None).unwrap();
        if let Receipt::Signed(signed) = &mut receipt {
            signed.payload.pop();
        }

        let result = verify_receipt(&receipt);
        assert!(!result.valid);
        assert!(result.has_failure(FailureKind::HashMismatch));
        assert_eq!(result.check("prev_hash").unwrap().status, CheckStatus::Skipped);
    }

    #[test]
    fn test_tampered_links_on_signed_receipt() {
        let keys = keys();
        let original = ReceiptBuilder::new().signer(&keys).build(&event(), Some(digest(b"p"))).unwrap();

        for field in BOUND_LINK_FIELDS {
            let mut receipt = original.clone();
            let header = receipt.header_mut();
            let target = match field {
                "inputs_hash" => &mut header.inputs_hash,
                "outputs_hash" => &mut header.outputs_hash,
                _ => &mut header.prev_hash,
            };
            *target = Digest::from_hex(&flip_hex_char(&target.to_hex(), 3)).unwrap();

            let result = verify_receipt(&receipt);
            assert!(!result.valid, "tampering {field} went unnoticed");
            assert_eq!(result.check(field).unwrap().kind, Some(FailureKind::HashMismatch));
        }
    }

    #[test]
    fn test_tampered_chain_only_fields() {
        let original = ReceiptBuilder::new().build(&event(), Some(digest(b"p"))).unwrap();

        for field in ["inputs_hash", "outputs_hash", "prev_hash", "entry_hash"] {
            let mut receipt = original.clone();
            let header = receipt.header_mut();
            let target = match field {
                "inputs_hash" => &mut header.inputs_hash,
                "outputs_hash" => &mut header.outputs_hash,
                "prev_hash" => &mut header.prev_hash,
                _ => &mut header.entry_hash,
            };
            *target = Digest::from_hex(&flip_hex_char(&target.to_hex(), 10)).unwrap();

            let result = verify_receipt(&receipt);
            assert!(!result.valid, "tampering {field} went unnoticed");
            let check = result.check("entry_hash").unwrap();
            assert_eq!(check.kind, Some(FailureKind::HashMismatch));
            assert_ne!(check.expected, check.actual);
        }
    }

    #[test]
    fn test_signature_binding_to_key() {
        let key_a = KeyManager::from_seed(&[0x0a; 32]);
        let key_b = KeyManager::from_seed(&[0x0b; 32]);
        let mut receipt = ReceiptBuilder::new().signer(&key_a).build(&event(), None).unwrap();
        if let Receipt::Signed(signed) = &mut receipt {
            signed.public_key = key_b.public_key().to_hex();
        }

        let result = verify_receipt(&receipt);
        assert!(!result.valid);
        assert!(result.hash_valid());
        assert_eq!(result.check("signature").unwrap().kind, Some(FailureKind::SignatureInvalid));
    }

    #[test]
    fn test_garbage_signature_is_verdict() {
        let keys = keys();
        let mut receipt = ReceiptBuilder::new().signer(&keys).build(&event(), None).unwrap();
        if let Receipt::Signed(signed) = &mut receipt {
            signed.signature = "not-a-signature".into();
        }
        let result = verify_receipt(&receipt);
        assert!(!result.valid);
        assert_eq!(result.signature_valid(), Some(false));
    }

    #[test]
    fn test_missing_recommended_fields_warn() {
        let keys = keys();
        let sparse = EventDescriptor::new("evt-2", "sess-1").input(&b"in"[..]);
        let receipt = ReceiptBuilder::new().signer(&keys).build(&sparse, None).unwrap();

        let result = verify_receipt(&receipt);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.iter().any(|w| w.contains("vendor")));
        assert!(result.warnings.iter().any(|w| w.contains("model")));
    }

    #[test]
    fn test_foreign_key_warning() {
        let keys = keys();
        let other = KeyManager::from_seed(&[0x99; 32]);
        let receipt = ReceiptBuilder::new().signer(&other).build(&event(), None).unwrap();

        let result = ReceiptVerifier::new().trusted_key(keys.public_key()).verify(&receipt);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);

        let result = ReceiptVerifier::new().trusted_key(other.public_key()).verify(&receipt);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_algorithm_must_match() {
        let receipt = ReceiptBuilder::new()
            .algorithm(DigestAlgorithm::Blake3)
            .build(&event(), None)
            .unwrap();

        assert!(!verify_receipt(&receipt).valid);
        assert!(ReceiptVerifier::new().algorithm(DigestAlgorithm::Blake3).verify(&receipt).valid);
    }

    #[test]
    fn test_malformed_record_rejected() {
        let record = ReceiptRecord {
            inputs_hash: Some(digest(b"a").to_hex()),
            signature: Some("00".into()),
            ..Default::default()
        };
        assert!(matches!(
            ReceiptVerifier::new().verify_record(&record),
            Err(CoreError::MalformedReceipt(_))
        ));
    }

    #[test]
    fn test_verify_record_roundtrip() {
        let keys = keys();
        let receipt = ReceiptBuilder::new().signer(&keys).build(&event(), None).unwrap();
        let record = ReceiptRecord::from(&receipt);
        let result = ReceiptVerifier::new().verify_record(&record).unwrap();
        assert!(result.valid);
        assert_eq!(result.entry_hash, *receipt.entry_hash());
    }

    #[test]
    fn test_foreign_payload_without_links() {
        // A payload written by another producer that only binds descriptive fields.
        let keys = keys();
        let payload = r#"{"event_id":"e","model":"m","session_id":"s","timestamp":1,"vendor":"v"}"#;
        let entry_hash = digest(payload.as_bytes());
        let receipt = Receipt::Signed(SignedReceipt {
            header: crate::receipt::ReceiptHeader {
                inputs_hash: digest(b"i"),
                outputs_hash: digest(b"o"),
                prev_hash: Digest::ZERO,
                entry_hash,
                policy_id: "external/v1".into(),
                created_at: 0,
            },
            payload: payload.into(),
            signature: keys.sign_digest(&entry_hash),
            public_key: keys.public_key().to_hex(),
        });

        let result = verify_receipt(&receipt);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 3);
        assert_eq!(result.check("inputs_hash").unwrap().status, CheckStatus::Skipped);
    }
}
