//! Session chain auditing.
//!
//! A session is a list of receipts in creation order where every `prev_hash`
//! names the entry before it and the first names [`GENESIS_PREV_HASH`]. The
//! auditor walks the list once, checking each link and re-deriving each
//! entry hash, and stops at the first break.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::receipt::{Receipt, GENESIS_PREV_HASH};
use crate::record::ReceiptRecord;
use crate::verify::{Check, FailureKind, ReceiptVerifier, VerificationResult};

/// Audit outcome for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAudit {
    pub index: usize,

    /// `None` when the record could not be read as a receipt.
    pub entry_hash: Option<Digest>,

    /// The `prev_hash` link check.
    pub link: Check,

    pub verification: Option<VerificationResult>,
}

impl EntryAudit {
    /// Whether the link holds and the entry hash re-derived.
    pub fn is_intact(&self) -> bool {
        !self.link.failed() && self.verification.as_ref().is_some_and(VerificationResult::hash_valid)
    }
}

/// Counts over the audited entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Entries submitted, including any after a break.
    pub total: usize,
    pub valid_hash: usize,
    pub valid_signature: usize,
    pub invalid_signature: usize,
    /// Chain-only entries, which carry no signature.
    pub unchecked_signature: usize,
}

/// Result of auditing a session chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub valid: bool,

    /// Index of the first entry whose link or hash failed.
    pub break_at: Option<usize>,

    /// Audited entries, up to and including the break.
    pub entries: Vec<EntryAudit>,

    pub summary: AuditSummary,
}

impl AuditResult {
    fn empty() -> Self {
        Self {
            valid: true,
            break_at: None,
            entries: Vec::new(),
            summary: AuditSummary::default(),
        }
    }

    /// The entry at which the chain broke.
    pub fn break_entry(&self) -> Option<&EntryAudit> {
        self.break_at.and_then(|i| self.entries.get(i))
    }
}

/// Audits ordered session chains.
#[derive(Debug, Clone, Default)]
pub struct ChainAuditor {
    verifier: ReceiptVerifier,
}

impl ChainAuditor {
    /// An auditor using the default verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// An auditor re-deriving hashes with `verifier`.
    pub fn with_verifier(verifier: ReceiptVerifier) -> Self {
        Self { verifier }
    }

    /// Audit typed receipts in creation order.
    pub fn audit(&self, receipts: &[Receipt]) -> AuditResult {
        self.walk(receipts.iter().map(Ok).collect())
    }

    /// Audit wire records in creation order.
    ///
    /// A record that matches neither receipt shape breaks the chain at its
    /// index; the audit itself does not fail.
    pub fn audit_records(&self, records: &[ReceiptRecord]) -> AuditResult {
        let parsed: Vec<_> = records.iter().map(ReceiptRecord::to_receipt).collect();
        self.walk(
            parsed
                .iter()
                .map(|r| r.as_ref().map_err(ToString::to_string))
                .collect(),
        )
    }

    fn walk(&self, items: Vec<Result<&Receipt, String>>) -> AuditResult {
        let mut result = AuditResult::empty();
        result.summary.total = items.len();
        let mut expected_prev = GENESIS_PREV_HASH;

        for (index, item) in items.into_iter().enumerate() {
            let receipt = match item {
                Ok(receipt) => receipt,
                Err(reason) => {
                    tracing::debug!(index, %reason, "chain broken by malformed record");
                    result.entries.push(EntryAudit {
                        index,
                        entry_hash: None,
                        link: Check::fail(
                            "record",
                            FailureKind::ChainBreak,
                            format!("record is not a receipt: {reason}"),
                        ),
                        verification: None,
                    });
                    result.break_at = Some(index);
                    break;
                }
            };

            let link = if *receipt.prev_hash() == expected_prev {
                Check::pass("prev_hash", "links to previous entry")
            } else {
                Check::fail("prev_hash", FailureKind::ChainBreak, "does not link to previous entry")
                    .with_values(expected_prev.to_hex(), receipt.prev_hash().to_hex())
            };

            let verification = self.verifier.verify(receipt);
            tally(&mut result.summary, &verification);

            let entry = EntryAudit {
                index,
                entry_hash: Some(*receipt.entry_hash()),
                link,
                verification: Some(verification),
            };
            let intact = entry.is_intact();
            result.entries.push(entry);

            if !intact {
                tracing::debug!(index, entry_hash = %receipt.entry_hash(), "chain broken");
                result.break_at = Some(index);
                break;
            }
            expected_prev = *receipt.entry_hash();
        }

        result.valid = result.break_at.is_none() && result.summary.invalid_signature == 0;
        result
    }
}

fn tally(summary: &mut AuditSummary, verification: &VerificationResult) {
    if verification.hash_valid() {
        summary.valid_hash += 1;
    }
    match verification.signature_valid() {
        Some(true) => summary.valid_signature += 1,
        Some(false) => summary.invalid_signature += 1,
        None => summary.unchecked_signature += 1,
    }
}

/// Audit with a default auditor.
pub fn audit_chain(receipts: &[Receipt]) -> AuditResult {
    ChainAuditor::new().audit(receipts)
}
