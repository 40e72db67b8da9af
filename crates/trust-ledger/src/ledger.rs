//! The Ledger: receipt issuance and verification over an event store.
//!
//! The ledger holds an optional signing key, a verifier configured to match
//! its digest algorithm, and the event-lookup collaborator. Building and
//! verifying are pure; only the lookup methods await.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use trust_ledger_core::{
    AuditSummary, ChainAuditor, Digest, Ed25519PublicKey, EntryAudit, EventDescriptor,
    KeyManager, KeyOrigin, KeySource, Receipt, ReceiptBuilder, ReceiptRecord, ReceiptVerifier,
    VerificationResult,
};
use trust_ledger_store::{EventStore, InsertResult, StoredEvent};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// How long clients may cache the exported public key.
pub const PUBLIC_KEY_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Verification of one stored event's receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventVerification {
    pub event_id: String,
    pub session_id: String,
    pub created_at: i64,
    pub result: VerificationResult,
}

impl EventVerification {
    /// Whether the receipt verified.
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }
}

/// One audited session entry, tagged with its event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub event_id: String,
    pub created_at: i64,
    pub audit: EntryAudit,
}

/// Audit of a whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionVerification {
    pub session_id: String,
    pub valid: bool,
    /// Index of the first broken entry.
    pub break_at: Option<usize>,
    /// Audited entries in creation order, up to and including the break.
    pub entries: Vec<SessionEntry>,
    pub summary: AuditSummary,
}

impl SessionVerification {
    /// Event id of the first broken entry.
    pub fn broken_event(&self) -> Option<&str> {
        self.break_at
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.event_id.as_str())
    }
}

/// The ledger's verification key, ready for publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyExport {
    pub public_key: Ed25519PublicKey,
    pub origin: KeyOrigin,
    pub max_age: Duration,
}

impl PublicKeyExport {
    /// The raw 32 key bytes.
    pub fn bytes(&self) -> &[u8; 32] {
        self.public_key.as_bytes()
    }

    /// The key as lowercase hex.
    pub fn hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// `Cache-Control` header value for serving the key.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.max_age.as_secs())
    }
}

/// A recorded event and the outcome of storing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub receipt: Receipt,
    pub insert: InsertResult,
}

/// The main Ledger struct.
///
/// Provides:
/// - Building receipts (signed when a key is configured, chain-only otherwise)
/// - Verifying standalone receipts
/// - Verifying stored events and whole sessions
/// - Publishing the verification key
pub struct Ledger<S: EventStore> {
    /// Signing key; `None` means chain-only receipts.
    keys: Option<Arc<KeyManager>>,
    /// Event lookup collaborator.
    store: Arc<S>,
    config: LedgerConfig,
    verifier: ReceiptVerifier,
    /// Held from head lookup to insert so concurrent appends cannot fork a session.
    append_lock: Mutex<()>,
}

impl<S: EventStore> Ledger<S> {
    /// Create a ledger with an optional signing key.
    pub fn new(keys: Option<Arc<KeyManager>>, store: S, config: LedgerConfig) -> Self {
        let mut verifier = ReceiptVerifier::new().algorithm(config.digest_algorithm);
        if config.trusted_key_check {
            if let Some(keys) = &keys {
                verifier = verifier.trusted_key(keys.public_key());
            }
        }

        match &keys {
            Some(k) => tracing::info!(
                public_key = %k.public_key(),
                origin = ?k.origin(),
                algorithm = %config.digest_algorithm,
                "ledger issuing signed receipts"
            ),
            None => tracing::info!(
                algorithm = %config.digest_algorithm,
                "ledger issuing chain-only receipts"
            ),
        }

        Self {
            keys,
            store: Arc::new(store),
            config,
            verifier,
            append_lock: Mutex::new(()),
        }
    }

    /// Create a ledger that signs with `keys`.
    pub fn with_signer(keys: Arc<KeyManager>, store: S, config: LedgerConfig) -> Self {
        Self::new(Some(keys), store, config)
    }

    /// Create a ledger that issues chain-only receipts.
    pub fn chain_only(store: S, config: LedgerConfig) -> Self {
        Self::new(None, store, config)
    }

    /// Create a signing ledger with keys loaded from `source`.
    ///
    /// When the source holds no key an ephemeral one is generated; it is used
    /// only if `allow_ephemeral` is set, otherwise loading fails.
    pub fn from_key_source(
        source: &dyn KeySource,
        allow_ephemeral: bool,
        store: S,
        config: LedgerConfig,
    ) -> Result<Self> {
        let provision = KeyManager::load_or_generate(source)?;
        let keys = if allow_ephemeral {
            provision.acknowledge_ephemeral()
        } else {
            provision.require_configured()?
        };
        Ok(Self::with_signer(Arc::new(keys), store, config))
    }

    /// Create a signing ledger with keys from the configured environment variables.
    pub fn from_env(allow_ephemeral: bool, store: S, config: LedgerConfig) -> Result<Self> {
        let source = config.key_env.source();
        Self::from_key_source(&source, allow_ephemeral, store, config)
    }

    /// The signing key's public half.
    pub fn public_key(&self) -> Option<Ed25519PublicKey> {
        self.keys.as_ref().map(|k| k.public_key())
    }

    /// Where the signing key came from.
    pub fn key_origin(&self) -> Option<KeyOrigin> {
        self.keys.as_ref().map(|k| k.origin())
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The verifier this ledger uses.
    pub fn verifier(&self) -> &ReceiptVerifier {
        &self.verifier
    }

    /// A receipt builder matching this ledger's configuration.
    pub fn builder(&self) -> ReceiptBuilder<'_> {
        let builder = ReceiptBuilder::new()
            .algorithm(self.config.digest_algorithm)
            .policy_id(self.config.policy_id.clone());
        match &self.keys {
            Some(keys) => builder.signer(keys),
            None => builder,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Receipt Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a receipt for `event`, linked to `prev` (or the genesis sentinel).
    pub fn build_receipt(&self, event: &EventDescriptor, prev: Option<Digest>) -> Result<Receipt> {
        Ok(self.builder().build(event, prev)?)
    }

    /// Verify a standalone receipt.
    pub fn verify_receipt(&self, record: &ReceiptRecord) -> Result<VerificationResult> {
        Ok(self.verifier.verify_record(record)?)
    }

    /// Build a receipt for `event` linked to its session's head, and store it.
    ///
    /// Recording an event id that is already stored returns the stored
    /// receipt with [`InsertResult::AlreadyExists`].
    ///
    /// Appends through one ledger are serialized, and `created_at` never
    /// precedes the head's, so the new receipt always sorts after the entry
    /// it links to. Writers sharing a store through separate ledgers need a
    /// store that serializes appends itself.
    pub async fn record_event(&self, event: &EventDescriptor) -> Result<RecordedEvent> {
        let _append = self.append_lock.lock().await;

        if let Some(existing) = self.store.get_event(&event.event_id).await? {
            tracing::debug!(event_id = %event.event_id, "event already recorded");
            return Ok(RecordedEvent {
                receipt: existing.record.to_receipt()?,
                insert: InsertResult::AlreadyExists,
            });
        }

        let (prev, not_before) = match self.store.get_session_head(&event.session_id).await? {
            Some(head) => (Some(*head.record.to_receipt()?.entry_hash()), head.created_at),
            None => (None, i64::MIN),
        };

        let now = trust_ledger_core::now_millis();
        if now < not_before {
            tracing::warn!(
                session_id = %event.session_id,
                now,
                head_created_at = not_before,
                "clock behind session head, stamping with head time"
            );
        }
        let receipt = self.builder().build_at(event, prev, now.max(not_before))?;
        let stored = StoredEvent {
            event_id: event.event_id.clone(),
            session_id: event.session_id.clone(),
            created_at: receipt.created_at(),
            record: ReceiptRecord::from(&receipt),
        };

        let insert = self.store.insert_event(&stored).await?;
        if let InsertResult::Conflict {
            existing_entry_hash,
        } = insert
        {
            return Err(LedgerError::Conflict {
                event_id: event.event_id.clone(),
                existing_entry_hash,
            });
        }

        tracing::info!(
            event_id = %event.event_id,
            session_id = %event.session_id,
            entry_hash = %receipt.entry_hash(),
            shape = ?receipt.shape(),
            "recorded event"
        );
        Ok(RecordedEvent { receipt, insert })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the stored receipt of one event.
    pub async fn verify_event(&self, event_id: &str) -> Result<EventVerification> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;

        let result = self.verifier.verify_record(&event.record)?;
        for warning in &result.warnings {
            tracing::warn!(event_id, %warning, "receipt warning");
        }

        Ok(EventVerification {
            event_id: event.event_id,
            session_id: event.session_id,
            created_at: event.created_at,
            result,
        })
    }

    /// Audit a whole session in creation order.
    ///
    /// An unknown session has no entries and is valid.
    pub async fn verify_session(&self, session_id: &str) -> Result<SessionVerification> {
        let events = self.store.get_session_events(session_id).await?;
        let records: Vec<ReceiptRecord> = events.iter().map(|e| e.record.clone()).collect();

        let audit = ChainAuditor::with_verifier(self.verifier.clone()).audit_records(&records);
        if let Some(index) = audit.break_at {
            tracing::warn!(
                session_id,
                index,
                event_id = %events[index].event_id,
                "session chain broken"
            );
        }

        let entries = audit
            .entries
            .into_iter()
            .zip(&events)
            .map(|(entry, event)| SessionEntry {
                event_id: event.event_id.clone(),
                created_at: event.created_at,
                audit: entry,
            })
            .collect();

        Ok(SessionVerification {
            session_id: session_id.to_string(),
            valid: audit.valid,
            break_at: audit.break_at,
            entries,
            summary: audit.summary,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key Publication
    // ─────────────────────────────────────────────────────────────────────────

    /// Export the verification key for publication.
    pub fn export_public_key(&self) -> Result<PublicKeyExport> {
        let keys = self.keys.as_ref().ok_or(LedgerError::NoSigningKey)?;
        Ok(PublicKeyExport {
            public_key: keys.public_key(),
            origin: keys.origin(),
            max_age: PUBLIC_KEY_MAX_AGE,
        })
    }
}
