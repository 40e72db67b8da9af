//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use trust_ledger_core::{
    Ed25519PublicKey, EventDescriptor, KeyManager, Receipt, ReceiptBuilder, ReceiptRecord,
};
use trust_ledger_store::{MemoryEventStore, StoredEvent};

/// Base timestamp for fixture events (Unix ms).
pub const BASE_TIMESTAMP: i64 = 1736870400000;

/// A test fixture with a signing key and memory store.
pub struct TestFixture {
    pub keys: Arc<KeyManager>,
    pub store: MemoryEventStore,
}

impl TestFixture {
    /// Create a new test fixture with a random key.
    pub fn new() -> Self {
        Self {
            keys: Arc::new(KeyManager::generate_ephemeral().acknowledge()),
            store: MemoryEventStore::new(),
        }
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keys: Arc::new(KeyManager::from_seed(&seed)),
            store: MemoryEventStore::new(),
        }
    }

    /// Get the signing key's public half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keys.public_key()
    }

    /// Split into the key and the store.
    pub fn into_parts(self) -> (Arc<KeyManager>, MemoryEventStore) {
        (self.keys, self.store)
    }

    /// The `index`th event of a session, with distinct content per index.
    pub fn event(&self, session_id: &str, index: usize) -> EventDescriptor {
        EventDescriptor::new(format!("{session_id}-evt-{index}"), session_id)
            .timestamp(BASE_TIMESTAMP + index as i64)
            .vendor("acme")
            .model("m-1")
            .input(format!("prompt {index}").into_bytes())
            .output(format!("completion {index}").into_bytes())
    }

    /// A linked chain of `len` signed receipts.
    pub fn signed_chain(&self, session_id: &str, len: usize) -> Vec<Receipt> {
        self.chain_with(&ReceiptBuilder::new().signer(&self.keys), session_id, len)
    }

    /// A linked chain of `len` chain-only receipts.
    pub fn chain_only_chain(&self, session_id: &str, len: usize) -> Vec<Receipt> {
        self.chain_with(&ReceiptBuilder::new(), session_id, len)
    }

    fn chain_with(&self, builder: &ReceiptBuilder<'_>, session_id: &str, len: usize) -> Vec<Receipt> {
        let mut prev = None;
        (0..len)
            .map(|i| {
                let receipt = builder
                    .build_at(&self.event(session_id, i), prev, BASE_TIMESTAMP + i as i64)
                    .expect("fixture events always canonicalize");
                prev = Some(*receipt.entry_hash());
                receipt
            })
            .collect()
    }

    /// Wrap a chain as stored events, in order.
    pub fn stored_events(&self, session_id: &str, chain: &[Receipt]) -> Vec<StoredEvent> {
        chain
            .iter()
            .enumerate()
            .map(|(i, receipt)| StoredEvent {
                event_id: format!("{session_id}-evt-{i}"),
                session_id: session_id.to_string(),
                created_at: receipt.created_at(),
                record: ReceiptRecord::from(receipt),
            })
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures with distinct keys.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}
