//! Receipt builder.

use crate::canonical::to_canonical_json;
use crate::digest::{Digest, DigestAlgorithm};
use crate::error::CoreError;
use crate::event::EventDescriptor;
use crate::keys::KeyManager;
use crate::receipt::{
    ChainReceipt, Receipt, ReceiptHeader, SignedReceipt, DEFAULT_POLICY_ID, GENESIS_PREV_HASH,
};

/// Builds receipts for events.
///
/// With a signer the result is a [`SignedReceipt`]; without one it is a
/// [`ChainReceipt`]. Building is deterministic: the same descriptor, prior
/// hash and key always give the same `entry_hash` (and, Ed25519 being
/// deterministic, the same signature). Building fails only if the payload
/// cannot be canonicalized.
#[derive(Debug, Clone)]
pub struct ReceiptBuilder<'k> {
    algorithm: DigestAlgorithm,
    policy_id: String,
    signer: Option<&'k KeyManager>,
}

impl<'k> ReceiptBuilder<'k> {
    /// A chain-only builder with the default digest and policy.
    pub fn new() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            policy_id: DEFAULT_POLICY_ID.to_string(),
            signer: None,
        }
    }

    /// Set the digest algorithm.
    pub fn algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the policy tag.
    pub fn policy_id(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = policy_id.into();
        self
    }

    /// Sign receipts with `keys`.
    pub fn signer(mut self, keys: &'k KeyManager) -> Self {
        self.signer = Some(keys);
        self
    }

    /// Whether built receipts will be signed.
    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }

    /// Build a receipt, stamped with the current time.
    pub fn build(&self, event: &EventDescriptor, prev: Option<Digest>) -> Result<Receipt, CoreError> {
        self.build_at(event, prev, crate::now_millis())
    }

    /// Build a receipt with an explicit `created_at`.
    pub fn build_at(
        &self,
        event: &EventDescriptor,
        prev: Option<Digest>,
        created_at: i64,
    ) -> Result<Receipt, CoreError> {
        let inputs_hash = self.algorithm.digest(&event.input);
        let outputs_hash = self.algorithm.digest(&event.output);
        let prev_hash = prev.unwrap_or(GENESIS_PREV_HASH);

        match self.signer {
            Some(keys) => {
                let payload = to_canonical_json(&event.payload(&inputs_hash, &outputs_hash, &prev_hash))?;
                let entry_hash = self.algorithm.digest(payload.as_bytes());
                let signature = keys.sign_digest(&entry_hash);

                Ok(Receipt::Signed(SignedReceipt {
                    header: ReceiptHeader {
                        inputs_hash,
                        outputs_hash,
                        prev_hash,
                        entry_hash,
                        policy_id: self.policy_id.clone(),
                        created_at,
                    },
                    payload,
                    signature,
                    public_key: keys.public_key().to_hex(),
                }))
            }
            None => {
                let entry_hash = self.algorithm.chain_digest(&prev_hash, &inputs_hash, &outputs_hash);
                Ok(Receipt::ChainOnly(ChainReceipt {
                    header: ReceiptHeader {
                        inputs_hash,
                        outputs_hash,
                        prev_hash,
                        entry_hash,
                        policy_id: self.policy_id.clone(),
                        created_at,
                    },
                }))
            }
        }
    }
}

impl Default for ReceiptBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
