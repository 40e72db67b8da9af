//! Receipt: the unit of trust evidence.
//!
//! A receipt has exactly one of two shapes. A signed receipt carries a
//! canonical payload, a signature and the verification key. A chain-only
//! receipt carries nothing but its hash links. Both share a [`ReceiptHeader`].

use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// `prev_hash` of the first receipt in a session.
pub const GENESIS_PREV_HASH: Digest = Digest::ZERO;

/// Policy tag stamped on receipts when none is configured.
pub const DEFAULT_POLICY_ID: &str = "trust-receipt/v1";

/// The shape of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptShape {
    Signed,
    ChainOnly,
}

/// Fields present on every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptHeader {
    /// Digest of the raw input content.
    pub inputs_hash: Digest,

    /// Digest of the raw output content.
    pub outputs_hash: Digest,

    /// `entry_hash` of the previous receipt, or [`GENESIS_PREV_HASH`].
    pub prev_hash: Digest,

    /// This receipt's identifying digest.
    pub entry_hash: Digest,

    /// Receipt-shape version tag. Not interpreted.
    pub policy_id: String,

    /// Creation time (Unix milliseconds). Advisory; never hashed.
    pub created_at: i64,
}

/// A receipt whose entry hash is `digest(canonical payload)`, signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedReceipt {
    pub header: ReceiptHeader,

    /// Canonical JSON of the event's descriptive metadata.
    pub payload: String,

    /// Ed25519 signature over the hex text of `entry_hash`, hex encoded.
    pub signature: String,

    /// Verification key, hex encoded.
    pub public_key: String,
}

/// A receipt whose entry hash is `digest(prev ∥ inputs ∥ outputs)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReceipt {
    pub header: ReceiptHeader,
}

/// A receipt of either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Receipt {
    Signed(SignedReceipt),
    ChainOnly(ChainReceipt),
}

impl Receipt {
    /// The shared header.
    pub fn header(&self) -> &ReceiptHeader {
        match self {
            Receipt::Signed(r) => &r.header,
            Receipt::ChainOnly(r) => &r.header,
        }
    }

    /// Mutable access to the shared header.
    pub fn header_mut(&mut self) -> &mut ReceiptHeader {
        match self {
            Receipt::Signed(r) => &mut r.header,
            Receipt::ChainOnly(r) => &mut r.header,
        }
    }

    /// The shape of this receipt.
    pub fn shape(&self) -> ReceiptShape {
        match self {
            Receipt::Signed(_) => ReceiptShape::Signed,
            Receipt::ChainOnly(_) => ReceiptShape::ChainOnly,
        }
    }

    /// Whether this receipt carries a signature.
    pub fn is_signed(&self) -> bool {
        matches!(self, Receipt::Signed(_))
    }

    /// Get the entry hash.
    pub fn entry_hash(&self) -> &Digest {
        &self.header().entry_hash
    }

    /// Get the previous entry hash.
    pub fn prev_hash(&self) -> &Digest {
        &self.header().prev_hash
    }

    /// Get the inputs hash.
    pub fn inputs_hash(&self) -> &Digest {
        &self.header().inputs_hash
    }

    /// Get the outputs hash.
    pub fn outputs_hash(&self) -> &Digest {
        &self.header().outputs_hash
    }

    /// Get the policy tag.
    pub fn policy_id(&self) -> &str {
        &self.header().policy_id
    }

    /// Get the advisory creation time.
    pub fn created_at(&self) -> i64 {
        self.header().created_at
    }

    /// Whether this receipt starts a session chain.
    pub fn is_chain_start(&self) -> bool {
        *self.prev_hash() == GENESIS_PREV_HASH
    }

    /// The signed payload, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Receipt::Signed(r) => Some(&r.payload),
            Receipt::ChainOnly(_) => None,
        }
    }
}

impl From<SignedReceipt> for Receipt {
    fn from(r: SignedReceipt) -> Self {
        Receipt::Signed(r)
    }
}

impl From<ChainReceipt> for Receipt {
    fn from(r: ChainReceipt) -> Self {
        Receipt::ChainOnly(r)
    }
}
