//! Digest functions.
//!
//! Every digest in the ledger is 256 bits and travels as 64 lowercase hex
//! characters. The algorithm is fixed per ledger (see [`DigestAlgorithm`]).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 32-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex (either case).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The zero digest (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The hash function behind every digest of a ledger.
///
/// Builder and verifier must agree on the algorithm; receipts do not record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Digest raw bytes.
    pub fn digest(self, data: &[u8]) -> Digest {
        match self {
            DigestAlgorithm::Sha256 => Digest(Sha256::digest(data).into()),
            DigestAlgorithm::Blake3 => Digest(*blake3::hash(data).as_bytes()),
        }
    }

    /// Digest raw bytes, returning hex.
    pub fn digest_hex(self, data: &[u8]) -> String {
        self.digest(data).to_hex()
    }

    /// Entry hash of a chain-only receipt.
    ///
    /// Concatenates the hex text of the three digests (not their bytes) and
    /// digests the result.
    pub fn chain_digest(self, prev_hash: &Digest, inputs_hash: &Digest, outputs_hash: &Digest) -> Digest {
        let mut text = String::with_capacity(64 * 3);
        text.push_str(&prev_hash.to_hex());
        text.push_str(&inputs_hash.to_hex());
        text.push_str(&outputs_hash.to_hex());
        self.digest(text.as_bytes())
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest with the default algorithm (SHA-256).
pub fn digest(data: &[u8]) -> Digest {
    DigestAlgorithm::default().digest(data)
}

/// Hex digest with the default algorithm (SHA-256).
pub fn digest_hex(data: &[u8]) -> String {
    digest(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_answer() {
        assert_eq!(
            digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_blake3_known_answer() {
        assert_eq!(
            DigestAlgorithm::Blake3.digest_hex(b""),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_algorithms_differ() {
        let data = b"ping";
        assert_ne!(
            DigestAlgorithm::Sha256.digest(data),
            DigestAlgorithm::Blake3.digest(data)
        );
    }

    #[test]
    fn test_chain_digest_hashes_hex_text() {
        let prev = Digest::ZERO;
        let inputs = digest(b"ping");
        let outputs = digest(b"pong");

        let expected = digest(format!("{}{}{}", prev, inputs, outputs).as_bytes());
        assert_eq!(DigestAlgorithm::Sha256.chain_digest(&prev, &inputs, &outputs), expected);

        // Not the same as hashing the concatenated raw bytes.
        let mut raw = Vec::new();
        raw.extend_from_slice(prev.as_bytes());
        raw.extend_from_slice(inputs.as_bytes());
        raw.extend_from_slice(outputs.as_bytes());
        assert_ne!(digest(&raw), expected);
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let d = digest(b"test data");
        assert_eq!(Digest::from_hex(&d.to_hex()).unwrap(), d);
        assert_eq!(Digest::from_hex(&d.to_hex().to_uppercase()).unwrap(), d);
        assert!(Digest::from_hex("abcd").is_err());
        assert!(Digest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Digest::ZERO.is_zero());
        assert_eq!(Digest::ZERO.to_hex(), "0".repeat(64));
        assert!(!digest(b"x").is_zero());
    }

    #[test]
    fn test_serde_as_hex() {
        let d = digest(b"abc");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
