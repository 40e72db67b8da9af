//! Key management: Ed25519 signing keys and where they come from.
//!
//! A [`KeyManager`] is loaded once, before any signing, and is read-only
//! afterwards. It is `Send + Sync` and is shared between builders through
//! `Arc`.
//!
//! Signatures are always made over the ASCII bytes of a digest's hex text,
//! never over the decoded digest bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::digest::Digest;
use crate::error::KeyError;

/// Fixed message signed while checking that configured keys belong together.
pub const KEY_CHECK_MESSAGE: &[u8] = b"trust-ledger/key-check/v1";

/// Default environment variable holding the private key (hex).
pub const DEFAULT_PRIVATE_KEY_VAR: &str = "TRUST_LEDGER_PRIVATE_KEY";

/// Default environment variable holding the public key (hex).
pub const DEFAULT_PUBLIC_KEY_VAR: &str = "TRUST_LEDGER_PUBLIC_KEY";

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Where a signing key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrigin {
    /// Loaded from an externally managed secret.
    Configured,
    /// Generated in memory for this process only. Not durable; signatures
    /// made with it prove nothing once the process exits.
    Ephemeral,
}

/// External source of key material.
///
/// Both values are optional; empty strings count as absent.
pub trait KeySource {
    /// Private key material (hex; 32-byte seed or 64-byte seed ∥ public).
    fn private_key(&self) -> Option<String>;

    /// Public key material (hex, 32 bytes).
    fn public_key(&self) -> Option<String>;

    /// Short description for log lines. Must not contain key material.
    fn describe(&self) -> String;
}

/// Reads key material from two environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeySource {
    pub private_var: String,
    pub public_var: String,
}

impl EnvKeySource {
    /// Use the given variable names.
    pub fn new(private_var: impl Into<String>, public_var: impl Into<String>) -> Self {
        Self {
            private_var: private_var.into(),
            public_var: public_var.into(),
        }
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVATE_KEY_VAR, DEFAULT_PUBLIC_KEY_VAR)
    }
}

impl KeySource for EnvKeySource {
    fn private_key(&self) -> Option<String> {
        non_empty(std::env::var(&self.private_var).ok())
    }

    fn public_key(&self) -> Option<String> {
        non_empty(std::env::var(&self.public_var).ok())
    }

    fn describe(&self) -> String {
        format!("env:{}/{}", self.private_var, self.public_var)
    }
}

/// Key material supplied directly by the host.
#[derive(Clone, Default)]
pub struct StaticKeySource {
    private_key: Option<String>,
    public_key: Option<String>,
}

impl StaticKeySource {
    /// A source with nothing configured.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A source with the given (possibly absent) values.
    pub fn new(private_key: Option<String>, public_key: Option<String>) -> Self {
        Self {
            private_key,
            public_key,
        }
    }
}

impl fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeySource")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl KeySource for StaticKeySource {
    fn private_key(&self) -> Option<String> {
        non_empty(self.private_key.clone())
    }

    fn public_key(&self) -> Option<String> {
        non_empty(self.public_key.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Outcome of key loading.
///
/// An ephemeral key is deliberately a different variant: the host has to
/// acknowledge it (or reject it) before it gets a [`KeyManager`].
#[derive(Debug)]
pub enum KeyProvision {
    Configured(KeyManager),
    Ephemeral(EphemeralKey),
}

impl KeyProvision {
    /// The origin of the provisioned key.
    pub fn origin(&self) -> KeyOrigin {
        match self {
            KeyProvision::Configured(_) => KeyOrigin::Configured,
            KeyProvision::Ephemeral(_) => KeyOrigin::Ephemeral,
        }
    }

    /// Whether the key was generated in memory.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, KeyProvision::Ephemeral(_))
    }

    /// Accept either origin. The returned manager still reports its origin.
    pub fn acknowledge_ephemeral(self) -> KeyManager {
        match self {
            KeyProvision::Configured(keys) => keys,
            KeyProvision::Ephemeral(key) => key.acknowledge(),
        }
    }

    /// Require an externally configured key (production signing).
    pub fn require_configured(self) -> Result<KeyManager, KeyError> {
        match self {
            KeyProvision::Configured(keys) => Ok(keys),
            KeyProvision::Ephemeral(key) => Err(KeyError::EphemeralRejected(format!(
                "no signing key configured; generated key {} is process-local",
                key.public_key()
            ))),
        }
    }
}

/// A freshly generated key awaiting acknowledgement.
#[must_use = "an ephemeral key must be acknowledged or rejected"]
pub struct EphemeralKey(KeyManager);

impl EphemeralKey {
    /// The generated public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.0.public_key()
    }

    /// Accept the ephemeral key for signing.
    pub fn acknowledge(self) -> KeyManager {
        tracing::warn!(
            public_key = %self.0.public_key(),
            "signing with an ephemeral key; receipts will not verify against any durable key"
        );
        self.0
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EphemeralKey({:?})", self.public_key())
    }
}

/// Why a signature did or did not verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    MalformedPublicKey(String),
    MalformedSignature(String),
    Mismatch,
}

impl SignatureCheck {
    /// Whether the signature verified.
    pub fn is_valid(&self) -> bool {
        matches!(self, SignatureCheck::Valid)
    }

    /// Human readable reason for a failure.
    pub fn reason(&self) -> Option<String> {
        match self {
            SignatureCheck::Valid => None,
            SignatureCheck::MalformedPublicKey(why) => Some(format!("malformed public key: {why}")),
            SignatureCheck::MalformedSignature(why) => Some(format!("malformed signature: {why}")),
            SignatureCheck::Mismatch => {
                Some("signature does not match entry hash under public key".to_string())
            }
        }
    }
}

/// The signing key of a ledger.
#[derive(Clone)]
pub struct KeyManager {
    signing_key: SigningKey,
    origin: KeyOrigin,
}

impl KeyManager {
    /// Load keys from `source`, generating an ephemeral pair if none are configured.
    ///
    /// - private and public present: parsed and checked against each other; a pair that does not
    ///   sign/verify together is a [`KeyError::KeyMismatch`]
    /// - only private present: public key derived from it
    /// - only public present: [`KeyError::InvalidKeyFormat`]
    /// - neither present: [`KeyProvision::Ephemeral`]
    pub fn load_or_generate(source: &dyn KeySource) -> Result<KeyProvision, KeyError> {
        match (source.private_key(), source.public_key()) {
            (Some(private), public) => {
                let keys = Self::from_hex_parts(&private, public.as_deref())?;
                tracing::info!(
                    source = %source.describe(),
                    public_key = %keys.public_key(),
                    "loaded signing key"
                );
                Ok(KeyProvision::Configured(keys))
            }
            (None, Some(_)) => Err(KeyError::InvalidKeyFormat(format!(
                "{}: public key configured without a private key",
                source.describe()
            ))),
            (None, None) => {
                tracing::debug!(source = %source.describe(), "no signing key configured");
                Ok(KeyProvision::Ephemeral(Self::generate_ephemeral()))
            }
        }
    }

    /// Build from hex key material.
    ///
    /// `private_hex` is a 32-byte seed or a 64-byte `seed ∥ public` keypair.
    pub fn from_hex_parts(private_hex: &str, public_hex: Option<&str>) -> Result<Self, KeyError> {
        let private = hex::decode(private_hex.trim())
            .map_err(|e| KeyError::InvalidKeyFormat(format!("private key is not hex: {e}")))?;

        let signing_key = match private.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&private);
                SigningKey::from_bytes(&seed)
            }
            64 => {
                let mut pair = [0u8; 64];
                pair.copy_from_slice(&private);
                SigningKey::from_keypair_bytes(&pair).map_err(|_| {
                    KeyError::KeyMismatch(
                        "embedded public half does not belong to the private seed".into(),
                    )
                })?
            }
            n => {
                return Err(KeyError::InvalidKeyFormat(format!(
                    "private key must be 32 or 64 bytes, got {n}"
                )))
            }
        };

        let keys = Self {
            signing_key,
            origin: KeyOrigin::Configured,
        };

        if let Some(public_hex) = public_hex {
            let public = Ed25519PublicKey::from_hex(public_hex.trim())
                .map_err(|e| KeyError::InvalidKeyFormat(format!("public key: {e}")))?;
            keys.check_pair(&public)?;
        }

        Ok(keys)
    }

    /// Deterministic key from a seed, treated as configured.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
            origin: KeyOrigin::Configured,
        }
    }

    /// Generate a process-local key pair.
    pub fn generate_ephemeral() -> EphemeralKey {
        let mut rng = rand::thread_rng();
        EphemeralKey(Self {
            signing_key: SigningKey::generate(&mut rng),
            origin: KeyOrigin::Ephemeral,
        })
    }

    /// Sign a fixed message and verify it with `public`.
    fn check_pair(&self, public: &Ed25519PublicKey) -> Result<(), KeyError> {
        let verifying_key = VerifyingKey::from_bytes(&public.0)
            .map_err(|_| KeyError::InvalidKeyFormat("public key is not a curve point".into()))?;
        let signature = self.signing_key.sign(KEY_CHECK_MESSAGE);
        verifying_key
            .verify(KEY_CHECK_MESSAGE, &signature)
            .map_err(|_| {
                KeyError::KeyMismatch(format!(
                    "configured public key {} does not match private key (derived {})",
                    public,
                    self.public_key()
                ))
            })
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Where this key came from.
    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    /// Whether this key only lives for the current process.
    pub fn is_ephemeral(&self) -> bool {
        self.origin == KeyOrigin::Ephemeral
    }

    /// Sign the hex text of a digest. Returns the signature as hex.
    pub fn sign(&self, digest_hex: &str) -> String {
        hex::encode(self.signing_key.sign(digest_hex.as_bytes()).to_bytes())
    }

    /// Sign a digest (over its lowercase hex text).
    pub fn sign_digest(&self, digest: &Digest) -> String {
        self.sign(&digest.to_hex())
    }

    /// Check a hex signature over the hex text of a digest.
    pub fn check_signature(digest_hex: &str, signature_hex: &str, public_key_hex: &str) -> SignatureCheck {
        let public = match Ed25519PublicKey::from_hex(public_key_hex.trim()) {
            Ok(pk) => pk,
            Err(e) => return SignatureCheck::MalformedPublicKey(e.to_string()),
        };
        let verifying_key = match VerifyingKey::from_bytes(&public.0) {
            Ok(vk) => vk,
            Err(_) => return SignatureCheck::MalformedPublicKey("not a curve point".into()),
        };

        let sig_bytes = match hex::decode(signature_hex.trim()) {
            Ok(bytes) => bytes,
            Err(e) => return SignatureCheck::MalformedSignature(e.to_string()),
        };
        let sig_bytes: [u8; 64] = match sig_bytes.as_slice().try_into() {
            Ok(arr) => arr,
            Err(_) => {
                return SignatureCheck::MalformedSignature(format!(
                    "expected 64 bytes, got {}",
                    sig_bytes.len()
                ))
            }
        };
        let signature = Signature::from_bytes(&sig_bytes);

        match verifying_key.verify(digest_hex.as_bytes(), &signature) {
            Ok(()) => SignatureCheck::Valid,
            Err(_) => SignatureCheck::Mismatch,
        }
    }

    /// Whether `signature_hex` is a valid signature over `digest_hex`.
    ///
    /// Never fails; the reason for a `false` is logged at debug level.
    pub fn verify(digest_hex: &str, signature_hex: &str, public_key_hex: &str) -> bool {
        let check = Self::check_signature(digest_hex, signature_hex, public_key_hex);
        if let Some(reason) = check.reason() {
            tracing::debug!(digest = digest_hex, %reason, "signature rejected");
        }
        check.is_valid()
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyManager({:?}, {:?})", self.public_key(), self.origin)
    }
}
