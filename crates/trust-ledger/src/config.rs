//! Ledger configuration.

use serde::{Deserialize, Serialize};
use trust_ledger_core::keys::{DEFAULT_PRIVATE_KEY_VAR, DEFAULT_PUBLIC_KEY_VAR};
use trust_ledger_core::{DigestAlgorithm, EnvKeySource, DEFAULT_POLICY_ID};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Digest used for content, payload and chain hashes.
    pub digest_algorithm: DigestAlgorithm,
    /// Policy tag stamped on new receipts.
    pub policy_id: String,
    /// Warn when a verified receipt was signed by a key other than ours.
    pub trusted_key_check: bool,
    /// Where signing keys are read from.
    pub key_env: KeyEnvConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::default(),
            policy_id: DEFAULT_POLICY_ID.to_string(),
            trusted_key_check: false,
            key_env: KeyEnvConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        if config.policy_id.trim().is_empty() {
            return Err(LedgerError::Config("policy_id must not be empty".into()));
        }
        Ok(config)
    }
}

/// Names of the environment variables holding key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEnvConfig {
    pub private_var: String,
    pub public_var: String,
}

impl Default for KeyEnvConfig {
    fn default() -> Self {
        Self {
            private_var: DEFAULT_PRIVATE_KEY_VAR.to_string(),
            public_var: DEFAULT_PUBLIC_KEY_VAR.to_string(),
        }
    }
}

impl KeyEnvConfig {
    /// A key source reading these variables.
    pub fn source(&self) -> EnvKeySource {
        EnvKeySource::new(&self.private_var, &self.public_var)
    }
}
