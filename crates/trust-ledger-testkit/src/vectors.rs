//! Golden test vectors for deterministic verification.
//!
//! Expected values were computed with an independent SHA-256 and Ed25519
//! implementation. Any producer following the same hashing conventions must
//! reproduce them byte for byte.

use trust_ledger_core::{
    CoreError, Digest, EventDescriptor, KeyManager, Receipt, ReceiptBuilder, GENESIS_PREV_HASH,
};

/// A chain-only golden vector.
#[derive(Debug, Clone)]
pub struct ChainVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Previous entry hash (hex).
    pub prev_hash: &'static str,
    pub input: &'static [u8],
    pub output: &'static [u8],
    /// Expected inputs hash (hex).
    pub expected_inputs_hash: &'static str,
    /// Expected entry hash (hex).
    pub expected_entry_hash: &'static str,
}

/// A signed golden vector.
#[derive(Debug, Clone)]
pub struct SignedVector {
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    pub event_id: &'static str,
    pub session_id: &'static str,
    pub timestamp: i64,
    pub tenant_id: Option<&'static str>,
    pub vendor: Option<&'static str>,
    pub model: Option<&'static str>,
    /// Metadata as JSON text.
    pub metadata: &'static str,
    pub input: &'static [u8],
    pub output: &'static [u8],
    pub expected_payload: &'static str,
    pub expected_entry_hash: &'static str,
    pub expected_public_key: &'static str,
    pub expected_signature: &'static str,
}

const PING_PONG_ENTRY: &str = "7f0d260028c6ba1614c931ea20ed3d50d73b368f2c0d1031674a7beedb7e854c";

/// Get all chain-only vectors.
pub fn all_chain_vectors() -> Vec<ChainVector> {
    vec![
        ChainVector {
            name: "genesis ping/pong",
            prev_hash: "0000000000000000000000000000000000000000000000000000000000000000",
            input: b"ping",
            output: b"pong",
            expected_inputs_hash: "758d61f26a44448384e5c4468a0dcb7a2abe456067b0f7b505bc28b9411fe931",
            expected_entry_hash: PING_PONG_ENTRY,
        },
        ChainVector {
            name: "hello/world after ping/pong",
            prev_hash: PING_PONG_ENTRY,
            input: b"hello",
            output: b"world",
            expected_inputs_hash: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            expected_entry_hash: "a19b48ef42c594c2c3d1863a6392bcc95c71d1ac9c31d8234a3c6cbf3d7cdf46",
        },
        ChainVector {
            name: "empty content",
            prev_hash: "0000000000000000000000000000000000000000000000000000000000000000",
            input: b"",
            output: b"",
            expected_inputs_hash: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            expected_entry_hash: "9f6668e77ef5309da5f0427a3976eaddb2d725bef302e582043e9b71bf423a2f",
        },
    ]
}

/// Get all signed vectors.
pub fn all_signed_vectors() -> Vec<SignedVector> {
    vec![
        SignedVector {
            name: "signed ping/pong",
            seed: [0x42; 32],
            event_id: "evt-1",
            session_id: "sess-1",
            timestamp: 1736870400000,
            tenant_id: None,
            vendor: Some("acme"),
            model: Some("m-1"),
            metadata: "{}",
            input: b"ping",
            output: b"pong",
            expected_payload: concat!(
                r#"{"compliance":{"audit_logged":true,"consent_recorded":true,"content_filtered":false,"#,
                r#""data_retention_applied":true,"human_oversight":false,"pii_redacted":false},"#,
                r#""event_id":"evt-1","#,
                r#""inputs_hash":"758d61f26a44448384e5c4468a0dcb7a2abe456067b0f7b505bc28b9411fe931","#,
                r#""model":"m-1","#,
                r#""outputs_hash":"9795c5ff8937f23526ccb207a5684c1fc94a7854e19c021b39d944e51f5baef2","#,
                r#""prev_hash":"0000000000000000000000000000000000000000000000000000000000000000","#,
                r#""session_id":"sess-1","timestamp":1736870400000,"vendor":"acme"}"#,
            ),
            expected_entry_hash: "a2a69b245c8294a0f6c97494167cc82718790da018ff506c37d723e45a1ab4b1",
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_signature: concat!(
                "8a2906db9a29262b3be5703999f181f5f7874125863c807229e079883acc0b1e",
                "99bcdd0ef282753a7dfbf6e77d06a215014ceee74a6032ff686f1b588f03b404",
            ),
        },
        SignedVector {
            name: "signed with tenant and metadata",
            seed: [0x00; 32],
            event_id: "evt-2",
            session_id: "sess-2",
            timestamp: 0,
            tenant_id: Some("tenant-a"),
            vendor: None,
            model: None,
            metadata: r#"{"tags":["x","y"],"region":"eu"}"#,
            input: b"",
            output: b"",
            expected_payload: concat!(
                r#"{"compliance":{"audit_logged":true,"consent_recorded":true,"content_filtered":false,"#,
                r#""data_retention_applied":true,"human_oversight":false,"pii_redacted":false},"#,
                r#""event_id":"evt-2","#,
                r#""inputs_hash":"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855","#,
                r#""metadata":{"region":"eu","tags":["x","y"]},"#,
                r#""outputs_hash":"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855","#,
                r#""prev_hash":"0000000000000000000000000000000000000000000000000000000000000000","#,
                r#""session_id":"sess-2","tenant_id":"tenant-a","timestamp":0}"#,
            ),
            expected_entry_hash: "c4300b87c55db9c4823351a956e96dd401d7f417a5b33ef668231589a965bc64",
            expected_public_key: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_signature: concat!(
                "331afcc889abfe48d2150a5246024e057801c0873803bbaf8070db560c4d2898",
                "1f5d9709b8311bea739e88117b661c642e049bb8927634184bfc5c76bf43cd07",
            ),
        },
    ]
}

/// Generate a receipt from a chain-only vector.
pub fn generate_chain_receipt(vector: &ChainVector) -> Result<Receipt, CoreError> {
    let prev = Digest::from_hex(vector.prev_hash).unwrap_or(GENESIS_PREV_HASH);
    let event = EventDescriptor::new(vector.name, "golden")
        .input(vector.input)
        .output(vector.output);
    ReceiptBuilder::new().build_at(&event, Some(prev), 0)
}

/// Generate a receipt from a signed vector.
pub fn generate_signed_receipt(vector: &SignedVector) -> Result<Receipt, CoreError> {
    let keys = KeyManager::from_seed(&vector.seed);
    let mut event = EventDescriptor::new(vector.event_id, vector.session_id)
        .timestamp(vector.timestamp)
        .input(vector.input)
        .output(vector.output);
    event.tenant_id = vector.tenant_id.map(String::from);
    event.vendor = vector.vendor.map(String::from);
    event.model = vector.model.map(String::from);
    if let Ok(serde_json::Value::Object(metadata)) = serde_json::from_str(vector.metadata) {
        event.metadata = metadata;
    }
    ReceiptBuilder::new().signer(&keys).build_at(&event, None, 0)
}

/// Check every vector against its expected values.
///
/// Returns `(name, matches, entry_hash)` per vector; the third field holds
/// the error text when a vector fails to build.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let chain_results = all_chain_vectors().into_iter().map(|v| match generate_chain_receipt(&v) {
        Ok(receipt) => {
            let hex = receipt.entry_hash().to_hex();
            let matches = hex == v.expected_entry_hash
                && receipt.inputs_hash().to_hex() == v.expected_inputs_hash;
            (v.name.to_string(), matches, hex)
        }
        Err(e) => (v.name.to_string(), false, e.to_string()),
    });

    let signed_results = all_signed_vectors().into_iter().map(|v| match generate_signed_receipt(&v) {
        Ok(receipt) => {
            let hex = receipt.entry_hash().to_hex();
            let matches = match &receipt {
                Receipt::Signed(s) => {
                    hex == v.expected_entry_hash
                        && s.payload == v.expected_payload
                        && s.public_key == v.expected_public_key
                        && s.signature == v.expected_signature
                }
                Receipt::ChainOnly(_) => false,
            };
            (v.name.to_string(), matches, hex)
        }
        Err(e) => (v.name.to_string(), false, e.to_string()),
    });

    chain_results.chain(signed_results).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_ledger_core::{audit_chain, verify_receipt};

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{name}' produced {hex}");
        }
    }

    #[test]
    fn test_vectors_verify() {
        for vector in all_signed_vectors() {
            let result = verify_receipt(&generate_signed_receipt(&vector).unwrap());
            assert!(result.valid, "vector '{}' failed: {:?}", vector.name, result.checks);
        }
        for vector in all_chain_vectors() {
            assert!(verify_receipt(&generate_chain_receipt(&vector).unwrap()).valid);
        }
    }

    #[test]
    fn test_chain_vectors_link() {
        let vectors = all_chain_vectors();
        let chain = vec![
            generate_chain_receipt(&vectors[0]).unwrap(),
            generate_chain_receipt(&vectors[1]).unwrap(),
        ];
        assert!(audit_chain(&chain).valid);
    }
}
