//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;
use serde_json::{Map, Value};

use trust_ledger_core::{
    ComplianceFlags, Digest, EventDescriptor, KeyManager, Receipt, ReceiptBuilder,
};

/// Generate a random key manager.
pub fn key_manager() -> impl Strategy<Value = KeyManager> {
    any::<[u8; 32]>().prop_map(|seed| KeyManager::from_seed(&seed))
}

/// Generate a random digest.
pub fn digest() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(Digest::from_bytes)
}

/// Generate an identifier.
pub fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}".prop_map(String::from)
}

/// Generate content bytes of specified max length.
pub fn content(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a compliance block.
pub fn compliance() -> impl Strategy<Value = ComplianceFlags> {
    any::<[bool; 6]>().prop_map(|f| ComplianceFlags {
        consent_recorded: f[0],
        pii_redacted: f[1],
        human_oversight: f[2],
        data_retention_applied: f[3],
        content_filtered: f[4],
        audit_logged: f[5],
    })
}

/// Generate an arbitrary JSON value without floats.
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("\\PC{0,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate an event metadata map.
pub fn metadata() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z_]{1,12}", json_value(), 0..4)
        .prop_map(|m| m.into_iter().collect())
}

/// Parameters for generating a receipt.
#[derive(Debug, Clone)]
pub struct EventParams {
    /// Signing seed; `None` builds a chain-only receipt.
    pub seed: Option<[u8; 32]>,
    pub event: EventDescriptor,
    pub prev: Option<Digest>,
}

impl EventParams {
    /// The signing key, if any.
    pub fn keys(&self) -> Option<KeyManager> {
        self.seed.map(|seed| KeyManager::from_seed(&seed))
    }
}

impl Arbitrary for EventParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<Option<[u8; 32]>>(),
            (identifier(), identifier()),
            0i64..=1_900_000_000_000i64, // timestamp
            (
                proptest::option::of(identifier()),
                proptest::option::of(identifier()),
                proptest::option::of(identifier()),
            ),
            (content(512), content(512)),
            compliance(),
            metadata(),
            proptest::option::of(digest()),
        )
            .prop_map(
                |(seed, (event_id, session_id), ts, (tenant, vendor, model), (input, output), flags, meta, prev)| {
                    let mut event = EventDescriptor::new(event_id, session_id)
                        .timestamp(ts)
                        .input(input)
                        .output(output)
                        .compliance(flags);
                    event.tenant_id = tenant;
                    event.vendor = vendor;
                    event.model = model;
                    event.metadata = meta;
                    EventParams { seed, event, prev }
                },
            )
            .boxed()
    }
}

/// Build a receipt from parameters.
///
/// # Panics
///
/// Panics if the generated event cannot be canonicalized, which the
/// strategies above never produce.
pub fn receipt_from_params(params: &EventParams) -> Receipt {
    let keys = params.keys();
    let builder = match &keys {
        Some(keys) => ReceiptBuilder::new().signer(keys),
        None => ReceiptBuilder::new(),
    };
    builder
        .build_at(&params.event, params.prev, 0)
        .expect("generated events always canonicalize")
}
