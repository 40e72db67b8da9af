//! End-to-end receipt properties: determinism, round trips, tamper
//! sensitivity, signature binding, chain continuity and shape dispatch.

use proptest::prelude::*;
use trust_ledger::core::{
    audit_chain, verify_receipt, ChainAuditor, CoreError, Digest, EventDescriptor, FailureKind,
    KeyManager, Receipt, ReceiptBuilder, ReceiptRecord, ReceiptShape, ReceiptVerifier,
};
use trust_ledger_testkit::fixtures::TestFixture;
use trust_ledger_testkit::generators::{receipt_from_params, EventParams};

fn ping_pong(event_id: &str) -> EventDescriptor {
    EventDescriptor::new(event_id, "sess-pp")
        .timestamp(1736870400000)
        .vendor("acme")
        .model("m-1")
        .input(&b"ping"[..])
        .output(&b"pong"[..])
}

fn corrupt(digest: &Digest) -> Digest {
    let mut bytes = *digest.as_bytes();
    bytes[0] ^= 0x01;
    Digest::from_bytes(bytes)
}

#[test]
fn test_determinism() {
    let keys = KeyManager::from_seed(&[0x42; 32]);
    let builder = ReceiptBuilder::new().signer(&keys);

    let a = builder.build(&ping_pong("evt-1"), None).unwrap();
    let b = builder.build(&ping_pong("evt-1"), None).unwrap();
    assert_eq!(a.entry_hash(), b.entry_hash());
    assert_eq!(a.payload(), b.payload());
}

#[test]
fn test_wire_roundtrip_keeps_validity() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 32]);
    for receipt in fixture.signed_chain("s", 2).into_iter().chain(fixture.chain_only_chain("s", 2)) {
        let record = ReceiptRecord::from(&receipt);

        let json = ReceiptRecord::from_json(&record.to_json()?)?;
        let cbor = ReceiptRecord::from_cbor(&record.to_cbor()?)?;
        assert_eq!(json, record);
        assert_eq!(cbor, record);

        let result = ReceiptVerifier::new().verify_record(&json)?;
        assert!(result.valid);
        assert_eq!(result.shape, receipt.shape());
    }
    Ok(())
}

#[test]
fn test_tamper_sensitivity_signed() {
    let keys = KeyManager::from_seed(&[0x42; 32]);
    let original = ReceiptBuilder::new().signer(&keys).build(&ping_pong("evt-1"), None).unwrap();

    let mut payload = original.clone();
    if let Receipt::Signed(signed) = &mut payload {
        signed.payload = signed.payload.replace("\"m-1\"", "\"m-2\"");
    }
    assert!(verify_receipt(&payload).has_failure(FailureKind::HashMismatch));

    let tamperers: [fn(&mut Receipt); 3] = [
        |r| {
            let forged = corrupt(r.inputs_hash());
            r.header_mut().inputs_hash = forged;
        },
        |r| {
            let forged = corrupt(r.outputs_hash());
            r.header_mut().outputs_hash = forged;
        },
        |r| {
            let forged = corrupt(r.prev_hash());
            r.header_mut().prev_hash = forged;
        },
    ];
    for tamper in tamperers {
        let mut receipt = original.clone();
        tamper(&mut receipt);
        let result = verify_receipt(&receipt);
        assert!(!result.valid);
        assert!(result.has_failure(FailureKind::HashMismatch));
    }
}

#[test]
fn test_tamper_sensitivity_chain_only() {
    let original = ReceiptBuilder::new().build(&ping_pong("evt-1"), None).unwrap();

    let tamperers: [fn(&mut Receipt); 3] = [
        |r| {
            let forged = corrupt(r.inputs_hash());
            r.header_mut().inputs_hash = forged;
        },
        |r| {
            let forged = corrupt(r.outputs_hash());
            r.header_mut().outputs_hash = forged;
        },
        |r| {
            let forged = corrupt(r.prev_hash());
            r.header_mut().prev_hash = forged;
        },
    ];
    for tamper in tamperers {
        let mut receipt = original.clone();
        tamper(&mut receipt);
        let result = verify_receipt(&receipt);
        let check = result.check("entry_hash").unwrap();
        assert_eq!(check.kind, Some(FailureKind::HashMismatch));
        assert_eq!(check.actual, Some(original.entry_hash().to_hex()));
    }
}

#[test]
fn test_signature_binding() {
    let key_a = KeyManager::from_seed(&[0xaa; 32]);
    let key_b = KeyManager::from_seed(&[0xbb; 32]);
    let mut receipt = ReceiptBuilder::new().signer(&key_a).build(&ping_pong("evt-1"), None).unwrap();
    if let Receipt::Signed(signed) = &mut receipt {
        signed.public_key = key_b.public_key().to_hex();
    }

    let result = verify_receipt(&receipt);
    assert!(!result.valid);
    assert_eq!(result.signature_valid(), Some(false));
    assert!(result.hash_valid());
}

#[test]
fn test_chain_continuity_swap() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let mut chain = fixture.signed_chain("s", 5);
    assert!(audit_chain(&chain).valid);

    chain.swap(2, 3);
    let result = audit_chain(&chain);
    assert!(!result.valid);
    assert_eq!(result.break_at, Some(2));
}

#[test]
fn test_empty_chain() {
    let result = audit_chain(&[]);
    assert!(result.valid);
    assert!(result.entries.is_empty());
}

#[test]
fn test_ping_pong_scenario() {
    let builder = ReceiptBuilder::new();
    let first = builder.build(&ping_pong("evt-1"), None).unwrap();
    let mut second = builder.build(&ping_pong("evt-2"), Some(*first.entry_hash())).unwrap();
    assert!(audit_chain(&[first.clone(), second.clone()]).valid);

    let forged = corrupt(second.prev_hash());
    second.header_mut().prev_hash = forged;
    let result = audit_chain(&[first, second]);
    assert!(!result.valid);
    assert_eq!(result.break_at, Some(1));
}

#[test]
fn test_shape_dispatch() {
    let keys = KeyManager::from_seed(&[0x42; 32]);
    let signed = ReceiptRecord::from(ReceiptBuilder::new().signer(&keys).build(&ping_pong("e"), None).unwrap());
    let chain = ReceiptRecord::from(ReceiptBuilder::new().build(&ping_pong("e"), None).unwrap());

    let verifier = ReceiptVerifier::new();
    assert_eq!(verifier.verify_record(&signed).unwrap().shape, ReceiptShape::Signed);
    assert_eq!(verifier.verify_record(&chain).unwrap().shape, ReceiptShape::ChainOnly);

    let mut partial = signed.clone();
    partial.public_key = None;
    assert!(matches!(
        verifier.verify_record(&partial),
        Err(CoreError::MalformedReceipt(_))
    ));

    // A chain with a malformed member is a break, not an error.
    let audit = ChainAuditor::new().audit_records(&[chain, partial]);
    assert_eq!(audit.break_at, Some(1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip_validity(params: EventParams) {
        let receipt = receipt_from_params(&params);
        let record = ReceiptRecord::from(&receipt);
        let result = ReceiptVerifier::new().verify_record(&record).unwrap();
        prop_assert!(result.valid);
    }

    #[test]
    fn prop_payload_char_substitution(
        index in any::<prop::sample::Index>(),
        replacement in prop::char::range(' ', '~'),
    ) {
        let keys = KeyManager::from_seed(&[0x42; 32]);
        let mut receipt = ReceiptBuilder::new().signer(&keys).build(&ping_pong("evt-1"), None).unwrap();
        if let Receipt::Signed(signed) = &mut receipt {
            let mut chars: Vec<char> = signed.payload.chars().collect();
            let i = index.index(chars.len());
            prop_assume!(chars[i] != replacement);
            chars[i] = replacement;
            signed.payload = chars.into_iter().collect();
        }

        let result = verify_receipt(&receipt);
        prop_assert!(!result.valid);
        prop_assert!(result.has_failure(FailureKind::HashMismatch));
    }

    #[test]
    fn prop_entry_hash_tamper(params in any::<EventParams>(), byte in 0usize..32) {
        let mut receipt = receipt_from_params(&params);
        let mut bytes = *receipt.entry_hash().as_bytes();
        bytes[byte] ^= 0x80;
        receipt.header_mut().entry_hash = Digest::from_bytes(bytes);

        prop_assert!(!verify_receipt(&receipt).valid);
    }
}
