//! Throughput benchmarks for receipt building, verification and auditing.
//!
//! Run with: cargo bench -p trust-ledger-testkit

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use trust_ledger_core::{
    audit_chain, canonical_json, verify_receipt, DigestAlgorithm, ReceiptBuilder,
};
use trust_ledger_testkit::fixtures::TestFixture;

fn bench_build(c: &mut Criterion) {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let event = fixture.event("bench", 0).meta("region", json!("eu"));
    let mut group = c.benchmark_group("build");

    group.bench_function("signed", |b| {
        let builder = ReceiptBuilder::new().signer(&fixture.keys);
        b.iter(|| black_box(builder.build_at(&event, None, 0).unwrap()));
    });
    for algorithm in [DigestAlgorithm::Sha256, DigestAlgorithm::Blake3] {
        group.bench_function(BenchmarkId::new("chain_only", algorithm), |b| {
            let builder = ReceiptBuilder::new().algorithm(algorithm);
            b.iter(|| black_box(builder.build_at(&event, None, 0).unwrap()));
        });
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let signed = fixture.signed_chain("bench", 1).remove(0);
    let chain_only = fixture.chain_only_chain("bench", 1).remove(0);
    let mut group = c.benchmark_group("verify");

    group.bench_function("signed", |b| b.iter(|| black_box(verify_receipt(&signed))));
    group.bench_function("chain_only", |b| b.iter(|| black_box(verify_receipt(&chain_only))));

    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let mut group = c.benchmark_group("audit");

    for len in [10usize, 100, 1000] {
        let chain = fixture.signed_chain("bench", len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("signed_chain", len), &chain, |b, chain| {
            b.iter(|| black_box(audit_chain(chain)));
        });
    }

    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let value = json!({
        "event_id": "evt-123",
        "metadata": {"z": [3, 2, 1], "a": {"nested": true, "deep": {"k": "v"}}},
        "vendor": "acme",
        "model": "m-1",
    });

    c.bench_function("canonical_json", |b| b.iter(|| black_box(canonical_json(&value))));
}

criterion_group!(benches, bench_build, bench_verify, bench_audit, bench_canonical);
criterion_main!(benches);
