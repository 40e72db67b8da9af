//! # Trust Ledger Testkit
//!
//! Testing utilities for the Trust Ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with independently computed digests and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up keys, chains and stores
//!
//! ## Golden Vectors
//!
//! ```rust
//! use trust_ledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, entry_hash) in verify_all_vectors() {
//!     assert!(matches, "{name}: {entry_hash}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use trust_ledger_testkit::generators::{receipt_from_params, EventParams};
//!
//! proptest! {
//!     #[test]
//!     fn entry_hash_is_deterministic(params: EventParams) {
//!         let r1 = receipt_from_params(&params);
//!         let r2 = receipt_from_params(&params);
//!         prop_assert_eq!(r1.entry_hash(), r2.entry_hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use trust_ledger_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([7; 32]);
//! let chain = fixture.signed_chain("sess-1", 3);
//! assert_eq!(chain.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{receipt_from_params, EventParams};
pub use vectors::{all_chain_vectors, all_signed_vectors, verify_all_vectors, ChainVector, SignedVector};
