//! Canonical JSON encoding for deterministic hashing.
//!
//! Output follows RFC 8785 (JSON Canonicalization Scheme):
//! - Object keys sorted by UTF-16 code units at every nesting level
//! - Array order preserved as given
//! - No insignificant whitespace
//! - Numbers in ECMAScript form, so `1.0` and `1` encode identically
//! - Strings escaped minimally
//!
//! Two logically equal structures always produce identical bytes, whatever
//! order their fields were inserted in. Every signed receipt's entry hash is
//! computed over this output.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Encode a JSON value canonically.
pub fn canonical_json(value: &Value) -> Result<String, CoreError> {
    serde_json_canonicalizer::to_string(value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Encode a JSON value canonically, as bytes.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, CoreError> {
    serde_json_canonicalizer::to_vec(value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Canonicalize any serializable value.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CoreError> {
    serde_json_canonicalizer::to_string(&value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Parse JSON text and re-emit it canonically.
pub fn canonicalize_str(json: &str) -> Result<String, CoreError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    canonical_json(&value)
}
