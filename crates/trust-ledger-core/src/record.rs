//! The persisted/exchanged receipt shape and its codecs.
//!
//! A [`ReceiptRecord`] is what storage and transports carry: every field is a
//! string (or absent), exactly as other systems write them. Converting it into
//! a typed [`Receipt`] is where the shape is detected and structurally
//! incomplete records are rejected, before any hashing or signature work.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::CoreError;
use crate::receipt::{ChainReceipt, Receipt, ReceiptHeader, SignedReceipt};

/// Loosely-typed receipt, field names as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default)]
    pub policy_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl ReceiptRecord {
    /// Detect the shape and convert into a typed receipt.
    ///
    /// The four hash fields are required for both shapes. `payload`,
    /// `signature` and `public_key` must be all present (signed) or all
    /// absent (chain-only).
    pub fn to_receipt(&self) -> Result<Receipt, CoreError> {
        let header = ReceiptHeader {
            inputs_hash: required_digest("inputs_hash", &self.inputs_hash)?,
            outputs_hash: required_digest("outputs_hash", &self.outputs_hash)?,
            prev_hash: required_digest("prev_hash", &self.prev_hash)?,
            entry_hash: required_digest("entry_hash", &self.entry_hash)?,
            policy_id: self.policy_id.clone(),
            created_at: self.created_at.unwrap_or(0),
        };

        let payload = present(&self.payload);
        let signature = present(&self.signature);
        let public_key = present(&self.public_key);

        match (payload, signature, public_key) {
            (Some(payload), Some(signature), Some(public_key)) => {
                Ok(Receipt::Signed(SignedReceipt {
                    header,
                    payload: payload.to_string(),
                    signature: signature.to_string(),
                    public_key: public_key.to_string(),
                }))
            }
            (None, None, None) => Ok(Receipt::ChainOnly(ChainReceipt { header })),
            (payload, signature, public_key) => {
                let missing: Vec<&str> = [
                    ("payload", payload.is_none()),
                    ("signature", signature.is_none()),
                    ("public_key", public_key.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(CoreError::MalformedReceipt(format!(
                    "partial signed receipt: missing {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::DecodingError(e.to_string()))
    }

    /// Encode as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

impl From<&Receipt> for ReceiptRecord {
    fn from(receipt: &Receipt) -> Self {
        let header = receipt.header();
        let mut record = ReceiptRecord {
            payload: None,
            inputs_hash: Some(header.inputs_hash.to_hex()),
            outputs_hash: Some(header.outputs_hash.to_hex()),
            prev_hash: Some(header.prev_hash.to_hex()),
            entry_hash: Some(header.entry_hash.to_hex()),
            public_key: None,
            signature: None,
            policy_id: header.policy_id.clone(),
            created_at: Some(header.created_at),
        };
        if let Receipt::Signed(signed) = receipt {
            record.payload = Some(signed.payload.clone());
            record.signature = Some(signed.signature.clone());
            record.public_key = Some(signed.public_key.clone());
        }
        record
    }
}

impl From<Receipt> for ReceiptRecord {
    fn from(receipt: Receipt) -> Self {
        ReceiptRecord::from(&receipt)
    }
}

impl TryFrom<&ReceiptRecord> for Receipt {
    type Error = CoreError;

    fn try_from(record: &ReceiptRecord) -> Result<Self, Self::Error> {
        record.to_receipt()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn required_digest(field: &str, value: &Option<String>) -> Result<Digest, CoreError> {
    let text = present(value)
        .ok_or_else(|| CoreError::MalformedReceipt(format!("missing required field `{field}`")))?;
    Digest::from_hex(text).map_err(|e| {
        CoreError::MalformedReceipt(format!("field `{field}` is not a 32-byte hex digest: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest;
    use crate::receipt::ReceiptShape;

    fn chain_record() -> ReceiptRecord {
        ReceiptRecord {
            inputs_hash: Some(digest(b"in").to_hex()),
            outputs_hash: Some(digest(b"out").to_hex()),
            prev_hash: Some(Digest::ZERO.to_hex()),
            entry_hash: Some(digest(b"entry").to_hex()),
            policy_id: "p/v1".into(),
            created_at: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_chain_only_detected() {
        let receipt = chain_record().to_receipt().unwrap();
        assert_eq!(receipt.shape(), ReceiptShape::ChainOnly);
        assert_eq!(receipt.created_at(), 5);
    }

    #[test]
    fn test_signed_detected() {
        let mut record = chain_record();
        record.payload = Some("{}".into());
        record.signature = Some("ab".into());
        record.public_key = Some("cd".into());
        let receipt = record.to_receipt().unwrap();
        assert_eq!(receipt.shape(), ReceiptShape::Signed);
    }

    #[test]
    fn test_partial_signed_rejected() {
        let mut record = chain_record();
        record.signature = Some("ab".into());
        let err = record.to_receipt().unwrap_err();
        match err {
            CoreError::MalformedReceipt(msg) => {
                assert!(msg.contains("payload"));
                assert!(msg.contains("public_key"));
                assert!(!msg.contains("signature"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_hash_rejected() {
        let mut record = chain_record();
        record.outputs_hash = None;
        assert!(matches!(
            record.to_receipt(),
            Err(CoreError::MalformedReceipt(msg)) if msg.contains("outputs_hash")
        ));

        let mut record = chain_record();
        record.entry_hash = Some(String::new());
        assert!(matches!(record.to_receipt(), Err(CoreError::MalformedReceipt(_))));
    }

    #[test]
    fn test_non_hex_digest_rejected() {
        let mut record = chain_record();
        record.prev_hash = Some("none".into());
        assert!(matches!(
            record.to_receipt(),
            Err(CoreError::MalformedReceipt(msg)) if msg.contains("prev_hash")
        ));
    }

    #[test]
    fn test_record_conversion_roundtrip() {
        let receipt = chain_record().to_receipt().unwrap();
        let record = ReceiptRecord::from(&receipt);
        assert_eq!(record, chain_record());
    }

    #[test]
    fn test_json_omits_absent_fields() {
        let json = chain_record().to_json().unwrap();
        assert!(!json.contains("signature"));
        assert!(!json.contains("payload"));
        assert_eq!(ReceiptRecord::from_json(&json).unwrap(), chain_record());
    }

    #[test]
    fn test_cbor_codec() {
        let mut record = chain_record();
        record.payload = Some(r#"{"a":1}"#.into());
        record.signature = Some("ab".into());
        record.public_key = Some("cd".into());

        let bytes = record.to_cbor().unwrap();
        assert_eq!(ReceiptRecord::from_cbor(&bytes).unwrap(), record);
        assert!(ReceiptRecord::from_cbor(&[0xff, 0x00]).is_err());
    }
}
