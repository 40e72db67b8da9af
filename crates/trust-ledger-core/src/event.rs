//! Event descriptors: what the caller tells the builder about one event.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest::Digest;

/// The fixed six-flag compliance block bound into every signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplianceFlags {
    pub consent_recorded: bool,
    pub pii_redacted: bool,
    pub human_oversight: bool,
    pub data_retention_applied: bool,
    pub content_filtered: bool,
    pub audit_logged: bool,
}

impl Default for ComplianceFlags {
    fn default() -> Self {
        Self {
            consent_recorded: true,
            pii_redacted: false,
            human_oversight: false,
            data_retention_applied: true,
            content_filtered: false,
            audit_logged: true,
        }
    }
}

/// Descriptive data for one event (e.g. one AI interaction).
///
/// The raw `input`/`output` content is never stored in a receipt; only their
/// digests are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub event_id: String,
    pub session_id: String,
    /// Event time, Unix milliseconds.
    pub timestamp: i64,
    pub tenant_id: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub input: Bytes,
    pub output: Bytes,
    pub compliance: ComplianceFlags,
    /// Extra descriptive fields, any nesting. Canonicalized with the payload.
    pub metadata: Map<String, Value>,
}

impl EventDescriptor {
    /// Start describing an event.
    pub fn new(event_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            session_id: session_id.into(),
            timestamp: 0,
            tenant_id: None,
            vendor: None,
            model: None,
            input: Bytes::new(),
            output: Bytes::new(),
            compliance: ComplianceFlags::default(),
            metadata: Map::new(),
        }
    }

    /// Set the event time.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = ts;
        self
    }

    /// Set the tenant.
    pub fn tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the vendor label.
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Set the model label.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the raw input content.
    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the raw output content.
    pub fn output(mut self, output: impl Into<Bytes>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the compliance block.
    pub fn compliance(mut self, flags: ComplianceFlags) -> Self {
        self.compliance = flags;
        self
    }

    /// Add one metadata field.
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The payload object for a signed receipt.
    pub(crate) fn payload<'a>(
        &'a self,
        inputs_hash: &'a Digest,
        outputs_hash: &'a Digest,
        prev_hash: &'a Digest,
    ) -> SignedPayload<'a> {
        SignedPayload {
            event_id: &self.event_id,
            session_id: &self.session_id,
            timestamp: self.timestamp,
            tenant_id: self.tenant_id.as_deref(),
            vendor: self.vendor.as_deref(),
            model: self.model.as_deref(),
            inputs_hash,
            outputs_hash,
            prev_hash,
            compliance: self.compliance,
            metadata: &self.metadata,
        }
    }
}

/// The fields a signed receipt's payload binds.
#[derive(Debug, Serialize)]
pub(crate) struct SignedPayload<'a> {
    event_id: &'a str,
    session_id: &'a str,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    inputs_hash: &'a Digest,
    outputs_hash: &'a Digest,
    prev_hash: &'a Digest,
    compliance: ComplianceFlags,
    #[serde(skip_serializing_if = "is_empty_map")]
    metadata: &'a Map<String, Value>,
}

fn is_empty_map(map: &&Map<String, Value>) -> bool {
    map.is_empty()
}
