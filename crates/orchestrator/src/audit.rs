#![forbid(unsafe_code)]

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Mutex;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const AUDIT_TARGET: &str = "streamctl::audit";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessType {
    Submit,
    Trigger,
    RemoteOperation,
    Export,
    Query,
    Other,
}

impl BusinessType {
    pub fn as_str(self) -> &'static str {
        match self {
            BusinessType::Submit => "SUBMIT",
            BusinessType::Trigger => "TRIGGER",
            BusinessType::RemoteOperation => "REMOTE_OPERATION",
            BusinessType::Export => "EXPORT",
            BusinessType::Query => "QUERY",
            BusinessType::Other => "OTHER",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure { code: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub operation: &'static str,
    pub title: &'static str,
    pub business_type: BusinessType,
    /// Primary id the operation acted on, when it has one.
    pub target: Option<i64>,
    pub outcome: AuditOutcome,
    pub elapsed_ms: u64,
    pub params_digest: String,
    pub ts: String,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Writes audit events as structured `tracing` events on [`AUDIT_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event.outcome {
            AuditOutcome::Success => tracing::info!(
                target: AUDIT_TARGET,
                operation = event.operation,
                title = event.title,
                business_type = event.business_type.as_str(),
                target_id = ?event.target,
                elapsed_ms = event.elapsed_ms,
                params_digest = %event.params_digest,
                ts = %event.ts,
                "operation succeeded"
            ),
            AuditOutcome::Failure { code, message } => tracing::warn!(
                target: AUDIT_TARGET,
                operation = event.operation,
                title = event.title,
                business_type = event.business_type.as_str(),
                target_id = ?event.target,
                elapsed_ms = event.elapsed_ms,
                params_digest = %event.params_digest,
                ts = %event.ts,
                code = %code,
                message = %message,
                "operation failed"
            ),
        }
    }
}

/// Keeps events in memory for the embedding service to inspect, e.g. before forwarding
/// them to its own operation log.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// SHA-256 hex digest of the arguments, so audit records never carry raw parameter values.
///
/// `serde_json` keeps object keys sorted (no `preserve_order`), which makes the encoding
/// canonical for equal inputs.
pub fn params_digest(args: &Value) -> String {
    let encoded = serde_json::to_vec(args).unwrap_or_default();
    let digest = Sha256::digest(&encoded);
    let mut out = String::with_capacity(64);
    for b in digest {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
