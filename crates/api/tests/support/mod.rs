#![forbid(unsafe_code)]
#![allow(dead_code)]

#[path = "../../../orchestrator/tests/support/mod.rs"]
mod fakes;

pub use fakes::*;

use sc_api::ControlApi;
use sc_orchestrator::RequestContext;
use sc_orchestrator::audit::MemoryAuditSink;
use serde_json::Value;
use std::sync::Arc;

/// Control surface over the standard fake fixture, auditing into memory.
pub struct Api {
    pub log: Arc<CallLog>,
    pub jobs: Arc<FakeJobManager>,
    pub audit: Arc<MemoryAuditSink>,
    pub api: ControlApi,
}

impl Api {
    pub fn standard() -> Self {
        let Fixture {
            log,
            jobs,
            orchestrator,
        } = Fixture::standard();
        let audit = Arc::new(MemoryAuditSink::default());
        let api = ControlApi::new(orchestrator, audit.clone());
        Self {
            log,
            jobs,
            audit,
            api,
        }
    }

    pub fn call(&self, name: &str, args: Value) -> Value {
        self.api.dispatch(&RequestContext::new(), name, &args)
    }
}

pub fn assert_success(reply: &Value, status: &str) {
    assert_eq!(reply["success"], true, "reply: {reply}");
    assert_eq!(reply["code"], 0, "reply: {reply}");
    assert_eq!(reply["status"], status, "reply: {reply}");
}

pub fn assert_failure(reply: &Value, status: &str) {
    assert_eq!(reply["success"], false, "reply: {reply}");
    assert_eq!(reply["code"], 1, "reply: {reply}");
    assert_eq!(reply["status"], status, "reply: {reply}");
}
