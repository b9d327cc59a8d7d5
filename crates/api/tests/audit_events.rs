#![forbid(unsafe_code)]

mod support;
use support::*;

use sc_api::ControlApi;
use sc_orchestrator::RequestContext;
use sc_orchestrator::audit::{AuditOutcome, BusinessType, MemoryAuditSink, params_digest};
use sc_orchestrator::config::ControlConfig;
use serde_json::json;
use std::sync::Arc;

#[test]
fn audited_operation_records_one_success_event() {
    let api = Api::standard();
    let args = json!({"id": 1, "withSavePoint": true});
    api.call("cancel", args.clone());

    let events = api.audit.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.operation, "cancel");
    assert_eq!(event.title, "Cancel Job");
    assert_eq!(event.business_type, BusinessType::Trigger);
    assert_eq!(event.target, Some(1));
    assert_eq!(event.outcome, AuditOutcome::Success);
    assert_eq!(event.params_digest, params_digest(&args));
    assert!(event.ts.ends_with('Z'));
}

#[test]
fn version_probe_and_unknown_operations_are_not_audited() {
    let api = Api::standard();
    api.call("getVersion", json!({}));
    api.call("dropEverything", json!({"id": 1}));
    assert!(api.audit.events().is_empty());
}

#[test]
fn failures_record_the_envelope_status_and_message() {
    let api = Api::standard();
    api.call("getJobInstance", json!({"id": 9}));
    *api.jobs.report_failure.lock().unwrap() = Some("syntax error".to_string());
    api.call("submitTask", json!({"id": 1}));

    let events = api.audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].outcome,
        AuditOutcome::Failure {
            code: "TENANT_NOT_RESOLVED".to_string(),
            message: "tenant could not be resolved for job instance id 9".to_string(),
        }
    );
    assert_eq!(
        events[1].outcome,
        AuditOutcome::Failure {
            code: "EXECUTE_FAILED".to_string(),
            message: "syntax error".to_string(),
        }
    );
}

#[test]
fn digest_hides_parameter_values_and_ignores_key_order() {
    let api = Api::standard();
    api.call(
        "adHocExecute",
        json!({"id": 2, "params": {"date": "2024-01-01", "name": "secret_table"}}),
    );
    api.call(
        "adHocExecute",
        json!({"params": {"name": "secret_table", "date": "2024-01-01"}, "id": 2}),
    );

    let events = api.audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].params_digest, events[1].params_digest);
    assert_eq!(events[0].params_digest.len(), 64);
    assert!(!events[0].params_digest.contains("secret"));
    assert_eq!(events[0].business_type, BusinessType::Other);
}

#[test]
fn business_types_and_targets_follow_the_operation() {
    let api = Api::standard();
    api.call("restartTask", json!({"id": 1}));
    api.call("exportSql", json!({"id": 2}));
    api.call("triggerSavepoint", json!({"taskId": 1, "savePointType": "trigger"}));
    api.call("submitTask", json!({"id": 1}));
    api.call("getJobPlan", json!({"id": 2, "tenantId": 20, "statement": "SELECT 1"}));

    let seen: Vec<_> = api
        .audit
        .events()
        .into_iter()
        .map(|e| (e.operation, e.business_type, e.target))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("restartTask", BusinessType::RemoteOperation, Some(1)),
            ("exportSql", BusinessType::Export, Some(2)),
            ("triggerSavepoint", BusinessType::Trigger, Some(1)),
            ("submitTask", BusinessType::Submit, Some(1)),
            ("getJobPlan", BusinessType::Query, Some(2)),
        ]
    );
}

#[test]
fn auditing_can_be_switched_off_by_config() {
    let mut config = ControlConfig::default();
    config
        .apply_env(|key| (key == "STREAMCTL_AUDIT").then(|| "off".to_string()))
        .unwrap();

    let Fixture { orchestrator, .. } = Fixture::standard();
    let sink = Arc::new(MemoryAuditSink::default());
    let api = ControlApi::from_config(orchestrator, &config, sink.clone());
    let reply = api.dispatch(&RequestContext::new(), "cancel", &json!({"id": 1}));

    assert_success(&reply, "EXECUTE_SUCCESS");
    assert!(sink.events().is_empty());
}
