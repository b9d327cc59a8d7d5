#![forbid(unsafe_code)]

use crate::dispatch::{ControlApi, Reply};
use crate::envelope::Status;
use sc_orchestrator::audit::BusinessType;
use sc_orchestrator::{ControlError, RequestContext};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub(crate) type Handler = fn(&ControlApi, &RequestContext, &Value) -> Result<Reply, ControlError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationKind {
    Query,
    Execute,
    Fetch,
}

impl OperationKind {
    pub fn success_status(self) -> Status {
        match self {
            OperationKind::Query => Status::QuerySuccess,
            OperationKind::Execute => Status::ExecuteSuccess,
            OperationKind::Fetch => Status::FetchSuccess,
        }
    }
}

/// Static description of one operation of the control surface.
#[derive(Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub business_type: BusinessType,
    pub kind: OperationKind,
    pub audited: bool,
    /// Argument carrying the primary id, reported as the audit target.
    pub target_arg: Option<&'static str>,
    pub(crate) handler: Handler,
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("business_type", &self.business_type)
            .field("kind", &self.kind)
            .field("audited", &self.audited)
            .finish()
    }
}

pub struct OperationRegistry {
    specs: Vec<OperationSpec>,
    by_name: BTreeMap<&'static str, usize>,
}

impl OperationRegistry {
    pub fn global() -> &'static OperationRegistry {
        static REGISTRY: OnceLock<OperationRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| OperationRegistry::build(operation_specs()))
    }

    fn build(specs: Vec<OperationSpec>) -> Self {
        let by_name = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.name, idx))
            .collect();
        Self { specs, by_name }
    }

    pub fn find(&self, name: &str) -> Option<&OperationSpec> {
        self.by_name.get(name).map(|idx| &self.specs[*idx])
    }

    pub fn specs(&self) -> &[OperationSpec] {
        &self.specs
    }
}

fn spec(
    name: &'static str,
    title: &'static str,
    business_type: BusinessType,
    kind: OperationKind,
    target_arg: Option<&'static str>,
    handler: Handler,
) -> OperationSpec {
    OperationSpec {
        name,
        title,
        business_type,
        kind,
        audited: true,
        target_arg,
        handler,
    }
}

fn operation_specs() -> Vec<OperationSpec> {
    use crate::dispatch::handlers as h;
    use BusinessType as B;
    use OperationKind as K;

    vec![
        OperationSpec {
            audited: false,
            ..spec("getVersion", "Query Service Version", B::Query, K::Query, None, h::get_version)
        },
        spec("submitTask", "Submit Task", B::Submit, K::Execute, Some("id"), h::submit_task),
        spec(
            "savepointByTaskDescriptor",
            "Savepoint Task",
            B::Trigger,
            K::Execute,
            Some("taskId"),
            h::savepoint_by_code,
        ),
        spec("cancel", "Cancel Job", B::Trigger, K::Execute, Some("id"), h::cancel),
        spec(
            "restartTask",
            "Restart Task",
            B::RemoteOperation,
            K::Execute,
            Some("id"),
            h::restart_task,
        ),
        spec(
            "triggerSavepoint",
            "Savepoint Trigger",
            B::Trigger,
            K::Execute,
            Some("taskId"),
            h::savepoint_by_name,
        ),
        spec("explainSql", "Explain Sql", B::Query, K::Execute, Some("id"), h::explain_sql),
        spec("getJobPlan", "Get Job Plan", B::Query, K::Execute, Some("id"), h::get_job_plan),
        spec(
            "getStreamGraph",
            "Get Stream Graph",
            B::Query,
            K::Execute,
            Some("id"),
            h::get_stream_graph,
        ),
        spec(
            "getJobInstance",
            "Get Job Instance",
            B::Query,
            K::Query,
            Some("id"),
            h::get_job_instance,
        ),
        spec(
            "getJobInstanceByTaskId",
            "Get Job Instance By Task Id",
            B::Query,
            K::Query,
            Some("id"),
            h::get_job_instance_by_task_id,
        ),
        spec("exportSql", "Export Sql", B::Export, K::Query, Some("id"), h::export_sql),
        spec(
            "getTaskLineage",
            "Get Task Lineage",
            B::Other,
            K::Query,
            Some("id"),
            h::get_task_lineage,
        ),
        spec(
            "adHocExecute",
            "Ad-hoc Query",
            B::Other,
            K::Fetch,
            Some("id"),
            h::ad_hoc_execute,
        ),
    ]
}
