#![forbid(unsafe_code)]

use crate::ids::{JobInstanceId, TaskId, TenantId};
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder name → value, as supplied by an ad-hoc caller.
pub type ParameterMap = BTreeMap<String, String>;

/// A stored, tenant-owned SQL job definition.
///
/// `statement` is template source. Execution paths that bind or paginate it work on a
/// clone; the stored text is never rewritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dialect: String,
    pub statement: String,
    #[serde(default)]
    pub use_result: bool,
    #[serde(default)]
    pub statement_set: bool,
    #[serde(default)]
    pub max_row_num: u32,
    /// Dataset names the statement reads or writes.
    #[serde(default)]
    pub lineage_refs: Vec<String>,
}

impl Task {
    pub fn with_statement(&self, statement: String) -> Task {
        Task {
            statement,
            ..self.clone()
        }
    }
}

/// Submit descriptor: which task to run plus per-submission overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub id: TaskId,
    #[serde(default)]
    pub savepoint_path: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Runtime execution record of a task, owned by the job-management subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInstance {
    pub id: JobInstanceId,
    pub task_id: TaskId,
    pub tenant_id: TenantId,
    pub status: JobStatus,
    /// Engine-side job handle.
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobInstance {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Outcome of a dispatched execution (submit, restart, ad-hoc).
///
/// Downstream failures live here (`success=false`, `error` set) rather than in an `Err`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub success: bool,
    pub error: Option<String>,
    pub job_instance_id: Option<JobInstanceId>,
    pub job_id: Option<String>,
    pub status: Option<JobStatus>,
    /// Statement text as actually dispatched.
    pub statement: Option<String>,
    /// Materialized rows for result-returning executions.
    pub result: Option<Value>,
}

impl JobResult {
    pub fn accepted(job_instance_id: JobInstanceId, job_id: Option<String>) -> Self {
        Self {
            success: true,
            job_instance_id: Some(job_instance_id),
            job_id,
            status: Some(JobStatus::Submitted),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            status: Some(JobStatus::Failed),
            ..Self::default()
        }
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }
}
