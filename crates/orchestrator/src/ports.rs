#![forbid(unsafe_code)]

//! Collaborators the orchestrator drives. Implementations live outside this crate and are
//! handed to [`crate::Orchestrator::new`].

use crate::context::{RequestContext, TenantContext};
use crate::error::ControlError;
use sc_core::ids::{JobInstanceId, TaskId};
use sc_core::model::{JobInstance, JobResult, Task, TaskSubmission};
use sc_core::savepoint::{SavePointResult, SavePointType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub trait TaskRegistry: Send + Sync {
    fn resolve_tenant_by_task_id(
        &self,
        ctx: &RequestContext,
        id: TaskId,
    ) -> Result<TenantContext, ControlError>;

    fn get_task(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        id: TaskId,
    ) -> Result<Task, ControlError>;
}

pub trait JobInstanceTracker: Send + Sync {
    fn resolve_tenant_by_job_instance_id(
        &self,
        ctx: &RequestContext,
        id: JobInstanceId,
    ) -> Result<TenantContext, ControlError>;

    fn get_by_id(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        id: JobInstanceId,
    ) -> Result<JobInstance, ControlError>;

    fn get_by_task_id(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task_id: TaskId,
    ) -> Result<JobInstance, ControlError>;
}

/// Termination preference for a cancel request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOptions {
    pub with_savepoint: bool,
    /// Abrupt termination instead of a graceful stop.
    pub force: bool,
}

impl Default for CancelOptions {
    fn default() -> Self {
        Self {
            with_savepoint: false,
            force: true,
        }
    }
}

/// Explain output for one statement of a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementExplain {
    pub index: usize,
    pub statement_type: String,
    pub sql: String,
    pub explain: Option<String>,
    pub parse_ok: bool,
    pub explain_ok: bool,
    pub error: Option<String>,
}

/// Result of statically explaining a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Explain {
    Ok(Vec<StatementExplain>),
    /// The statement form cannot be explained at all.
    NotSupported(String),
}

/// The job-management subsystem. Commands are accepted synchronously and run
/// asynchronously; an accepted submit does not mean the job finished.
pub trait JobManager: Send + Sync {
    fn submit(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
        submission: &TaskSubmission,
    ) -> Result<JobResult, ControlError>;

    /// Run a result-returning statement and wait for its rows.
    fn execute(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<JobResult, ControlError>;

    fn cancel(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
        options: CancelOptions,
    ) -> Result<bool, ControlError>;

    /// `savepoint_path` of `None` or `""` is interpreted by the implementation.
    fn restart(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
        savepoint_path: Option<&str>,
    ) -> Result<JobResult, ControlError>;

    fn savepoint(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
        kind: SavePointType,
    ) -> Result<SavePointResult, ControlError>;

    fn explain(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<Explain, ControlError>;

    fn job_plan(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError>;

    fn stream_graph(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError>;

    fn export_sql(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<String, ControlError>;

    fn lineage(
        &self,
        ctx: &RequestContext,
        tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError>;
}
