#![forbid(unsafe_code)]

use crate::ad_hoc;
use crate::context::{RequestContext, TenantContext};
use crate::error::ControlError;
use crate::ports::{
    CancelOptions, Explain, JobInstanceTracker, JobManager, StatementExplain, TaskRegistry,
};
use sc_core::ids::{JobInstanceId, TaskId};
use sc_core::model::{JobInstance, JobResult, ParameterMap, Task, TaskSubmission};
use sc_core::savepoint::{SavePointResult, SavePointType};
use serde_json::Value;
use std::sync::Arc;

/// Synchronous facade over the job-management subsystem.
///
/// Every entry point checks the request context first. Entry points taking a bare id then
/// resolve the tenant for that id before touching anything else; entry points taking a
/// loaded [`Task`] use the task's own tenant.
pub struct Orchestrator {
    tasks: Arc<dyn TaskRegistry>,
    instances: Arc<dyn JobInstanceTracker>,
    jobs: Arc<dyn JobManager>,
    version: String,
}

impl Orchestrator {
    pub fn new(
        tasks: Arc<dyn TaskRegistry>,
        instances: Arc<dyn JobInstanceTracker>,
        jobs: Arc<dyn JobManager>,
    ) -> Self {
        Self {
            tasks,
            instances,
            jobs,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn submit(
        &self,
        ctx: &RequestContext,
        submission: &TaskSubmission,
    ) -> Result<JobResult, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, submission.id)?;
        tracing::debug!(task_id = %task.id, "submitting task");
        let outcome = self.jobs.submit(ctx, &tenant, &task, submission);
        fold_into_result("submit", task.id, outcome)
    }

    pub fn cancel(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        options: CancelOptions,
    ) -> Result<bool, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, id)?;
        tracing::debug!(
            task_id = %id,
            with_savepoint = options.with_savepoint,
            force = options.force,
            "canceling task job"
        );
        self.jobs.cancel(ctx, &tenant, &task, options)
    }

    pub fn restart(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        savepoint_path: Option<&str>,
    ) -> Result<JobResult, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, id)?;
        tracing::debug!(task_id = %id, savepoint_path = ?savepoint_path, "restarting task");
        let outcome = self.jobs.restart(ctx, &tenant, &task, savepoint_path);
        fold_into_result("restart", id, outcome)
    }

    pub fn savepoint(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        kind: SavePointType,
    ) -> Result<SavePointResult, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, id)?;
        tracing::debug!(task_id = %id, kind = kind.as_str(), "triggering savepoint");
        self.jobs.savepoint(ctx, &tenant, &task, kind)
    }

    pub fn savepoint_by_code(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        code: i32,
    ) -> Result<SavePointResult, ControlError> {
        let kind = SavePointType::from_code(code)?;
        self.savepoint(ctx, id, kind)
    }

    pub fn savepoint_by_name(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        name: &str,
    ) -> Result<SavePointResult, ControlError> {
        let kind = SavePointType::from_name(name)?;
        self.savepoint(ctx, id, kind)
    }

    /// Resolve the tenant owning `task.id` and require the descriptor to claim that tenant.
    ///
    /// Boundaries that decode a task from request input call this before passing it on to
    /// the task-object operations (`explain`, `job_plan`, `stream_graph`).
    pub fn verify_task_tenant(
        &self,
        ctx: &RequestContext,
        task: &Task,
    ) -> Result<TenantContext, ControlError> {
        ctx.check()?;
        let tenant = self.tasks.resolve_tenant_by_task_id(ctx, task.id)?;
        if tenant.tenant_id() != task.tenant_id {
            tracing::warn!(
                task_id = %task.id,
                claimed_tenant = %task.tenant_id,
                "task descriptor names a foreign tenant"
            );
            return Err(ControlError::TenantResolution {
                kind: TaskId::KIND,
                id: task.id.into(),
            });
        }
        Ok(tenant)
    }

    pub fn explain(
        &self,
        ctx: &RequestContext,
        task: &Task,
    ) -> Result<Vec<StatementExplain>, ControlError> {
        ctx.check()?;
        match self.jobs.explain(ctx, &TenantContext::of_task(task), task)? {
            Explain::Ok(statements) => Ok(statements),
            Explain::NotSupported(reason) => Err(ControlError::NotSupportedExplain(reason)),
        }
    }

    pub fn job_plan(&self, ctx: &RequestContext, task: &Task) -> Result<Value, ControlError> {
        ctx.check()?;
        self.jobs.job_plan(ctx, &TenantContext::of_task(task), task)
    }

    pub fn stream_graph(&self, ctx: &RequestContext, task: &Task) -> Result<Value, ControlError> {
        ctx.check()?;
        self.jobs.stream_graph(ctx, &TenantContext::of_task(task), task)
    }

    pub fn job_instance(
        &self,
        ctx: &RequestContext,
        id: JobInstanceId,
    ) -> Result<JobInstance, ControlError> {
        ctx.check()?;
        let tenant = self.instances.resolve_tenant_by_job_instance_id(ctx, id)?;
        self.instances.get_by_id(ctx, &tenant, id)
    }

    pub fn job_instance_by_task_id(
        &self,
        ctx: &RequestContext,
        id: TaskId,
    ) -> Result<JobInstance, ControlError> {
        ctx.check()?;
        let tenant = self.tasks.resolve_tenant_by_task_id(ctx, id)?;
        self.instances.get_by_task_id(ctx, &tenant, id)
    }

    pub fn export_sql(&self, ctx: &RequestContext, id: TaskId) -> Result<String, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, id)?;
        self.jobs.export_sql(ctx, &tenant, &task)
    }

    pub fn task_lineage(&self, ctx: &RequestContext, id: TaskId) -> Result<Value, ControlError> {
        let (tenant, task) = self.scoped_task(ctx, id)?;
        self.jobs.lineage(ctx, &tenant, &task)
    }

    /// Bind, paginate and synchronously run the stored statement of task `id`.
    pub fn ad_hoc_execute(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        params: &ParameterMap,
    ) -> Result<JobResult, ControlError> {
        let (tenant, stored) = self.scoped_task(ctx, id)?;
        let task = ad_hoc::prepare(&stored, params);
        tracing::debug!(
            task_id = %id,
            max_rows = task.max_row_num,
            params = params.len(),
            "executing ad-hoc query"
        );
        let outcome = self.jobs.execute(ctx, &tenant, &task);
        let result = fold_into_result("ad_hoc_execute", id, outcome)?;
        if result.statement.is_some() {
            return Ok(result);
        }
        Ok(result.with_statement(task.statement))
    }

    fn scoped_task(
        &self,
        ctx: &RequestContext,
        id: TaskId,
    ) -> Result<(TenantContext, Task), ControlError> {
        ctx.check()?;
        let tenant = self.tasks.resolve_tenant_by_task_id(ctx, id)?;
        let task = self.tasks.get_task(ctx, &tenant, id)?;
        Ok((tenant, task))
    }
}

fn fold_into_result(
    op: &'static str,
    task_id: TaskId,
    outcome: Result<JobResult, ControlError>,
) -> Result<JobResult, ControlError> {
    match outcome {
        Ok(result) => {
            if !result.success {
                tracing::warn!(
                    op,
                    task_id = %task_id,
                    error = result.error.as_deref().unwrap_or(""),
                    "job manager reported failure"
                );
            }
            Ok(result)
        }
        Err(err) if err.is_context() => Err(err),
        Err(err) => {
            tracing::warn!(op, task_id = %task_id, error = %err, "job manager call failed");
            Ok(JobResult::failed(err.to_string()))
        }
    }
}
