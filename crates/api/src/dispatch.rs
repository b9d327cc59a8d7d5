#![forbid(unsafe_code)]

use crate::envelope::{Envelope, Status};
use crate::registry::{OperationRegistry, OperationSpec};
use sc_orchestrator::audit::{AuditEvent, AuditOutcome, AuditSink, now_rfc3339, params_digest};
use sc_orchestrator::config::ControlConfig;
use sc_orchestrator::{ControlError, Orchestrator, RequestContext};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// What a handler hands back to the dispatcher.
pub(crate) enum Reply {
    Data(Value),
    /// The call went through but the job manager reported failure.
    Rejected { data: Value, message: String },
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ControlError> {
    serde_json::to_value(value).map_err(|err| ControlError::Internal(err.to_string()))
}

fn data<T: Serialize>(value: &T) -> Result<Reply, ControlError> {
    encode(value).map(Reply::Data)
}

/// Name-addressed control surface: JSON arguments in, serialized envelope out.
pub struct ControlApi {
    orchestrator: Orchestrator,
    audit: Arc<dyn AuditSink>,
    audit_enabled: bool,
}

impl ControlApi {
    pub fn new(orchestrator: Orchestrator, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            orchestrator,
            audit,
            audit_enabled: true,
        }
    }

    pub fn from_config(
        orchestrator: Orchestrator,
        config: &ControlConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            orchestrator: orchestrator.with_version(config.version.clone()),
            audit,
            audit_enabled: config.audit.enabled,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn operations(&self) -> impl Iterator<Item = &'static OperationSpec> {
        OperationRegistry::global().specs().iter()
    }

    pub fn dispatch(&self, ctx: &RequestContext, name: &str, args: &Value) -> Value {
        let Some(spec) = OperationRegistry::global().find(name) else {
            tracing::warn!(operation = name, "unknown operation");
            return Envelope::<Value>::failed(
                None,
                Status::UnknownOperation,
                format!("unknown operation: {name}"),
            )
            .into_value();
        };

        let started = Instant::now();
        let envelope = match (spec.handler)(self, ctx, args) {
            Ok(Reply::Data(data)) => Envelope::succeed(data, spec.kind.success_status()),
            Ok(Reply::Rejected { data, message }) => {
                Envelope::failed(Some(data), Status::ExecuteFailed, message)
            }
            Err(err) => {
                tracing::debug!(
                    operation = spec.name,
                    code = err.code(),
                    error = %err,
                    "operation failed"
                );
                Envelope::from_error(&err)
            }
        };

        if spec.audited && self.audit_enabled {
            self.record(spec, args, &envelope, started);
        }
        envelope.into_value()
    }

    fn record(
        &self,
        spec: &OperationSpec,
        args: &Value,
        envelope: &Envelope<Value>,
        started: Instant,
    ) {
        let outcome = if envelope.success {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure {
                code: envelope.status.as_str().to_string(),
                message: envelope.msg.clone(),
            }
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.audit.record(AuditEvent {
            operation: spec.name,
            title: spec.title,
            business_type: spec.business_type,
            target: spec
                .target_arg
                .and_then(|key| crate::args::target_id(args, key)),
            outcome,
            elapsed_ms,
            params_digest: params_digest(args),
            ts: now_rfc3339(),
        });
    }
}

pub(crate) mod handlers {
    use super::{ControlApi, Reply, data, encode};
    use crate::args::{self, Args};
    use sc_core::model::{JobResult, Task, TaskSubmission};
    use sc_orchestrator::{CancelOptions, ControlError, RequestContext};
    use serde_json::Value;

    /// Decoded descriptors carry a caller-claimed tenant; it must match the task owner.
    fn task_descriptor(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Task, ControlError> {
        let task: Task = args::descriptor(args::object(args)?, "task descriptor")?;
        api.orchestrator.verify_task_tenant(ctx, &task)?;
        Ok(task)
    }

    fn job_result(result: JobResult) -> Result<Reply, ControlError> {
        if result.success {
            return data(&result);
        }
        let message = result
            .error
            .clone()
            .unwrap_or_else(|| "job submission failed".to_string());
        Ok(Reply::Rejected {
            data: encode(&result)?,
            message,
        })
    }

    pub(crate) fn get_version(
        api: &ControlApi,
        ctx: &RequestContext,
        _args: &Value,
    ) -> Result<Reply, ControlError> {
        ctx.check()?;
        data(&api.orchestrator.version())
    }

    pub(crate) fn submit_task(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let submission: TaskSubmission =
            args::descriptor(args::object(args)?, "task submission")?;
        job_result(api.orchestrator.submit(ctx, &submission)?)
    }

    pub(crate) fn savepoint_by_code(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let a: &Args = args::object(args)?;
        let id = args::require_task_id(a, "taskId")?;
        let code = args::require_i32(a, "type")?;
        data(&api.orchestrator.savepoint_by_code(ctx, id, code)?)
    }

    pub(crate) fn cancel(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let a = args::object(args)?;
        let id = args::require_task_id(a, "id")?;
        let defaults = CancelOptions::default();
        let options = CancelOptions {
            with_savepoint: args::optional_bool(a, "withSavePoint", defaults.with_savepoint)?,
            force: args::optional_bool(a, "forceCancel", defaults.force)?,
        };
        data(&api.orchestrator.cancel(ctx, id, options)?)
    }

    /// Restart failures come back as data on a success envelope; only submit rejects.
    pub(crate) fn restart_task(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let a = args::object(args)?;
        let id = args::require_task_id(a, "id")?;
        let path = args::optional_nullable_string(a, "savePointPath")?;
        data(&api.orchestrator.restart(ctx, id, path.as_deref())?)
    }

    pub(crate) fn savepoint_by_name(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let a = args::object(args)?;
        let id = args::require_task_id(a, "taskId")?;
        let name = args::require_string(a, "savePointType")?;
        data(&api.orchestrator.savepoint_by_name(ctx, id, &name)?)
    }

    pub(crate) fn explain_sql(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let task = task_descriptor(api, ctx, args)?;
        data(&api.orchestrator.explain(ctx, &task)?)
    }

    pub(crate) fn get_job_plan(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let task = task_descriptor(api, ctx, args)?;
        Ok(Reply::Data(api.orchestrator.job_plan(ctx, &task)?))
    }

    pub(crate) fn get_stream_graph(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let task = task_descriptor(api, ctx, args)?;
        Ok(Reply::Data(api.orchestrator.stream_graph(ctx, &task)?))
    }

    pub(crate) fn get_job_instance(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let id = args::require_instance_id(args::object(args)?, "id")?;
        data(&api.orchestrator.job_instance(ctx, id)?)
    }

    pub(crate) fn get_job_instance_by_task_id(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let id = args::require_task_id(args::object(args)?, "id")?;
        data(&api.orchestrator.job_instance_by_task_id(ctx, id)?)
    }

    pub(crate) fn export_sql(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let id = args::require_task_id(args::object(args)?, "id")?;
        Ok(Reply::Data(Value::String(api.orchestrator.export_sql(ctx, id)?)))
    }

    pub(crate) fn get_task_lineage(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let id = args::require_task_id(args::object(args)?, "id")?;
        Ok(Reply::Data(api.orchestrator.task_lineage(ctx, id)?))
    }

    /// Always a fetch success; an execution failure is visible in the returned result.
    pub(crate) fn ad_hoc_execute(
        api: &ControlApi,
        ctx: &RequestContext,
        args: &Value,
    ) -> Result<Reply, ControlError> {
        let a = args::object(args)?;
        let id = args::require_task_id(a, "id")?;
        let params = args::parameter_map(a, "params")?;
        data(&api.orchestrator.ad_hoc_execute(ctx, id, &params)?)
    }
}
