#![forbid(unsafe_code)]
#![allow(dead_code)]

use sc_core::ids::{JobInstanceId, TaskId, TenantId};
use sc_core::model::{JobInstance, JobResult, Task, TaskSubmission};
use sc_core::savepoint::{SavePoint, SavePointResult, SavePointType};
use sc_core::status::JobStatus;
use sc_orchestrator::{
    CancelOptions, ControlError, Explain, JobInstanceTracker, JobManager, Orchestrator,
    RequestContext, StatementExplain, TaskRegistry, TenantContext,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Ordered record of every collaborator call, shared by all fakes of one fixture.
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("call log").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log").clone()
    }
}

pub fn task_id(raw: i64) -> TaskId {
    TaskId::try_new(raw).expect("task id")
}

pub fn tenant_id(raw: i64) -> TenantId {
    TenantId::try_new(raw).expect("tenant id")
}

pub fn instance_id(raw: i64) -> JobInstanceId {
    JobInstanceId::try_new(raw).expect("job instance id")
}

pub fn task(id: i64, tenant: i64, statement: &str) -> Task {
    Task {
        id: task_id(id),
        tenant_id: tenant_id(tenant),
        name: format!("task-{id}"),
        dialect: "FlinkSql".to_string(),
        statement: statement.to_string(),
        use_result: false,
        statement_set: true,
        max_row_num: 100,
        lineage_refs: vec!["orders".to_string(), "orders_daily".to_string()],
    }
}

pub struct FakeRegistry {
    tasks: Vec<Task>,
    log: Arc<CallLog>,
}

impl TaskRegistry for FakeRegistry {
    fn resolve_tenant_by_task_id(
        &self,
        _ctx: &RequestContext,
        id: TaskId,
    ) -> Result<TenantContext, ControlError> {
        self.log.push(format!("registry.resolve_tenant:{id}"));
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(TenantContext::of_task)
            .ok_or(ControlError::TenantResolution {
                kind: TaskId::KIND,
                id: id.into(),
            })
    }

    fn get_task(
        &self,
        _ctx: &RequestContext,
        tenant: &TenantContext,
        id: TaskId,
    ) -> Result<Task, ControlError> {
        self.log.push(format!("registry.get_task:{id}"));
        self.tasks
            .iter()
            .find(|t| t.id == id && t.tenant_id == tenant.tenant_id())
            .cloned()
            .ok_or(ControlError::NotFound {
                kind: TaskId::KIND,
                id: id.into(),
            })
    }
}

pub struct FakeTracker {
    instances: Vec<JobInstance>,
    log: Arc<CallLog>,
}

impl JobInstanceTracker for FakeTracker {
    fn resolve_tenant_by_job_instance_id(
        &self,
        _ctx: &RequestContext,
        id: JobInstanceId,
    ) -> Result<TenantContext, ControlError> {
        self.log.push(format!("tracker.resolve_tenant:{id}"));
        self.instances
            .iter()
            .find(|i| i.id == id)
            .map(|i| TenantContext::new(i.tenant_id))
            .ok_or(ControlError::TenantResolution {
                kind: JobInstanceId::KIND,
                id: id.into(),
            })
    }

    fn get_by_id(
        &self,
        _ctx: &RequestContext,
        tenant: &TenantContext,
        id: JobInstanceId,
    ) -> Result<JobInstance, ControlError> {
        self.log.push(format!("tracker.get_by_id:{id}"));
        self.instances
            .iter()
            .find(|i| i.id == id && i.tenant_id == tenant.tenant_id())
            .cloned()
            .ok_or(ControlError::NotFound {
                kind: JobInstanceId::KIND,
                id: id.into(),
            })
    }

    fn get_by_task_id(
        &self,
        _ctx: &RequestContext,
        tenant: &TenantContext,
        task_id: TaskId,
    ) -> Result<JobInstance, ControlError> {
        self.log.push(format!("tracker.get_by_task_id:{task_id}"));
        self.instances
            .iter()
            .filter(|i| i.task_id == task_id && i.tenant_id == tenant.tenant_id())
            .max_by_key(|i| i.id)
            .cloned()
            .ok_or(ControlError::NotFound {
                kind: TaskId::KIND,
                id: task_id.into(),
            })
    }
}

#[derive(Default)]
pub struct FakeJobManager {
    log: Arc<CallLog>,
    /// When set, every dispatching call fails with `ControlError::Upstream(message)`.
    pub fail_with: Mutex<Option<String>>,
    /// When set, execute/submit/restart answer with an unsuccessful `JobResult`.
    pub report_failure: Mutex<Option<String>>,
    pub explain_unsupported: Mutex<Option<String>>,
    pub executed: Mutex<Vec<Task>>,
    pub submissions: Mutex<Vec<TaskSubmission>>,
    pub cancels: Mutex<Vec<CancelOptions>>,
    pub restarts: Mutex<Vec<Option<String>>>,
    pub savepoints: Mutex<Vec<SavePointType>>,
    pub deadlines: Mutex<Vec<Option<Instant>>>,
}

impl FakeJobManager {
    fn enter(&self, ctx: &RequestContext, op: &str, task: &Task) -> Result<(), ControlError> {
        self.log.push(format!("jobs.{op}:{}", task.id));
        self.deadlines.lock().expect("deadlines").push(ctx.deadline());
        ctx.check()?;
        if let Some(message) = self.fail_with.lock().expect("fail_with").clone() {
            return Err(ControlError::upstream(message));
        }
        Ok(())
    }

    fn run_result(&self, task: &Task) -> JobResult {
        if let Some(error) = self.report_failure.lock().expect("report_failure").clone() {
            return JobResult::failed(error);
        }
        let mut result = JobResult::accepted(
            instance_id(i64::from(task.id.get()) + 1000),
            Some(format!("job-{}", task.id)),
        );
        result.status = Some(JobStatus::Running);
        result
    }
}

impl JobManager for FakeJobManager {
    fn submit(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
        submission: &TaskSubmission,
    ) -> Result<JobResult, ControlError> {
        self.enter(ctx, "submit", task)?;
        self.submissions.lock().expect("submissions").push(submission.clone());
        Ok(self.run_result(task))
    }

    fn execute(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<JobResult, ControlError> {
        self.enter(ctx, "execute", task)?;
        self.executed.lock().expect("executed").push(task.clone());
        let mut result = self.run_result(task);
        if result.success {
            result.status = Some(JobStatus::Finished);
            result.result = Some(json!({"rows": [{"n": 1}], "rowCount": 1}));
        }
        Ok(result)
    }

    fn cancel(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
        options: CancelOptions,
    ) -> Result<bool, ControlError> {
        self.enter(ctx, "cancel", task)?;
        self.cancels.lock().expect("cancels").push(options);
        Ok(true)
    }

    fn restart(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
        savepoint_path: Option<&str>,
    ) -> Result<JobResult, ControlError> {
        self.enter(ctx, "restart", task)?;
        self.restarts
            .lock()
            .expect("restarts")
            .push(savepoint_path.map(str::to_string));
        Ok(self.run_result(task))
    }

    fn savepoint(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
        kind: SavePointType,
    ) -> Result<SavePointResult, ControlError> {
        self.enter(ctx, "savepoint", task)?;
        self.savepoints.lock().expect("savepoints").push(kind);
        Ok(SavePointResult {
            kind,
            job_id: Some(format!("job-{}", task.id)),
            savepoints: vec![SavePoint {
                kind,
                path: Some(format!("s3://savepoints/{}/sp-1", task.id)),
            }],
            success: true,
            error: None,
        })
    }

    fn explain(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<Explain, ControlError> {
        self.enter(ctx, "explain", task)?;
        if let Some(reason) = self.explain_unsupported.lock().expect("explain").clone() {
            return Ok(Explain::NotSupported(reason));
        }
        let statements = task
            .statement
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(index, sql)| StatementExplain {
                index: index + 1,
                statement_type: sql
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_ascii_uppercase(),
                sql: sql.to_string(),
                explain: Some(format!("== Plan ==\n{sql}")),
                parse_ok: true,
                explain_ok: true,
                error: None,
            })
            .collect();
        Ok(Explain::Ok(statements))
    }

    fn job_plan(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError> {
        self.enter(ctx, "job_plan", task)?;
        Ok(json!({"jid": format!("plan-{}", task.id), "nodes": [{"id": 1}]}))
    }

    fn stream_graph(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError> {
        self.enter(ctx, "stream_graph", task)?;
        Ok(json!({"nodes": [{"id": 1, "type": "Source"}, {"id": 2, "type": "Sink"}]}))
    }

    fn export_sql(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<String, ControlError> {
        self.enter(ctx, "export_sql", task)?;
        Ok(format!("-- {}\n{}", task.name, task.statement))
    }

    fn lineage(
        &self,
        ctx: &RequestContext,
        _tenant: &TenantContext,
        task: &Task,
    ) -> Result<Value, ControlError> {
        self.enter(ctx, "lineage", task)?;
        Ok(json!({
            "tables": task.lineage_refs,
            "relations": [{"src": task.lineage_refs.first(), "tgt": task.lineage_refs.last()}]
        }))
    }
}

pub struct Fixture {
    pub log: Arc<CallLog>,
    pub jobs: Arc<FakeJobManager>,
    pub orchestrator: Orchestrator,
}

impl Fixture {
    pub fn new(tasks: Vec<Task>, instances: Vec<JobInstance>) -> Self {
        let log = Arc::new(CallLog::default());
        let registry = Arc::new(FakeRegistry {
            tasks,
            log: Arc::clone(&log),
        });
        let tracker = Arc::new(FakeTracker {
            instances,
            log: Arc::clone(&log),
        });
        let jobs = Arc::new(FakeJobManager {
            log: Arc::clone(&log),
            ..FakeJobManager::default()
        });
        let orchestrator = Orchestrator::new(registry, tracker, jobs.clone());
        Self {
            log,
            jobs,
            orchestrator,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            vec![
                task(1, 10, "INSERT INTO sink SELECT * FROM orders"),
                task(2, 20, "SELECT * FROM t WHERE d=#{date} AND name=${name}"),
            ],
            vec![
                JobInstance {
                    id: instance_id(501),
                    task_id: task_id(1),
                    tenant_id: tenant_id(10),
                    status: JobStatus::Finished,
                    job_id: Some("job-1-a".to_string()),
                    error: None,
                },
                JobInstance {
                    id: instance_id(502),
                    task_id: task_id(1),
                    tenant_id: tenant_id(10),
                    status: JobStatus::Running,
                    job_id: Some("job-1-b".to_string()),
                    error: None,
                },
            ],
        )
    }
}
