#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Runtime status of a job instance as reported by the job-management subsystem.
///
/// `Created → Submitted → Running → {Canceled, Finished, Failed}`, with
/// `Running → Restarting → Running` when a job is resumed from a savepoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Submitted,
    Running,
    Restarting,
    Canceled,
    Finished,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct JobStatusError(pub String);

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Created,
        JobStatus::Submitted,
        JobStatus::Running,
        JobStatus::Restarting,
        JobStatus::Canceled,
        JobStatus::Finished,
        JobStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Created => "CREATED",
            JobStatus::Submitted => "SUBMITTED",
            JobStatus::Running => "RUNNING",
            JobStatus::Restarting => "RESTARTING",
            JobStatus::Canceled => "CANCELED",
            JobStatus::Finished => "FINISHED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, JobStatusError> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| JobStatusError(raw.to_string()))
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Canceled | JobStatus::Finished | JobStatus::Failed
        )
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Created, Submitted) => true,
            (Submitted, Running | Failed | Canceled) => true,
            (Running, Restarting | Canceled | Finished | Failed) => true,
            (Restarting, Running | Failed | Canceled) => true,
            _ => false,
        }
    }
}
