#![forbid(unsafe_code)]

use sc_core::ids::IdError;
use sc_core::savepoint::SavePointTypeError;

/// Failure signalled outside of a `JobResult`.
///
/// Downstream execution failures of submit/restart/ad-hoc are folded into the returned
/// `JobResult` by the orchestrator; everything here is a precondition or context failure.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("explain not supported: {0}")]
    NotSupportedExplain(String),
    #[error("tenant could not be resolved for {kind} {id}")]
    TenantResolution { kind: &'static str, id: i64 },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error("request canceled")]
    Canceled,
    #[error("job manager: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NotSupportedExplain(_) => "NOT_SUPPORTED_EXPLAIN",
            Self::TenantResolution { .. } => "TENANT_RESOLUTION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Canceled => "CANCELED",
            Self::Upstream(_) => "UPSTREAM",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Context failures always propagate, even from paths that fold errors into results.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Canceled)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}

impl From<SavePointTypeError> for ControlError {
    fn from(value: SavePointTypeError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<IdError> for ControlError {
    fn from(value: IdError) -> Self {
        Self::Validation(value.to_string())
    }
}
