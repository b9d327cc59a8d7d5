#![forbid(unsafe_code)]

use sc_orchestrator::ControlError;
use sc_orchestrator::audit::now_rfc3339;
use serde::Serialize;
use serde_json::Value;

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_FAILURE: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    QuerySuccess,
    ExecuteSuccess,
    FetchSuccess,
    ExecuteFailed,
    ValidationFailed,
    NotSupportedExplain,
    TenantNotResolved,
    NotFound,
    DeadlineExceeded,
    RequestCanceled,
    UnknownOperation,
    InternalError,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Status::QuerySuccess | Status::ExecuteSuccess | Status::FetchSuccess
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::QuerySuccess => "QUERY_SUCCESS",
            Status::ExecuteSuccess => "EXECUTE_SUCCESS",
            Status::FetchSuccess => "FETCH_SUCCESS",
            Status::ExecuteFailed => "EXECUTE_FAILED",
            Status::ValidationFailed => "VALIDATION_FAILED",
            Status::NotSupportedExplain => "NOT_SUPPORTED_EXPLAIN",
            Status::TenantNotResolved => "TENANT_NOT_RESOLVED",
            Status::NotFound => "NOT_FOUND",
            Status::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Status::RequestCanceled => "REQUEST_CANCELED",
            Status::UnknownOperation => "UNKNOWN_OPERATION",
            Status::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Status::QuerySuccess => "Query succeeded",
            Status::ExecuteSuccess => "Execute succeeded",
            Status::FetchSuccess => "fetched",
            Status::ExecuteFailed => "Execute failed",
            Status::ValidationFailed => "Validation failed",
            Status::NotSupportedExplain => "Explain is not supported for this statement",
            Status::TenantNotResolved => "Tenant could not be resolved",
            Status::NotFound => "Not found",
            Status::DeadlineExceeded => "Request deadline exceeded",
            Status::RequestCanceled => "Request canceled",
            Status::UnknownOperation => "Unknown operation",
            Status::InternalError => "Internal error",
        }
    }

    pub fn for_error(err: &ControlError) -> Self {
        match err {
            ControlError::Validation(_) => Status::ValidationFailed,
            ControlError::NotSupportedExplain(_) => Status::NotSupportedExplain,
            ControlError::TenantResolution { .. } => Status::TenantNotResolved,
            ControlError::NotFound { .. } => Status::NotFound,
            ControlError::DeadlineExceeded => Status::DeadlineExceeded,
            ControlError::Canceled => Status::RequestCanceled,
            ControlError::Upstream(_) => Status::ExecuteFailed,
            ControlError::Internal(_) => Status::InternalError,
        }
    }
}

/// Uniform reply wrapper for every operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub success: bool,
    pub status: Status,
    pub msg: String,
    pub data: Option<T>,
    pub time: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn succeed(data: T, status: Status) -> Self {
        Self {
            code: CODE_SUCCESS,
            success: true,
            status,
            msg: status.message().to_string(),
            data: Some(data),
            time: now_rfc3339(),
        }
    }

    pub fn failed(data: Option<T>, status: Status, msg: impl Into<String>) -> Self {
        Self {
            code: CODE_FAILURE,
            success: false,
            status,
            msg: msg.into(),
            data,
            time: now_rfc3339(),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|err| {
            Envelope::<Value>::failed(None, Status::InternalError, err.to_string()).into_value()
        })
    }
}

impl Envelope<Value> {
    pub fn from_error(err: &ControlError) -> Self {
        Self::failed(None, Status::for_error(err), err.to_string())
    }
}
