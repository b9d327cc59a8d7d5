#![forbid(unsafe_code)]

use sc_core::ids::{JobInstanceId, TaskId};
use sc_core::model::ParameterMap;
use sc_orchestrator::ControlError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub(crate) type Args = Map<String, Value>;

fn invalid(message: String) -> ControlError {
    ControlError::Validation(message)
}

pub(crate) fn object(args: &Value) -> Result<&Args, ControlError> {
    match args {
        Value::Object(map) => Ok(map),
        _ => Err(invalid("arguments must be an object".to_string())),
    }
}

pub(crate) fn require_i64(args: &Args, key: &str) -> Result<i64, ControlError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(invalid(format!("{key} is required"))),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| invalid(format!("{key} must be an integer"))),
    }
}

pub(crate) fn require_i32(args: &Args, key: &str) -> Result<i32, ControlError> {
    let raw = require_i64(args, key)?;
    i32::try_from(raw).map_err(|_| invalid(format!("{key} is out of range: {raw}")))
}

pub(crate) fn require_task_id(args: &Args, key: &str) -> Result<TaskId, ControlError> {
    Ok(TaskId::try_new(require_i64(args, key)?)?)
}

pub(crate) fn require_instance_id(args: &Args, key: &str) -> Result<JobInstanceId, ControlError> {
    Ok(JobInstanceId::try_new(require_i64(args, key)?)?)
}

pub(crate) fn require_string(args: &Args, key: &str) -> Result<String, ControlError> {
    let Some(v) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(invalid(format!("{key} is required")));
    };
    Ok(v.to_string())
}

/// `Some("")` and `None` stay distinct; the job manager decides what an empty path means.
pub(crate) fn optional_nullable_string(
    args: &Args,
    key: &str,
) -> Result<Option<String>, ControlError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.to_string())),
        Some(_) => Err(invalid(format!("{key} must be a string or null"))),
    }
}

pub(crate) fn optional_bool(args: &Args, key: &str, default: bool) -> Result<bool, ControlError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(v)) => Ok(*v),
        Some(_) => Err(invalid(format!("{key} must be a boolean"))),
    }
}

/// Decode the whole argument object as a typed descriptor (task, submission).
pub(crate) fn descriptor<T: DeserializeOwned>(args: &Args, what: &str) -> Result<T, ControlError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|err| invalid(format!("invalid {what}: {err}")))
}

/// Scalar values are stringified; nulls are dropped so the binder renders them as `null`.
pub(crate) fn parameter_map(args: &Args, key: &str) -> Result<ParameterMap, ControlError> {
    let Some(value) = args.get(key) else {
        return Ok(ParameterMap::new());
    };
    let entries = match value {
        Value::Null => return Ok(ParameterMap::new()),
        Value::Object(entries) => entries,
        _ => return Err(invalid(format!("{key} must be an object"))),
    };
    let mut out = ParameterMap::new();
    for (name, value) in entries {
        let rendered = match value {
            Value::Null => continue,
            Value::String(v) => v.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(invalid(format!("{key}.{name} must be a scalar")));
            }
        };
        out.insert(name.clone(), rendered);
    }
    Ok(out)
}

/// Value reported as the audit target, when the argument holds an integer id.
pub(crate) fn target_id(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(Value::as_i64)
}
