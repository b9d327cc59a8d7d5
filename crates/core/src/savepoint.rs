#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Kind of savepoint operation requested from the job-management subsystem.
///
/// Both entry points (`from_code`, `from_name`) resolve to the same variant; neither
/// falls back to a default kind on unknown input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePointType {
    /// Take a savepoint and keep the job running.
    Trigger,
    /// Dispose a previously taken savepoint.
    Dispose,
    /// Take a savepoint and stop the job gracefully.
    Stop,
    /// Take a savepoint and cancel the job.
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SavePointTypeError {
    #[error("unknown savepoint type code: {0}")]
    UnknownCode(i32),
    #[error("unknown savepoint type name: {0:?}")]
    UnknownName(String),
}

impl SavePointType {
    pub const ALL: [SavePointType; 4] = [
        SavePointType::Trigger,
        SavePointType::Dispose,
        SavePointType::Stop,
        SavePointType::Cancel,
    ];

    pub fn code(self) -> i32 {
        match self {
            SavePointType::Trigger => 0,
            SavePointType::Dispose => 1,
            SavePointType::Stop => 2,
            SavePointType::Cancel => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SavePointType::Trigger => "trigger",
            SavePointType::Dispose => "dispose",
            SavePointType::Stop => "stop",
            SavePointType::Cancel => "cancel",
        }
    }

    pub fn from_code(code: i32) -> Result<Self, SavePointTypeError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or(SavePointTypeError::UnknownCode(code))
    }

    pub fn from_name(name: &str) -> Result<Self, SavePointTypeError> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SavePointTypeError::UnknownName(name.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePoint {
    pub kind: SavePointType,
    pub path: Option<String>,
}

/// Outcome of a savepoint trigger or a cancel-with-savepoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePointResult {
    pub kind: SavePointType,
    pub job_id: Option<String>,
    pub savepoints: Vec<SavePoint>,
    pub success: bool,
    pub error: Option<String>,
}

impl SavePointResult {
    pub fn latest_path(&self) -> Option<&str> {
        self.savepoints.iter().rev().find_map(|sp| sp.path.as_deref())
    }
}
