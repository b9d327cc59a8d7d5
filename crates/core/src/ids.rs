#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{kind} must be a positive integer (got {value})")]
    NotPositive { kind: &'static str, value: i64 },
    #[error("{kind} is out of range (got {value})")]
    OutOfRange { kind: &'static str, value: i64 },
}

macro_rules! numeric_id {
    ($name:ident, $kind:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i32);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub fn try_new(value: i64) -> Result<Self, IdError> {
                if value <= 0 {
                    return Err(IdError::NotPositive {
                        kind: Self::KIND,
                        value,
                    });
                }
                let value = i32::try_from(value).map_err(|_| IdError::OutOfRange {
                    kind: Self::KIND,
                    value,
                })?;
                Ok(Self(value))
            }

            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::try_new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                i64::from(value.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(TaskId, "task id");
numeric_id!(JobInstanceId, "job instance id");
numeric_id!(TenantId, "tenant id");
