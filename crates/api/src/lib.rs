#![forbid(unsafe_code)]

mod args;
pub mod dispatch;
pub mod envelope;
pub mod registry;

pub use dispatch::ControlApi;
pub use envelope::{Envelope, Status};
pub use registry::{OperationKind, OperationRegistry, OperationSpec};
