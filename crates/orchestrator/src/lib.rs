#![forbid(unsafe_code)]

pub mod ad_hoc;
pub mod audit;
pub mod config;
pub mod context;
pub mod error;
mod orchestrator;
pub mod ports;

pub use context::{CancelFlag, RequestContext, TenantContext};
pub use error::ControlError;
pub use orchestrator::Orchestrator;
pub use ports::{
    CancelOptions, Explain, JobInstanceTracker, JobManager, StatementExplain, TaskRegistry,
};
