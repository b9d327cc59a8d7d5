#![forbid(unsafe_code)]

use sc_core::model::{ParameterMap, Task};
use sc_core::{bind, paginate};

/// Engine-side row materialization ceiling for ad-hoc runs.
///
/// Enforced independently of any `LIMIT` in the bound SQL; the two are not reconciled.
pub const AD_HOC_MAX_ROWS: u32 = 5000;

pub const LIMIT_KEY: &str = "limit";
pub const OFFSET_KEY: &str = "offset";

/// Derive the executable copy of `task` for an ad-hoc run.
///
/// Forces a single result-returning statement with the fixed row ceiling, then binds and
/// paginates the stored statement. `task` itself is not modified.
pub fn prepare(task: &Task, params: &ParameterMap) -> Task {
    let bound = bind(&task.statement, params);
    let statement = paginate(
        &bound,
        params.get(LIMIT_KEY).map(String::as_str),
        params.get(OFFSET_KEY).map(String::as_str),
    );
    Task {
        statement,
        use_result: true,
        statement_set: false,
        max_row_num: AD_HOC_MAX_ROWS,
        ..task.clone()
    }
}
