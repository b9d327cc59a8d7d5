#![forbid(unsafe_code)]

pub mod ids;
pub mod model;
pub mod pagination;
pub mod savepoint;
pub mod status;
pub mod template;

pub use pagination::paginate;
pub use template::bind;
