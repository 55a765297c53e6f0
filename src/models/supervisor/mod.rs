pub mod types;
pub mod queries;
pub mod workload;

pub use types::*;
pub use queries::*;
