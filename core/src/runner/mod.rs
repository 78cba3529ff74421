mod context;
pub mod exit;
mod plan;
mod supervisor;
mod tee;

pub use context::{RunContext, SNAPSHOT_KIND};
pub use plan::{RunSpec, ToolchainPlanner};
pub use supervisor::{
    module_cache_dir, supervise, SuperviseOptions, MODULE_CACHE_DIR, MODULE_CACHE_ENV,
};
pub use tee::{LineTap, StreamKind};
