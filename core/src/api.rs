//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `tutor_core::api` instead of reaching into internal modules.

pub use crate::broadcast::{Broadcaster, NoopBroadcaster, RecordingBroadcaster};
pub use crate::categorize::{categorize, hint_for};
pub use crate::classify::{classify, parse_diagnostic, Classification};
pub use crate::config::{
    apply_env_overrides, load_config, resolve_root, AppConfig, BridgeConfig, BridgeKind,
    LoggingConfig, ProgressConfig, RecordsConfig, ServerConfig, ToolchainConfig, ToolchainKind,
};
pub use crate::error::{CliError, ConfigError, RecordError, RunnerError};
pub use crate::model::{
    Category, Command, Diagnostic, Event, EventBody, FailureSignals, FailureSummary, Phase,
    Severity, StatusSnapshot,
};
pub use crate::progress::ProgressReporter;
pub use crate::record::{
    append_event, last_events, one_line_event, read_events, read_raw, read_snapshot, reset_log,
    write_snapshot, EventTail, RecordPaths,
};
pub use crate::runner::{
    module_cache_dir, supervise, RunContext, RunSpec, SuperviseOptions, ToolchainPlanner,
    MODULE_CACHE_DIR,
};
pub use crate::summary::build_summary;
