pub mod cli_error;
pub mod config_error;
pub mod record_error;
pub mod runner_error;

pub use cli_error::CliError;
pub use config_error::ConfigError;
pub use record_error::RecordError;
pub use runner_error::RunnerError;
