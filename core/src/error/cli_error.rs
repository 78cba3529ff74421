// core/src/error/cli_error.rs
use thiserror::Error;

use super::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("serve error: {0}")]
    Serve(String),

    #[error("{0}")]
    Command(String),
}
