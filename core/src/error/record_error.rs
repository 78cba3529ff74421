// core/src/error/record_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record path has no parent directory: {0}")]
    NoParent(String),

    #[error("record io error: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("record serialize error")]
    Serialize(#[source] serde_json::Error),
}

impl RecordError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        RecordError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
