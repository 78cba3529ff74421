use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use super::phase::{Command, Phase};

/// Current, rewritable view of one invocation (`status.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub title: String,
    pub command: Command,
    pub phase: Phase,
    #[serde(default)]
    pub status_text: String,
    #[serde(default, alias = "elapsed")]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub timestamp: String,

    #[serde(rename = "final", default, skip_serializing_if = "is_false")]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl StatusSnapshot {
    pub fn new(title: impl Into<String>, command: Command) -> Self {
        Self {
            title: title.into(),
            command,
            phase: Phase::Starting,
            status_text: String::new(),
            elapsed_seconds: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            is_final: false,
            exit_code: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
