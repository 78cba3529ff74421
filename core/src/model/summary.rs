use std::fmt;

use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use super::phase::{Command, Phase};

/// Coarse root-cause bucket for a finished invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "DEPENDENCY_NETWORK")]
    DependencyNetwork,
    #[serde(rename = "RESOLVE_GRAPH")]
    ResolveGraph,
    #[serde(rename = "TEST")]
    Test,
    #[serde(rename = "LINK")]
    Link,
    #[serde(rename = "COMPILE")]
    Compile,
    #[serde(rename = "RUNTIME")]
    Runtime,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::DependencyNetwork => "DEPENDENCY_NETWORK",
            Category::ResolveGraph => "RESOLVE_GRAPH",
            Category::Test => "TEST",
            Category::Link => "LINK",
            Category::Compile => "COMPILE",
            Category::Runtime => "RUNTIME",
            Category::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean failure signals accumulated while lines are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSignals {
    pub saw_test_failure: bool,
    pub saw_linker_error: bool,
    pub saw_resolve_error: bool,
    pub saw_network_error: bool,
}

impl FailureSignals {
    pub fn merge(&mut self, other: FailureSignals) {
        self.saw_test_failure |= other.saw_test_failure;
        self.saw_linker_error |= other.saw_linker_error;
        self.saw_resolve_error |= other.saw_resolve_error;
        self.saw_network_error |= other.saw_network_error;
    }
}

/// Derived report; never stored as its own file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSummary {
    #[serde(default)]
    pub title: String,
    pub command: Command,
    pub phase: Phase,
    pub exit_code: i32,
    pub category: Category,
    pub hint: String,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}
