use std::fmt;

use serde::{Deserialize, Serialize};

/// Build-lifecycle phase of one toolchain invocation.
///
/// The vocabulary is fixed. `Compiling` is re-entrant: every compiled module
/// visits it again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Starting,
    Fetching,
    Updating,
    Resolving,
    Preparing,
    Compiling,
    Linking,
    Testing,
    Running,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::Fetching => "fetching",
            Phase::Updating => "updating",
            Phase::Resolving => "resolving",
            Phase::Preparing => "preparing",
            Phase::Compiling => "compiling",
            Phase::Linking => "linking",
            Phase::Testing => "testing",
            Phase::Running => "running",
            Phase::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toolchain verb being supervised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    #[default]
    Build,
    Run,
    Test,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Run => "run",
            Command::Test => "test",
        }
    }

    /// Human title used for the status snapshot when none is given.
    pub fn default_title(&self) -> &'static str {
        match self {
            Command::Build => "Building",
            Command::Run => "Running",
            Command::Test => "Testing",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_lowercase() {
        let s = serde_json::to_string(&Phase::Compiling).unwrap();
        assert_eq!(s, "\"compiling\"");
        let p: Phase = serde_json::from_str("\"resolving\"").unwrap();
        assert_eq!(p, Phase::Resolving);
    }

    #[test]
    fn command_display_matches_wire_name() {
        assert_eq!(Command::Test.to_string(), "test");
        assert_eq!(Command::Run.default_title(), "Running");
    }
}
