use std::path::{Path, PathBuf};

use crate::model::Command;

/// A fully resolved subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    /// Added to (not replacing) the inherited environment.
    pub env: Vec<(String, String)>,
}

impl RunSpec {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn args<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.env.push((k.into(), v.into()));
        self
    }

    pub fn has_env(&self, key: &str) -> bool {
        self.env.iter().any(|(k, _)| k == key)
    }
}

/// Turns a verb plus passthrough arguments into a concrete invocation.
pub trait ToolchainPlanner: Send + Sync {
    fn name(&self) -> &str;
    fn plan(&self, command: Command, work_dir: &Path, passthrough: &[String]) -> RunSpec;
}
