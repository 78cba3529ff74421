use std::path::Path;

use tutor_core::api::{Command, RunSpec, ToolchainPlanner};

use super::resolve_program;

/// Runs `program <passthrough...>` as-is; the verb only labels the records.
pub struct GenericPlanner {
    program: String,
}

impl GenericPlanner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ToolchainPlanner for GenericPlanner {
    fn name(&self) -> &str {
        "generic"
    }

    fn plan(&self, _command: Command, work_dir: &Path, passthrough: &[String]) -> RunSpec {
        RunSpec::new(resolve_program(&self.program), work_dir).args(passthrough.iter().cloned())
    }
}
