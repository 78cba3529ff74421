use std::path::Path;

use tutor_core::api::{Command, RunSpec, ToolchainPlanner, MODULE_CACHE_DIR};

use super::resolve_program;

pub const SWIFT_MODULE_CACHE_DIR: &str = ".swift-module-cache";

/// `swift build|run|test` with sandbox-free, project-local module caches.
pub struct SwiftPmPlanner {
    program: String,
    module_cache: bool,
}

impl SwiftPmPlanner {
    pub fn new(program: impl Into<String>, module_cache: bool) -> Self {
        Self {
            program: program.into(),
            module_cache,
        }
    }
}

impl ToolchainPlanner for SwiftPmPlanner {
    fn name(&self) -> &str {
        "swiftpm"
    }

    fn plan(&self, command: Command, work_dir: &Path, passthrough: &[String]) -> RunSpec {
        let mut spec = RunSpec::new(resolve_program(&self.program), work_dir).arg(command.as_str());
        if self.module_cache {
            let clang_cache = work_dir.join(MODULE_CACHE_DIR);
            let swift_cache = work_dir.join(SWIFT_MODULE_CACHE_DIR);
            spec = spec
                .arg("--disable-sandbox")
                .arg("-Xcc")
                .arg(format!("-fmodules-cache-path={}", clang_cache.display()))
                .arg("-Xswiftc")
                .arg("-module-cache-path")
                .arg("-Xswiftc")
                .arg(swift_cache.display().to_string());
        }
        let spec = spec.args(passthrough.iter().cloned());
        tracing::debug!(target: "tutor.plugins", planner = "swiftpm", args = ?spec.args, "planned toolchain run");
        spec
    }
}
