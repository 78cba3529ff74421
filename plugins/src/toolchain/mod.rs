pub mod generic;
pub mod swiftpm;

pub use generic::GenericPlanner;
pub use swiftpm::SwiftPmPlanner;

/// Absolute path of `program` on `PATH`, or the name unchanged.
pub(crate) fn resolve_program(program: &str) -> String {
    match which::which(program) {
        Ok(p) => p.display().to_string(),
        Err(_) => {
            tracing::warn!(target: "tutor.plugins", program = %program, "toolchain program not found on PATH");
            program.to_string()
        }
    }
}
