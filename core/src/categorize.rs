//! Exit code + accumulated signals -> coarse failure category and hint.

use crate::model::{Category, Command, Diagnostic, FailureSignals, Phase};

const SOURCE_EXTENSIONS: &[&str] = &["swift", "c", "h", "m", "mm", "cpp", "cc", "cxx", "hpp"];

/// First matching rule wins; order encodes specificity.
pub fn categorize(
    command: Command,
    phase: Phase,
    exit_code: i32,
    signals: &FailureSignals,
    diagnostics: &[Diagnostic],
) -> (Category, &'static str) {
    let category = if exit_code == 0 {
        Category::Success
    } else if signals.saw_network_error || (phase == Phase::Fetching && !diagnostics.is_empty()) {
        Category::DependencyNetwork
    } else if signals.saw_resolve_error || phase == Phase::Resolving {
        Category::ResolveGraph
    } else if signals.saw_test_failure || (command == Command::Test && phase == Phase::Testing) {
        Category::Test
    } else if signals.saw_linker_error || phase == Phase::Linking {
        Category::Link
    } else if phase == Phase::Compiling || diagnostics.iter().any(is_source_diagnostic) {
        Category::Compile
    } else if command == Command::Run {
        Category::Runtime
    } else {
        Category::Unknown
    };
    (category, hint_for(category))
}

pub fn hint_for(category: Category) -> &'static str {
    match category {
        Category::Success => "",
        Category::DependencyNetwork => {
            "Check network access to package hosts, then retry `swift package resolve`."
        }
        Category::ResolveGraph => {
            "Dependency versions conflict. Inspect Package.swift requirements or delete Package.resolved and resolve again."
        }
        Category::Test => "One or more tests failed. Re-run the failing suite with `swift test --filter <name>`.",
        Category::Link => {
            "Linking failed. Check for missing products, duplicate symbols or unlinked system libraries."
        }
        Category::Compile => "Fix the first reported compiler error; later errors are often follow-ons.",
        Category::Runtime => "The program exited with an error. Inspect its output above for the cause.",
        Category::Unknown => "Inspect the event log (`tutor tail --errors-only`) for details.",
    }
}

fn is_source_diagnostic(d: &Diagnostic) -> bool {
    d.extension()
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
