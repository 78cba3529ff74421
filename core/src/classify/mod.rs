//! Pure line classification: phase transitions, diagnostics and failure signals.

mod diagnostic;
mod markers;

pub use diagnostic::parse_diagnostic;

use crate::model::{Diagnostic, FailureSignals, Phase, Severity};

use markers::MARKERS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub phase: Phase,
    pub diagnostic: Option<(Severity, Diagnostic)>,
    pub status_text: Option<String>,
}

impl Classification {
    fn unchanged(phase: Phase) -> Self {
        Self {
            phase,
            diagnostic: None,
            status_text: None,
        }
    }
}

/// Classify one output line against the phase it arrived in.
///
/// Unmatched and blank lines return `previous` with nothing attached.
/// Diagnostic extraction runs independently of the marker table.
pub fn classify(line: &str, previous: Phase) -> Classification {
    let line = line.trim();
    if line.is_empty() {
        return Classification::unchanged(previous);
    }

    let lower = line.to_ascii_lowercase();
    let mut out = Classification::unchanged(previous);
    if let Some(m) = MARKERS.iter().find(|m| m.matcher.is_match(line, &lower)) {
        out.phase = m.phase;
        out.status_text = Some(m.label.render(line));
    }
    out.diagnostic = parse_diagnostic(line);
    out
}

/// Failure signals carried by a message (case-insensitive substring scan).
pub fn scan_signals(message: &str) -> FailureSignals {
    let m = message.to_ascii_lowercase();
    FailureSignals {
        saw_test_failure: false,
        saw_linker_error: m.contains("linker command failed") || m.contains("undefined symbols"),
        saw_resolve_error: m.contains("resolve"),
        saw_network_error: m.contains("timed out")
            || m.contains("network")
            || m.contains("failed to connect"),
    }
}

/// True for XCTest / swift-testing "suite failed" lines.
pub fn is_test_failure(line: &str) -> bool {
    if line.contains("Test Suite") && line.contains("failed") {
        return true;
    }
    let lower = line.to_ascii_lowercase();
    lower.contains("test run with") && lower.contains("failed")
}

/// Toolchain errors without a location, e.g. `error: linker command failed`.
pub fn is_bare_error(line: &str) -> bool {
    line.trim_start().starts_with("error:")
}
