//! Failure Summary derived from the on-disk records.

use std::path::Path;

use crate::categorize::categorize;
use crate::classify::{is_bare_error, is_test_failure, scan_signals};
use crate::model::{Command, Diagnostic, EventBody, FailureSignals, FailureSummary, Phase};
use crate::record::{read_events, read_snapshot};

/// Assemble a summary from its parts through the categorizer.
pub fn summarize(
    title: String,
    command: Command,
    phase: Phase,
    exit_code: i32,
    signals: &FailureSignals,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
) -> FailureSummary {
    let (category, hint) = categorize(command, phase, exit_code, signals, &errors);
    FailureSummary {
        title,
        command,
        phase,
        exit_code,
        category,
        hint: hint.to_string(),
        error_count: errors.len(),
        warning_count: warnings.len(),
        errors,
        warnings,
    }
}

/// Read the snapshot and event log and compute the summary. Never writes.
///
/// Title, command, phase and exit code come from the snapshot. Without one
/// (status persistence disabled) they are recovered from the log's `start`,
/// `status`, `end` and `crash` records. An empty record set reads as a `build`
/// in `starting` with exit code 0, and a run that has not ended yet is
/// treated as exit code 0 as well.
pub fn build_summary(status_path: &Path, events_path: &Path) -> FailureSummary {
    let snapshot = read_snapshot(status_path);

    let mut from_log = LogOutline::default();
    let mut signals = FailureSignals::default();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for ev in read_events(events_path) {
        match ev.body {
            EventBody::Start { title, command } => {
                from_log.title = title;
                from_log.command = command;
            }
            EventBody::Status { phase, .. } => from_log.phase = phase,
            EventBody::End { exit_code } => from_log.exit_code = Some(exit_code),
            EventBody::Crash { .. } => from_log.exit_code = Some(1),
            EventBody::Error { error } => {
                signals.merge(scan_signals(&error.message));
                errors.push(error);
            }
            EventBody::Warning { warning } => {
                signals.merge(scan_signals(&warning.message));
                warnings.push(warning);
            }
            EventBody::Log { line } => {
                if is_test_failure(&line) {
                    signals.saw_test_failure = true;
                }
                if is_bare_error(&line) {
                    signals.merge(scan_signals(&line));
                }
            }
            EventBody::Summary { .. } => {}
        }
    }

    let (title, command, phase, exit_code) = match &snapshot {
        Some(s) => (s.title.clone(), s.command, s.phase, s.exit_code.unwrap_or(0)),
        None => (
            from_log.title,
            from_log.command,
            from_log.phase,
            from_log.exit_code.unwrap_or(0),
        ),
    };

    // Fall back to the snapshot's lists when the log was lost or disabled.
    if errors.is_empty() && warnings.is_empty() {
        if let Some(s) = snapshot {
            errors = s.errors;
            warnings = s.warnings;
        }
    }

    summarize(title, command, phase, exit_code, &signals, errors, warnings)
}

/// Run metadata as far as the event log tells it.
struct LogOutline {
    title: String,
    command: Command,
    phase: Phase,
    exit_code: Option<i32>,
}

impl Default for LogOutline {
    fn default() -> Self {
        Self {
            title: String::new(),
            command: Command::Build,
            phase: Phase::Starting,
            exit_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Event, StatusSnapshot};
    use crate::record::{append_event, write_snapshot};
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_files_summarize_as_success() {
        let dir = tempfile::tempdir().unwrap();
        let s = build_summary(&dir.path().join("status.json"), &dir.path().join("events.ndjson"));
        assert_eq!(s.command, Command::Build);
        assert_eq!(s.phase, Phase::Starting);
        assert_eq!(s.exit_code, 0);
        assert_eq!(s.category, Category::Success);
        assert_eq!(s.hint, "");
    }

    #[test]
    fn linker_signal_from_bare_error_line() {
        let dir = tempfile::tempdir().unwrap();
        let status = dir.path().join("status.json");
        let events = dir.path().join("events.ndjson");
        let mut snap = StatusSnapshot::new("Building", Command::Build);
        snap.phase = Phase::Preparing;
        snap.exit_code = Some(1);
        snap.is_final = true;
        write_snapshot(&status, &snap);
        append_event(
            &events,
            &Event::now(EventBody::Log {
                line: "error: linker command failed with exit code 1".into(),
            }),
        );

        let s = build_summary(&status, &events);
        assert_eq!(s.category, Category::Link);
        assert_eq!(s.exit_code, 1);
        assert_eq!(s.error_count, 0);
    }

    #[test]
    fn counts_come_from_event_log() {
        let dir = tempfile::tempdir().unwrap();
        let status = dir.path().join("status.json");
        let events = dir.path().join("events.ndjson");
        let mut snap = StatusSnapshot::new("Building", Command::Build);
        snap.phase = Phase::Compiling;
        snap.exit_code = Some(1);
        write_snapshot(&status, &snap);
        append_event(
            &events,
            &Event::now(EventBody::Error {
                error: Diagnostic::new("/tmp/x.swift", 1, 1, "nope"),
            }),
        );
        append_event(
            &events,
            &Event::now(EventBody::Warning {
                warning: Diagnostic::new("/tmp/x.swift", 2, 1, "hmm"),
            }),
        );

        let s = build_summary(&status, &events);
        assert_eq!(s.category, Category::Compile);
        assert_eq!((s.error_count, s.warning_count), (1, 1));
        let v = serde_json::to_value(&s).unwrap();
        for key in ["title", "command", "phase", "exitCode", "category", "hint", "errorCount", "warningCount", "errors", "warnings"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn event_log_alone_describes_a_failed_run() {
        let dir = tempfile::tempdir().unwrap();
        let status = dir.path().join("status.json");
        let events = dir.path().join("events.ndjson");
        let records = [
            EventBody::Start {
                title: "Testing".into(),
                command: Command::Test,
            },
            EventBody::Status {
                phase: Phase::Compiling,
                status_text: "Compiling Foo".into(),
            },
            EventBody::Error {
                error: Diagnostic::new("/tmp/x.swift", 1, 1, "nope"),
            },
            EventBody::End { exit_code: 1 },
        ];
        for body in records {
            append_event(&events, &Event::now(body));
        }

        let s = build_summary(&status, &events);
        assert_eq!(s.title, "Testing");
        assert_eq!(s.command, Command::Test);
        assert_eq!(s.phase, Phase::Compiling);
        assert_eq!(s.exit_code, 1);
        assert_eq!(s.category, Category::Compile);
        assert_eq!(s.error_count, 1);
    }

    #[test]
    fn crash_in_log_counts_as_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.ndjson");
        append_event(
            &events,
            &Event::now(EventBody::Start {
                title: "Running".into(),
                command: Command::Run,
            }),
        );
        append_event(
            &events,
            &Event::now(EventBody::Crash {
                message: "failed to spawn process".into(),
            }),
        );
        let s = build_summary(&dir.path().join("status.json"), &events);
        assert_eq!(s.exit_code, 1);
        assert_eq!(s.category, Category::Runtime);
    }
}
