use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::broadcast::{Broadcaster, NoopBroadcaster};
use crate::classify::{classify, is_bare_error, is_test_failure, scan_signals};
use crate::model::{
    Command, Diagnostic, Event, EventBody, FailureSignals, FailureSummary, Phase, Severity,
    StatusSnapshot,
};
use crate::progress::ProgressReporter;
use crate::record::{append_event, reset_log, write_snapshot, RecordPaths};
use crate::summary::summarize;

/// Broadcast kind used for status snapshot writes.
pub const SNAPSHOT_KIND: &str = "snapshot";

/// Mutable state of one supervised invocation.
///
/// Every method takes `&mut self`; the supervisor's single consumer loop is
/// the only caller, which serializes all mutation.
pub struct RunContext {
    paths: RecordPaths,
    snapshot: StatusSnapshot,
    signals: FailureSignals,
    started: Instant,
    closed: bool,
    broadcaster: Arc<dyn Broadcaster>,
    reporter: ProgressReporter,
    ci_mode: bool,
    ci_out: Box<dyn Write + Send>,
}

impl RunContext {
    pub fn new(title: impl Into<String>, command: Command, paths: RecordPaths) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            command.default_title().to_string()
        } else {
            title
        };
        Self {
            paths,
            snapshot: StatusSnapshot::new(title, command),
            signals: FailureSignals::default(),
            started: Instant::now(),
            closed: false,
            broadcaster: Arc::new(NoopBroadcaster),
            reporter: ProgressReporter::disabled(),
            ci_mode: false,
            ci_out: Box::new(std::io::stdout()),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_ci_mode(mut self, ci_mode: bool) -> Self {
        self.ci_mode = ci_mode;
        self
    }

    /// Where CI annotations go (stdout unless replaced).
    pub fn with_ci_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.ci_out = sink;
        self
    }

    pub fn paths(&self) -> &RecordPaths {
        &self.paths
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn signals(&self) -> FailureSignals {
        self.signals
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Truncate the log, record `start` and write the initial snapshot.
    pub fn on_start(&mut self) {
        self.started = Instant::now();
        reset_log(&self.paths.events);
        self.emit(EventBody::Start {
            title: self.snapshot.title.clone(),
            command: self.snapshot.command,
        });
        self.persist();
        self.reporter.start();
        tracing::debug!(
            target: "tutor.runner",
            title = %self.snapshot.title,
            command = %self.snapshot.command,
            events = %self.paths.events.display(),
            "run context started"
        );
    }

    pub fn process_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() || self.closed {
            return;
        }

        let previous = self.snapshot.phase;
        let c = classify(line, previous);

        if is_test_failure(line) {
            self.signals.saw_test_failure = true;
        }
        if is_bare_error(line) {
            self.signals.merge(scan_signals(line));
        }

        if let Some(text) = c.status_text {
            self.snapshot.status_text = text;
        }
        if c.phase == Phase::Compiling && line.contains("Compiling") {
            self.reporter.bump_compile();
        }
        if c.phase != previous {
            self.snapshot.phase = c.phase;
            self.emit(EventBody::Status {
                phase: c.phase,
                status_text: self.snapshot.status_text.clone(),
            });
        }

        if let Some((severity, diag)) = c.diagnostic {
            self.record_diagnostic(severity, diag);
        }

        self.emit(EventBody::Log {
            line: line.to_string(),
        });
        self.persist();
        self.reporter
            .set(self.snapshot.phase, &self.snapshot.status_text);
    }

    /// Close the invocation with the subprocess's exit code. Idempotent.
    pub fn on_finish(&mut self, exit_code: i32) {
        if self.closed {
            return;
        }
        if exit_code == 0 {
            self.snapshot.status_text = "Completed".to_string();
            if self.snapshot.phase != Phase::Completed {
                self.snapshot.phase = Phase::Completed;
                self.emit(EventBody::Status {
                    phase: Phase::Completed,
                    status_text: self.snapshot.status_text.clone(),
                });
            }
        }
        self.emit(EventBody::End { exit_code });
        self.close(exit_code);
    }

    /// Close the invocation after a launch failure. Idempotent.
    pub fn on_crash(&mut self, message: &str) {
        if self.closed {
            return;
        }
        tracing::warn!(target: "tutor.runner", message = %message, "toolchain crashed");
        self.emit(EventBody::Crash {
            message: message.to_string(),
        });
        self.snapshot.status_text = message.to_string();
        self.close(1);
    }

    pub fn make_summary(&self) -> FailureSummary {
        summarize(
            self.snapshot.title.clone(),
            self.snapshot.command,
            self.snapshot.phase,
            self.snapshot.exit_code.unwrap_or(0),
            &self.signals,
            self.snapshot.errors.clone(),
            self.snapshot.warnings.clone(),
        )
    }

    pub fn make_summary_json(&self) -> Option<String> {
        serde_json::to_string(&self.make_summary()).ok()
    }

    fn close(&mut self, exit_code: i32) {
        self.closed = true;
        self.snapshot.is_final = true;
        self.snapshot.exit_code = Some(exit_code);
        self.persist();
        let summary = self.make_summary();
        self.emit(EventBody::Summary { summary });
        self.reporter.finish(exit_code == 0, self.started.elapsed());
        tracing::debug!(
            target: "tutor.runner",
            exit_code,
            phase = %self.snapshot.phase,
            errors = self.snapshot.errors.len(),
            warnings = self.snapshot.warnings.len(),
            "run context closed"
        );
    }

    fn record_diagnostic(&mut self, severity: Severity, diag: Diagnostic) {
        self.signals.merge(scan_signals(&diag.message));
        if self.ci_mode {
            let annotation = format!(
                "::{} file={},line={},col={}::{}\n",
                severity.as_str(),
                diag.file,
                diag.line,
                diag.column,
                diag.message
            );
            let _ = self.ci_out.write_all(annotation.as_bytes());
            let _ = self.ci_out.flush();
        }
        match severity {
            Severity::Error => {
                self.snapshot.errors.push(diag.clone());
                self.emit(EventBody::Error { error: diag });
            }
            Severity::Warning => {
                self.snapshot.warnings.push(diag.clone());
                self.emit(EventBody::Warning { warning: diag });
            }
        }
    }

    fn emit(&self, body: EventBody) {
        let event = Event::now(body);
        let kind = event.kind();
        let value = match serde_json::to_value(&event) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(target: "tutor.runner", error = %e, "event serialize failed");
                return;
            }
        };
        append_event(&self.paths.events, &value);
        self.broadcaster.send_event(kind, &value);
    }

    fn persist(&mut self) {
        self.snapshot.elapsed_seconds = self.started.elapsed().as_secs();
        self.snapshot.timestamp = chrono::Utc::now().to_rfc3339();
        if self.paths.persist_status {
            write_snapshot(&self.paths.status, &self.snapshot);
        }
        if let Ok(v) = serde_json::to_value(&self.snapshot) {
            self.broadcaster.send_event(SNAPSHOT_KIND, &v);
        }
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("paths", &self.paths)
            .field("phase", &self.snapshot.phase)
            .field("closed", &self.closed)
            .field("broadcaster", &self.broadcaster.name())
            .finish()
    }
}
