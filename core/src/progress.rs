//! Terminal spinner for quiet runs. Cosmetic only; never affects records.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::model::Phase;

const COMPILE_BASE: u8 = 20;
const COMPILE_STEP: u32 = 2;
const COMPILE_CAP: u8 = 90;

/// Percent estimate for `phase`, never below `current`.
pub fn estimate_percent(phase: Phase, compiled_modules: u32, current: u8) -> u8 {
    let target = match phase {
        Phase::Starting => 0,
        Phase::Fetching | Phase::Updating => 5,
        Phase::Resolving => 10,
        Phase::Preparing => 15,
        Phase::Compiling => {
            let bumped = u32::from(COMPILE_BASE) + compiled_modules.saturating_mul(COMPILE_STEP);
            bumped.min(u32::from(COMPILE_CAP)) as u8
        }
        Phase::Linking => 95,
        Phase::Testing | Phase::Running => 97,
        Phase::Completed => 100,
    };
    target.max(current)
}

pub struct ProgressReporter {
    bar: ProgressBar,
    enabled: bool,
    tick: Duration,
    percent: u8,
    compiled: u32,
}

impl ProgressReporter {
    pub fn new(enabled: bool, title: &str, tick_ms: u64) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold} {msg} [{pos:>3}%] {elapsed}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_prefix(title.to_string());
        Self {
            bar,
            enabled,
            tick: Duration::from_millis(tick_ms.max(16)),
            percent: 0,
            compiled: 0,
        }
    }

    /// A reporter that renders nothing.
    pub fn disabled() -> Self {
        Self::new(false, "", 120)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn start(&self) {
        if self.enabled {
            self.bar.enable_steady_tick(self.tick);
        }
    }

    /// Count one more compiled module toward the compile-phase estimate.
    pub fn bump_compile(&mut self) {
        self.compiled = self.compiled.saturating_add(1);
    }

    pub fn set(&mut self, phase: Phase, status_text: &str) {
        self.percent = estimate_percent(phase, self.compiled, self.percent);
        self.bar.set_position(u64::from(self.percent));
        if !status_text.is_empty() {
            self.bar.set_message(status_text.to_string());
        }
    }

    pub fn finish(&mut self, success: bool, elapsed: Duration) {
        if success {
            self.percent = 100;
            self.bar.set_position(100);
        }
        let verdict = if success { "done" } else { "failed" };
        self.bar
            .finish_with_message(format!("{verdict} in {:.1}s", elapsed.as_secs_f64()));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::disabled()
    }
}
