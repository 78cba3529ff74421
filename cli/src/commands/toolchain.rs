use std::io::Write;
use std::path::Path;

use tutor_core::api::{
    supervise, AppConfig, CliError, Command, FailureSummary, ProgressReporter, RecordPaths,
    RunContext, SuperviseOptions,
};
use tutor_plugins::factory::{build_bridge, build_toolchain};

use super::cli::ToolchainArgs;

/// Run one `build`/`run`/`test` invocation and return the exit code to surface.
pub async fn handle_toolchain(
    command: Command,
    args: ToolchainArgs,
    root: &Path,
    cfg: &AppConfig,
) -> Result<i32, CliError> {
    let paths = RecordPaths::resolve(root, &cfg.records);
    let planner = build_toolchain(cfg);
    let spec = planner.plan(command, root, &args.passthrough);
    tracing::info!(
        target: "tutor.runner",
        toolchain = planner.name(),
        program = %spec.program,
        args = ?spec.args,
        "starting {}",
        command.as_str()
    );

    let title = args
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| command.default_title().to_string());
    let reporter = if show_progress(&args, cfg, atty::is(atty::Stream::Stderr)) {
        ProgressReporter::new(true, &title, cfg.progress.tick_ms)
    } else {
        ProgressReporter::disabled()
    };

    let mut ctx = RunContext::new(title, command, paths)
        .with_broadcaster(build_bridge(cfg))
        .with_reporter(reporter)
        .with_ci_mode(args.ci || cfg.ci);
    let opts = SuperviseOptions {
        echo: !args.quiet,
        module_cache: cfg.toolchain.module_cache,
    };

    let code = supervise(&spec, &mut ctx, opts).await;
    if code != 0 {
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(render_failure(&ctx.make_summary()).as_bytes());
    }
    Ok(code)
}

/// The spinner only replaces echoed output, and only on a terminal.
fn show_progress(args: &ToolchainArgs, cfg: &AppConfig, stderr_is_tty: bool) -> bool {
    args.quiet && !args.no_progress && cfg.progress.enabled && stderr_is_tty
}

pub fn render_failure(summary: &FailureSummary) -> String {
    let mut out = format!("{}: {}\n", summary.category.as_str(), summary.hint);
    out.push_str(&format!(
        "{} error(s), {} warning(s), exit code {}\n",
        summary.error_count, summary.warning_count, summary.exit_code
    ));
    for e in summary.errors.iter().take(5) {
        out.push_str(&format!("  {}:{}:{}: {}\n", e.file, e.line, e.column, e.message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tutor_core::api::{Category, Diagnostic, Phase};

    #[test]
    fn progress_needs_quiet_and_a_terminal() {
        let cfg = AppConfig::default();
        let quiet = ToolchainArgs {
            quiet: true,
            ..Default::default()
        };
        assert!(show_progress(&quiet, &cfg, true));
        assert!(!show_progress(&quiet, &cfg, false));
        assert!(!show_progress(&ToolchainArgs::default(), &cfg, true));

        let opted_out = ToolchainArgs {
            quiet: true,
            no_progress: true,
            ..Default::default()
        };
        assert!(!show_progress(&opted_out, &cfg, true));
    }

    #[test]
    fn failure_report_leads_with_category() {
        let summary = FailureSummary {
            title: "Building".into(),
            command: Command::Build,
            phase: Phase::Compiling,
            exit_code: 1,
            category: Category::Compile,
            hint: "Fix the compiler errors".into(),
            error_count: 1,
            warning_count: 0,
            errors: vec![Diagnostic::new("/a/B.swift", 12, 4, "boom")],
            warnings: vec![],
        };
        assert_eq!(
            render_failure(&summary),
            "COMPILE: Fix the compiler errors\n\
             1 error(s), 0 warning(s), exit code 1\n  /a/B.swift:12:4: boom\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn generic_toolchain_runs_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.toolchain.kind = tutor_core::api::ToolchainKind::Generic;
        cfg.toolchain.program = "true".into();
        cfg.toolchain.module_cache = false;
        let args = ToolchainArgs {
            quiet: true,
            no_progress: true,
            ..Default::default()
        };
        let code = handle_toolchain(Command::Build, args, dir.path(), &cfg)
            .await
            .unwrap();
        assert_eq!(code, 0);
        let snap = tutor_core::api::read_snapshot(&dir.path().join(".tutor/status.json")).unwrap();
        assert_eq!(snap.phase, Phase::Completed);
        assert_eq!(snap.exit_code, Some(0));
    }
}
