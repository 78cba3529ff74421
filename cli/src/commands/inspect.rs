//! `status`, `summary` and `tail`: read-only views of the records.

use std::io::Write;
use std::path::Path;

use tutor_core::api::{
    build_summary, last_events, one_line_event, read_raw, read_snapshot, AppConfig, CliError,
    RecordPaths, StatusSnapshot,
};

use super::cli::{StatusArgs, TailArgs};

pub fn handle_status(
    args: StatusArgs,
    root: &Path,
    cfg: &AppConfig,
    out: &mut impl Write,
) -> Result<i32, CliError> {
    let paths = RecordPaths::resolve(root, &cfg.records);
    if args.json {
        return match read_raw(&paths.status) {
            Some(raw) => {
                writeln!(out, "{}", raw.trim_end())?;
                Ok(0)
            }
            None => no_status(&paths),
        };
    }
    match read_snapshot(&paths.status) {
        Some(snap) => {
            out.write_all(render_status(&snap).as_bytes())?;
            Ok(0)
        }
        None => no_status(&paths),
    }
}

fn no_status(paths: &RecordPaths) -> Result<i32, CliError> {
    eprintln!("no status at {}", paths.status.display());
    Ok(1)
}

pub fn handle_summary(root: &Path, cfg: &AppConfig, out: &mut impl Write) -> Result<i32, CliError> {
    let paths = RecordPaths::resolve(root, &cfg.records);
    let summary = build_summary(&paths.status, &paths.events);
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| CliError::Command(format!("summary: {e}")))?;
    writeln!(out, "{json}")?;
    Ok(0)
}

pub fn handle_tail(
    args: TailArgs,
    root: &Path,
    cfg: &AppConfig,
    out: &mut impl Write,
) -> Result<i32, CliError> {
    let paths = RecordPaths::resolve(root, &cfg.records);
    for ev in last_events(&paths.events, Some(args.count), args.errors_only) {
        writeln!(out, "{}", one_line_event(&ev))?;
    }
    Ok(0)
}

pub fn render_status(snap: &StatusSnapshot) -> String {
    let mut out = format!(
        "{} [{}] {} ({}s)\n",
        snap.title,
        snap.phase.as_str(),
        snap.status_text,
        snap.elapsed_seconds
    );
    if snap.is_final {
        out.push_str(&format!("finished: exit {}\n", snap.exit_code.unwrap_or(0)));
    }
    if !snap.errors.is_empty() || !snap.warnings.is_empty() {
        out.push_str(&format!(
            "{} error(s), {} warning(s)\n",
            snap.errors.len(),
            snap.warnings.len()
        ));
    }
    for e in &snap.errors {
        out.push_str(&format!("  error: {}:{}:{}: {}\n", e.file, e.line, e.column, e.message));
    }
    out
}
