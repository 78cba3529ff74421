use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::RunnerError;

use super::context::RunContext;
use super::exit::normalize_exit;
use super::plan::RunSpec;
use super::tee::{self, LineTap, StreamKind};

pub const MODULE_CACHE_ENV: &str = "CLANG_MODULE_CACHE_PATH";
pub const MODULE_CACHE_DIR: &str = ".modulecache";

/// How long output may keep arriving after the child exited. Background
/// processes that inherited its pipes are not waited for beyond this.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct SuperviseOptions {
    /// Copy raw subprocess output to this process's stdout/stderr.
    pub echo: bool,
    /// Default `CLANG_MODULE_CACHE_PATH` to `<work_dir>/.modulecache`.
    pub module_cache: bool,
}

impl Default for SuperviseOptions {
    fn default() -> Self {
        Self {
            echo: true,
            module_cache: true,
        }
    }
}

/// Run `spec` to completion, feeding every output line through `ctx`.
///
/// Returns the exit code to surface: the child's own code, `128 + signal`
/// for signal deaths, or `1` when the child could not be launched. `ctx` is
/// closed (final snapshot written) in every case.
pub async fn supervise(spec: &RunSpec, ctx: &mut RunContext, opts: SuperviseOptions) -> i32 {
    ctx.on_start();
    match run_child(spec, ctx, opts).await {
        Ok(code) => {
            ctx.on_finish(code);
            code
        }
        Err(e) => {
            tracing::error!(target: "tutor.runner", error = %e, program = %spec.program, "supervision failed");
            let message = match std::error::Error::source(&e) {
                Some(cause) => format!("{e}: {cause}"),
                None => e.to_string(),
            };
            ctx.on_crash(&message);
            1
        }
    }
}

async fn run_child(
    spec: &RunSpec,
    ctx: &mut RunContext,
    opts: SuperviseOptions,
) -> Result<i32, RunnerError> {
    let mut cmd = tokio::process::Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }
    if opts.module_cache {
        if let Some(dir) = default_module_cache(spec) {
            cmd.env(MODULE_CACHE_ENV, &dir);
        }
    }

    tracing::info!(
        target: "tutor.runner",
        program = %spec.program,
        args = ?spec.args,
        cwd = %spec.work_dir.display(),
        "spawning toolchain"
    );
    let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    let (line_tx, mut line_rx) = mpsc::channel::<LineTap>(1024);
    let mut tasks = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        tasks.push(tee::pump(stdout, StreamKind::Stdout, line_tx.clone(), opts.echo));
    }
    if let Some(stderr) = child.stderr.take() {
        tasks.push(tee::pump(stderr, StreamKind::Stderr, line_tx.clone(), opts.echo));
    }
    drop(line_tx);

    let status = {
        let wait_fut = child.wait();
        tokio::pin!(wait_fut);
        let mut streams_open = true;

        loop {
            tokio::select! {
                res = &mut wait_fut => {
                    break res.map_err(|source| RunnerError::Wait {
                        program: spec.program.clone(),
                        source,
                    });
                }
                tap = line_rx.recv(), if streams_open => {
                    match tap {
                        Some(tap) => consume(ctx, tap),
                        None => streams_open = false,
                    }
                }
            }
        }
    };

    // Lines still buffered after exit; ends once both pumps hit EOF or the
    // grace period runs out.
    let drained = tokio::time::timeout(DRAIN_GRACE, async {
        while let Some(tap) = line_rx.recv().await {
            consume(ctx, tap);
        }
    })
    .await
    .is_ok();
    if !drained {
        tracing::warn!(
            target: "tutor.runner",
            grace_ms = DRAIN_GRACE.as_millis() as u64,
            "output pipes still open after exit, detaching"
        );
        for task in &tasks {
            task.abort();
        }
    }
    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(target: "tutor.runner", error = %e, "output stream ended early"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::warn!(target: "tutor.runner", error = %e, "output pump panicked"),
        }
    }

    let code = normalize_exit(status?);
    tracing::info!(target: "tutor.runner", exit_code = code, "toolchain exited");
    Ok(code)
}

fn consume(ctx: &mut RunContext, tap: LineTap) {
    tracing::trace!(target: "tutor.runner", stream = tap.stream.as_str(), line = %tap.line, "output line");
    ctx.process_line(&tap.line);
}

fn default_module_cache(spec: &RunSpec) -> Option<std::path::PathBuf> {
    if spec.has_env(MODULE_CACHE_ENV) || std::env::var_os(MODULE_CACHE_ENV).is_some() {
        return None;
    }
    let dir = module_cache_dir(&spec.work_dir);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::debug!(target: "tutor.runner", error = %e, dir = %dir.display(), "module cache dir not created");
    }
    Some(dir)
}

pub fn module_cache_dir(work_dir: &Path) -> std::path::PathBuf {
    work_dir.join(MODULE_CACHE_DIR)
}
