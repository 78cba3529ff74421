use std::io::Write;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tutor_core::api::{
    build_summary, read_events, read_snapshot, Category, Command, EventBody, Phase, RecordPaths,
    RecordingBroadcaster, RunContext,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn feed(ctx: &mut RunContext, lines: &[&str]) {
    for l in lines {
        ctx.process_line(l);
    }
}

#[test]
fn processes_lines_and_emits_ci_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());
    let ci = SharedBuf::default();
    let mut ctx = RunContext::new("Build", Command::Build, paths.clone())
        .with_ci_mode(true)
        .with_ci_sink(Box::new(ci.clone()));

    ctx.on_start();
    feed(
        &mut ctx,
        &[
            "Fetching xxx",
            "Updating yyy",
            "Resolving dependencies",
            "Compiling Foo foo.swift",
            "Linking Foo",
            "Testing FooTests",
            "building for macOS",
            "Build complete!",
            "Executing Foo",
            "/tmp/A.swift:1:2: warning: be careful",
            "/tmp/A.swift:1:2: error: oops",
            "Test Suite 'All tests' failed",
        ],
    );
    ctx.on_finish(1);

    let out = ci.text();
    assert!(out.contains("::warning file=/tmp/A.swift,line=1,col=2::be careful"));
    assert!(out.contains("::error file=/tmp/A.swift,line=1,col=2::oops"));

    let summary = ctx.make_summary_json().unwrap();
    assert!(summary.contains("\"errorCount\""));
    assert!(ctx.signals().saw_test_failure);
    assert!(paths.status.exists());
    assert!(paths.events.exists());
}

#[test]
fn final_snapshot_and_event_log_describe_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());
    let mut ctx = RunContext::new("", Command::Build, paths.clone());

    ctx.on_start();
    feed(
        &mut ctx,
        &[
            "Resolving dependencies",
            "",
            "   ",
            "Compiling Foo foo.swift",
            "/tmp/x.swift:1:1: error: nope",
        ],
    );
    ctx.on_finish(1);

    let snap = read_snapshot(&paths.status).unwrap();
    assert_eq!(snap.title, "Building");
    assert_eq!(snap.phase, Phase::Compiling);
    assert_eq!(snap.status_text, "Foo");
    assert!(snap.is_final);
    assert_eq!(snap.exit_code, Some(1));
    assert_eq!(snap.errors.len(), 1);

    let kinds: Vec<&str> = read_events(&paths.events)
        .iter()
        .map(|e| e.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "start", "status", "log", "status", "log", "error", "log", "end", "summary"
        ]
    );
    assert_eq!(ctx.make_summary().category, Category::Compile);
}

#[test]
fn close_happens_once() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());
    let mut ctx = RunContext::new("T", Command::Test, paths.clone());
    ctx.on_start();
    ctx.on_finish(0);
    ctx.on_finish(3);
    ctx.on_crash("late");
    ctx.process_line("Compiling Late late.swift");

    let snap = read_snapshot(&paths.status).unwrap();
    assert_eq!(snap.exit_code, Some(0));
    assert_eq!(snap.phase, Phase::Completed);
    let events = read_events(&paths.events);
    assert_eq!(events.iter().filter(|e| e.kind() == "end").count(), 1);
    assert!(events.iter().all(|e| e.kind() != "crash"));
}

#[test]
fn new_invocation_starts_a_fresh_log() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());

    let mut first = RunContext::new("A", Command::Build, paths.clone());
    first.on_start();
    feed(&mut first, &["Compiling A a.swift", "Compiling B b.swift"]);
    first.on_finish(0);

    let mut second = RunContext::new("B", Command::Build, paths.clone());
    second.on_start();
    let events = read_events(&paths.events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "start");
}

#[test]
fn status_persistence_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = RecordPaths::under(dir.path());
    paths.persist_status = false;
    let mut ctx = RunContext::new("B", Command::Build, paths.clone());
    ctx.on_start();
    ctx.process_line("Compiling A a.swift");
    ctx.on_finish(0);
    assert!(!paths.status.exists());
    assert!(!read_events(&paths.events).is_empty());
}

#[test]
fn failed_run_without_status_file_summarizes_from_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = RecordPaths::under(dir.path());
    paths.persist_status = false;
    let mut ctx = RunContext::new("B", Command::Build, paths.clone());
    ctx.on_start();
    feed(&mut ctx, &["Compiling Foo foo.swift", "/tmp/x.swift:1:1: error: nope"]);
    ctx.on_finish(1);

    assert!(!paths.status.exists());
    let summary = build_summary(&paths.status, &paths.events);
    assert_eq!(summary.category, Category::Compile);
    assert_eq!(summary.exit_code, 1);
    assert_eq!(summary.phase, Phase::Compiling);
    assert_eq!(summary.error_count, 1);
}

#[test]
fn successful_run_announces_completed_phase() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());
    let mut ctx = RunContext::new("B", Command::Build, paths.clone());
    ctx.on_start();
    feed(&mut ctx, &["Compiling Foo foo.swift", "Linking Foo"]);
    ctx.on_finish(0);

    let events = read_events(&paths.events);
    let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
    assert_eq!(&kinds[kinds.len() - 3..], &["status", "end", "summary"]);
    let last_status = events
        .iter()
        .rev()
        .find_map(|e| match &e.body {
            EventBody::Status { phase, .. } => Some(*phase),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_status, Phase::Completed);
}

#[test]
fn broadcaster_sees_events_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let bcast = Arc::new(RecordingBroadcaster::default());
    let mut ctx = RunContext::new("B", Command::Run, RecordPaths::under(dir.path()))
        .with_broadcaster(bcast.clone());
    ctx.on_start();
    ctx.process_line("Executing Foo");
    ctx.on_finish(2);

    let kinds = bcast.kinds();
    for k in ["start", "status", "log", "end", "summary", "snapshot"] {
        assert!(kinds.iter().any(|x| x == k), "missing {k} in {kinds:?}");
    }
    assert_eq!(ctx.make_summary().category, Category::Runtime);
}

#[test]
fn crash_closes_with_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let paths = RecordPaths::under(dir.path());
    let mut ctx = RunContext::new("B", Command::Build, paths.clone());
    ctx.on_start();
    ctx.on_crash("failed to spawn process: swift");
    let snap = read_snapshot(&paths.status).unwrap();
    assert!(snap.is_final);
    assert_eq!(snap.exit_code, Some(1));
    assert!(read_events(&paths.events).iter().any(|e| e.kind() == "crash"));
}
