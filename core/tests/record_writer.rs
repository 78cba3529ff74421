use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use tutor_core::api::{append_event, write_snapshot, EventTail};

#[test]
fn concurrent_snapshot_writes_are_never_torn() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    write_snapshot(&path, &json!({"n": -1, "copy": -1, "pad": ""}));

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut reads = 0usize;
            while !done.load(Ordering::SeqCst) {
                let bytes = fs::read(&path).expect("status file always present");
                let v: Value = serde_json::from_slice(&bytes).expect("valid json on every read");
                assert_eq!(v["n"], v["copy"], "mixed payloads: {v}");
                reads += 1;
            }
            reads
        })
    };

    let writers: Vec<_> = (0..100)
        .map(|i| {
            let path = path.clone();
            thread::spawn(move || {
                // large enough that a non-atomic write would be observable
                let pad = "x".repeat(16 * 1024 + i);
                assert!(write_snapshot(&path, &json!({"n": i, "copy": i, "pad": pad})));
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    let reads = reader.join().unwrap();
    assert!(reads > 0);

    let last: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(last["n"], last["copy"]);
}

#[test]
fn appends_produce_one_parseable_record_each() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".tutor/events.ndjson");
    let n = 250;
    for i in 0..n {
        assert!(append_event(&path, &json!({"type": "log", "line": format!("line {i}")})));
    }
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    let records: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), n);
    assert_eq!(records[n - 1]["line"], format!("line {}", n - 1));

    // a tail from the start sees the same records
    let mut tail = EventTail::from_start(&path);
    assert_eq!(tail.poll().len(), n);
    assert_eq!(tail.offset(), text.len() as u64);
}
