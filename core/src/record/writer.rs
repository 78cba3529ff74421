//! Best-effort persistence primitives for the status snapshot and event log.
//!
//! Public entry points return `bool`: a lost progress write must never abort
//! the supervised toolchain. The `try_*` variants keep the error for callers
//! (and tests) that want it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::RecordError;

/// Serialize `record` and atomically replace `path` with it.
///
/// The JSON goes to a temp file in the same directory which is then renamed
/// over the target, so concurrent readers see either the old or the new
/// record, never a torn one.
pub fn write_snapshot<T: Serialize>(path: &Path, record: &T) -> bool {
    match try_write_snapshot(path, record) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: "tutor.record", error = %e, "status write failed");
            false
        }
    }
}

pub fn try_write_snapshot<T: Serialize>(path: &Path, record: &T) -> Result<(), RecordError> {
    let bytes = serde_json::to_vec(record).map_err(RecordError::Serialize)?;
    let dir = parent_dir(path)?;
    fs::create_dir_all(dir).map_err(|e| RecordError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RecordError::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| RecordError::io(path, e))?;
    tmp.flush().map_err(|e| RecordError::io(path, e))?;
    tmp.persist(path).map_err(|e| RecordError::io(path, e.error))?;
    Ok(())
}

/// Append one JSON object plus `\n` to `path`, creating it if absent.
///
/// No locking: exactly one run context owns a given log.
pub fn append_event<T: Serialize>(path: &Path, record: &T) -> bool {
    match try_append_event(path, record) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: "tutor.record", error = %e, "event append failed");
            false
        }
    }
}

pub fn try_append_event<T: Serialize>(path: &Path, record: &T) -> Result<(), RecordError> {
    let mut line = serde_json::to_vec(record).map_err(RecordError::Serialize)?;
    line.push(b'\n');
    if let Ok(dir) = parent_dir(path) {
        fs::create_dir_all(dir).map_err(|e| RecordError::io(dir, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RecordError::io(path, e))?;
    // single write_all so a line lands in one append where the OS allows it
    file.write_all(&line).map_err(|e| RecordError::io(path, e))?;
    file.flush().map_err(|e| RecordError::io(path, e))?;
    Ok(())
}

/// Start an empty event log so it describes a single invocation.
///
/// The empty file is renamed over the old one rather than truncating it in
/// place: the log gets a new identity, which is how tailers tell a fresh run
/// from growth of the old one.
pub fn reset_log(path: &Path) -> bool {
    let res = (|| -> Result<(), RecordError> {
        let dir = parent_dir(path)?;
        fs::create_dir_all(dir).map_err(|e| RecordError::io(dir, e))?;
        let tmp = NamedTempFile::new_in(dir).map_err(|e| RecordError::io(dir, e))?;
        tmp.persist(path).map_err(|e| RecordError::io(path, e.error))?;
        Ok(())
    })();
    if let Err(e) = &res {
        tracing::debug!(target: "tutor.record", error = %e, "event log reset failed");
    }
    res.is_ok()
}

fn parent_dir(path: &Path) -> Result<&Path, RecordError> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(p) => Ok(p),
        None => Err(RecordError::NoParent(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_write_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/.tutor/status.json");
        assert!(write_snapshot(&path, &serde_json::json!({"phase": "resolving"})));
        let v: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(v["phase"], "resolving");
    }

    #[test]
    fn snapshot_write_reports_failure_as_false() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("status.json");
        assert!(!write_snapshot(&path, &serde_json::json!({"a": 1})));
    }

    #[test]
    fn append_creates_and_terminates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        assert!(append_event(&path, &serde_json::json!({"type": "log", "line": "Compiling A"})));
        assert!(append_event(
            &path,
            &serde_json::json!({"type": "warning", "warning": {"message": "be careful"}})
        ));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn reset_log_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        append_event(&path, &serde_json::json!({"type": "log", "line": "old"}));
        assert!(reset_log(&path));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }
}
