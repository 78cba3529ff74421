use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::model::{Event, StatusSnapshot};

/// Raw contents of the status file, if it exists and is readable.
pub fn read_raw(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

pub fn read_snapshot(path: &Path) -> Option<StatusSnapshot> {
    let raw = read_raw(path)?;
    match serde_json::from_str(&raw) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(target: "tutor.record", path = %path.display(), error = %e, "unreadable status snapshot");
            None
        }
    }
}

/// All parseable events in the log; malformed lines are skipped.
pub fn read_events(path: &Path) -> Vec<Event> {
    let Some(text) = read_raw(path) else {
        return Vec::new();
    };
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<Event>(l).ok())
        .collect()
}

/// Incremental reader over the append-only event log.
///
/// Resumes from a byte offset and only yields complete (newline-terminated)
/// lines. Reading restarts at 0 when a new invocation replaced the log (its
/// file identity changed) or the file shrank below the offset.
#[derive(Debug)]
pub struct EventTail {
    path: PathBuf,
    offset: u64,
    pending: Vec<u8>,
    identity: Option<FileId>,
}

/// `(device, inode)` of the log file; `None` where the platform has no such notion.
type FileId = (u64, u64);

#[cfg(unix)]
fn file_id(meta: &fs::Metadata) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_id(_meta: &fs::Metadata) -> Option<FileId> {
    None
}

impl EventTail {
    pub fn from_start(path: impl Into<PathBuf>) -> Self {
        Self::at_offset(path, 0)
    }

    /// Start at the current end of the log; only growth is reported.
    pub fn from_end(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let meta = fs::metadata(&path).ok();
        let offset = meta.as_ref().map(|m| m.len()).unwrap_or(0);
        let mut tail = Self::at_offset(path, offset);
        tail.identity = meta.as_ref().and_then(file_id);
        tail
    }

    /// Resume at `offset` of whichever log is found on the first poll.
    pub fn at_offset(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            pending: Vec::new(),
            identity: None,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Complete lines appended since the previous poll. Missing file = no lines.
    pub fn poll(&mut self) -> Vec<String> {
        let Ok(mut file) = File::open(&self.path) else {
            return Vec::new();
        };
        let meta = match file.metadata() {
            Ok(m) => m,
            Err(_) => return Vec::new(),
        };
        let len = meta.len();
        let identity = file_id(&meta);
        let replaced = self.identity.is_some() && identity.is_some() && identity != self.identity;
        if replaced || len < self.offset {
            tracing::debug!(target: "tutor.record", path = %self.path.display(), replaced, "new event log, rewinding");
            self.offset = 0;
            self.pending.clear();
        }
        self.identity = identity;
        if len == self.offset {
            return Vec::new();
        }
        if file.seek(SeekFrom::Start(self.offset)).is_err() {
            return Vec::new();
        }
        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        let n = match file.read_to_end(&mut buf) {
            Ok(n) => n,
            Err(_) => return Vec::new(),
        };
        self.offset += n as u64;
        self.pending.extend_from_slice(&buf);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.trim_end_matches('\r');
            if !line.trim().is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }
}
