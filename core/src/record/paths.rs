use std::path::{Path, PathBuf};

use crate::config::{expand, RecordsConfig};

pub const STATUS_FILE: &str = "status.json";
pub const EVENTS_FILE: &str = "events.ndjson";
pub const SERVE_INFO_FILE: &str = "serve.json";
pub const TOKEN_FILE: &str = "serve.token";

/// Where one project's records live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPaths {
    pub dir: PathBuf,
    pub status: PathBuf,
    pub events: PathBuf,
    /// False when the event log is the only record kept.
    pub persist_status: bool,
}

impl RecordPaths {
    /// Default layout: `<root>/.tutor/{status.json,events.ndjson}`.
    pub fn under(root: &Path) -> Self {
        Self::resolve(root, &RecordsConfig::default())
    }

    pub fn resolve(root: &Path, cfg: &RecordsConfig) -> Self {
        let dir = join_root(root, &cfg.dir);
        let status = cfg
            .status_file
            .as_deref()
            .map(|p| join_root(root, p))
            .unwrap_or_else(|| dir.join(STATUS_FILE));
        let events = cfg
            .events_file
            .as_deref()
            .map(|p| join_root(root, p))
            .unwrap_or_else(|| dir.join(EVENTS_FILE));
        Self {
            dir,
            status,
            events,
            persist_status: cfg.persist_status,
        }
    }

    pub fn serve_info(&self) -> PathBuf {
        self.dir.join(SERVE_INFO_FILE)
    }

    pub fn token(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

fn join_root(root: &Path, raw: &str) -> PathBuf {
    let p = PathBuf::from(expand(raw));
    if p.is_absolute() {
        p
    } else {
        root.join(p)
    }
}
