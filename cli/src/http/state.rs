use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use tutor_core::api::RecordPaths;

/// Shared, read-only view of one project's records plus server controls.
#[derive(Clone)]
pub struct AppState {
    pub status_path: Arc<PathBuf>,
    pub events_path: Arc<PathBuf>,
    /// `None` disables bearer checks.
    pub token: Option<Arc<str>>,
    pub poll_interval: Duration,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        paths: &RecordPaths,
        token: Option<String>,
        poll_interval: Duration,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            status_path: Arc::new(paths.status.clone()),
            events_path: Arc::new(paths.events.clone()),
            token: token.map(Arc::from),
            poll_interval,
            shutdown_tx,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.token.is_some()
    }
}
