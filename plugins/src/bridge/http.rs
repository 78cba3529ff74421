use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tutor_core::api::Broadcaster;

use super::envelope;

/// Posts each event to a webhook from a background worker.
///
/// `send_event` never waits: a full queue drops the event and bumps a counter.
/// Must be constructed inside a tokio runtime.
pub struct HttpBridge {
    tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: Arc<AtomicU64>,
    url: String,
}

impl HttpBridge {
    pub fn start(url: &str, capacity: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("build http bridge client")?;
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(capacity.max(1));
        let target = url.to_string();

        let worker = tokio::spawn(async move {
            let mut failures = 0u64;
            while let Some(body) = rx.recv().await {
                let res = client
                    .post(&target)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
                    .await;
                if let Err(e) = res {
                    failures += 1;
                    if failures == 1 || failures % 100 == 0 {
                        tracing::debug!(target: "tutor.bridge", error = %e, failures, "http bridge post failed");
                    }
                }
            }
        });

        tracing::info!(target: "tutor.bridge", url = %url, capacity, "http bridge started");
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            dropped: Arc::new(AtomicU64::new(0)),
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting events and wait until queued ones were posted.
    pub async fn shutdown(&self) {
        let tx = self.tx.lock().ok().and_then(|mut g| g.take());
        drop(tx);
        let worker = self.worker.lock().ok().and_then(|mut g| g.take());
        if let Some(w) = worker {
            let _ = w.await;
        }
    }
}

impl Broadcaster for HttpBridge {
    fn name(&self) -> &str {
        "http"
    }

    fn send_event(&self, kind: &str, payload: &Value) {
        let Ok(guard) = self.tx.lock() else {
            return;
        };
        let Some(tx) = guard.as_ref() else {
            return;
        };
        if tx.try_send(envelope(kind, payload)).is_err() {
            let count = self.dropped.fetch_add(1, Ordering::Relaxed);
            // Log every 100 dropped events to avoid log spam
            if count % 100 == 0 {
                tracing::warn!(
                    target: "tutor.bridge",
                    dropped_total = count + 1,
                    "http bridge queue full, events are being dropped"
                );
            }
        }
    }
}
