use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use tutor_core::api::{read_raw, EventTail};

use super::AppState;

/// GET /events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(target: "tutor.serve", "sse subscriber connected");
    let stream = event_stream(
        state.status_path.clone(),
        state.events_path.clone(),
        state.poll_interval,
        state.shutdown_tx.subscribe(),
    );
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Current snapshot as a `status` event, then every line appended to the log
/// after the subscription started. Ends on server shutdown, or when the client
/// goes away and the stream is dropped.
pub fn event_stream(
    status_path: Arc<PathBuf>,
    events_path: Arc<PathBuf>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let mut tail = EventTail::from_end(events_path.as_path());
        if let Some(raw) = read_raw(&status_path) {
            yield Ok(Event::default().event("status").data(single_line(&raw)));
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }
            for line in tail.poll() {
                yield Ok(to_sse_event(&line));
            }
        }
    }
}

/// `event: <type>` with the record as data; unparseable lines go out as `log`.
pub fn to_sse_event(line: &str) -> Event {
    let kind = serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|v| v.get("type").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "log".to_string());
    Event::default().event(kind).data(single_line(line))
}

pub(crate) fn single_line(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(v) => serde_json::to_string(&v).unwrap_or_else(|_| raw.trim().replace('\n', " ")),
        Err(_) => raw.trim().replace(['\r', '\n'], " "),
    }
}
