//! Best-effort side channel for live events (the transport bridge).

use serde_json::Value;

/// Receives a compact copy of every event and status write.
///
/// Implementations must not block and must swallow their own failures.
pub trait Broadcaster: Send + Sync {
    fn name(&self) -> &str;
    fn send_event(&self, kind: &str, payload: &Value);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn name(&self) -> &str {
        "noop"
    }

    fn send_event(&self, _kind: &str, _payload: &Value) {}
}

/// In-memory broadcaster for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    seen: std::sync::Mutex<Vec<(String, Value)>>,
}

impl RecordingBroadcaster {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.events().into_iter().map(|(k, _)| k).collect()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn name(&self) -> &str {
        "recording"
    }

    fn send_event(&self, kind: &str, payload: &Value) {
        if let Ok(mut v) = self.seen.lock() {
            v.push((kind.to_string(), payload.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_kind_and_payload() {
        let rec = RecordingBroadcaster::default();
        NoopBroadcaster.send_event("log", &serde_json::json!({"line": "ignored"}));
        rec.send_event("log", &serde_json::json!({"line": "x"}));
        rec.send_event("end", &serde_json::json!({"exitCode": 0}));
        assert_eq!(rec.kinds(), vec!["log", "end"]);
        assert_eq!(rec.events()[0].1["line"], "x");
    }
}
