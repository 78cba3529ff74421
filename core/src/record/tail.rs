use std::path::Path;

use serde_json::Value;

use super::reader::read_raw;

/// Last `count` events of the log (all when `None`), oldest first.
///
/// With `errors_only` only `error` events are kept. Records are returned as
/// loose JSON so entries written by other tools still render.
pub fn last_events(path: &Path, count: Option<usize>, errors_only: bool) -> Vec<Value> {
    let Some(text) = read_raw(path) else {
        return Vec::new();
    };
    let mut events: Vec<Value> = text
        .lines()
        .filter_map(|l| serde_json::from_str::<Value>(l).ok())
        .filter(|v| !errors_only || v.get("type").and_then(Value::as_str) == Some("error"))
        .collect();
    if let Some(n) = count {
        if events.len() > n {
            events.drain(..events.len() - n);
        }
    }
    events
}

/// Single-line human rendering of one event.
pub fn one_line_event(event: &Value) -> String {
    let kind = event.get("type").and_then(Value::as_str);
    if let Some(kind @ ("warning" | "error")) = kind {
        if let Some(msg) = event
            .get(kind)
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
        {
            return format!("{kind}: {msg}");
        }
    }
    if kind == Some("log") {
        if let Some(line) = event.get("line").and_then(Value::as_str) {
            return line.to_string();
        }
    }
    serde_json::to_string(event).unwrap_or_else(|_| event.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::writer::append_event;
    use serde_json::json;

    #[test]
    fn last_events_filters_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        append_event(&path, &json!({"type": "log", "line": "A"}));
        append_event(&path, &json!({"type": "warning", "warning": {"message": "w1"}}));
        append_event(&path, &json!({"type": "error", "error": {"message": "e1"}}));
        append_event(&path, &json!({"type": "error", "error": {"message": "e2"}}));

        assert_eq!(last_events(&path, None, false).len(), 4);
        assert_eq!(last_events(&path, None, true).len(), 2);
        let last = last_events(&path, Some(1), true);
        assert_eq!(last[0]["error"]["message"], "e2");
    }

    #[test]
    fn one_line_formatting() {
        let w = one_line_event(&json!({"type": "warning", "warning": {"message": "be careful"}}));
        assert!(w.contains("warning: be careful"));
        let e = one_line_event(&json!({"type": "error", "error": {"message": "boom"}}));
        assert!(e.contains("error: boom"));
        let passthrough = one_line_event(&json!({"line": "Compiling Foo"}));
        assert!(passthrough.contains("Compiling Foo"));
    }
}
