use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use super::phase::{Command, Phase};
use super::summary::FailureSummary;

/// One record of the append-only event log (`events.ndjson`).
///
/// On the wire the kind is the `type` field and the payload fields sit next to
/// `ts`, e.g. `{"ts":"…","type":"log","line":"Compiling Foo"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub ts: String,
    #[serde(flatten)]
    pub body: EventBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventBody {
    Start {
        title: String,
        command: Command,
    },
    Log {
        line: String,
    },
    Warning {
        warning: Diagnostic,
    },
    Error {
        error: Diagnostic,
    },
    End {
        #[serde(rename = "exitCode")]
        exit_code: i32,
    },
    Crash {
        message: String,
    },
    Status {
        phase: Phase,
        #[serde(rename = "statusText", default)]
        status_text: String,
    },
    Summary {
        summary: FailureSummary,
    },
}

impl Event {
    pub fn now(body: EventBody) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            body,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }
}

impl EventBody {
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::Start { .. } => "start",
            EventBody::Log { .. } => "log",
            EventBody::Warning { .. } => "warning",
            EventBody::Error { .. } => "error",
            EventBody::End { .. } => "end",
            EventBody::Crash { .. } => "crash",
            EventBody::Status { .. } => "status",
            EventBody::Summary { .. } => "summary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_shape_is_flat_with_type_tag() {
        let ev = Event {
            ts: "2024-01-01T00:00:00Z".into(),
            body: EventBody::End { exit_code: 3 },
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"ts": "2024-01-01T00:00:00Z", "type": "end", "exitCode": 3})
        );
    }

    #[test]
    fn reads_records_without_timestamp() {
        let ev: Event =
            serde_json::from_str(r#"{"type":"warning","warning":{"message":"minor"}}"#).unwrap();
        assert_eq!(ev.ts, "");
        match ev.body {
            EventBody::Warning { warning } => {
                assert_eq!(warning.message, "minor");
                assert_eq!(warning.line, 0);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn kind_matches_type_tag() {
        let ev = Event::now(EventBody::Crash {
            message: "no such file".into(),
        });
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], ev.kind());
    }
}
