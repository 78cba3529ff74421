//! Side-channel transports for live events.
pub mod http;
pub mod udp;

pub use http::HttpBridge;
pub use udp::UdpBridge;

use serde_json::{json, Value};

/// Compact wire form shared by every bridge: `{"kind":..,"payload":..}`.
pub(crate) fn envelope(kind: &str, payload: &Value) -> Vec<u8> {
    serde_json::to_vec(&json!({ "kind": kind, "payload": payload })).unwrap_or_default()
}
