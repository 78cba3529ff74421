use std::net::UdpSocket;

use anyhow::{Context, Result};
use serde_json::Value;
use tutor_core::api::Broadcaster;

use super::envelope;

/// One datagram per event to a fixed `host:port`. Fire and forget.
pub struct UdpBridge {
    socket: UdpSocket,
    target: String,
}

impl UdpBridge {
    pub fn connect(target: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("bind udp bridge socket")?;
        socket
            .connect(target)
            .with_context(|| format!("udp bridge target {target}"))?;
        socket
            .set_nonblocking(true)
            .context("udp bridge nonblocking")?;
        tracing::info!(target: "tutor.bridge", target_addr = %target, "udp bridge ready");
        Ok(Self {
            socket,
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Broadcaster for UdpBridge {
    fn name(&self) -> &str {
        "udp"
    }

    fn send_event(&self, kind: &str, payload: &Value) {
        let bytes = envelope(kind, payload);
        if let Err(e) = self.socket.send(&bytes) {
            tracing::trace!(target: "tutor.bridge", error = %e, "udp send dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn delivers_compact_envelope() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let addr = rx.local_addr().unwrap().to_string();

        let bridge = UdpBridge::connect(&addr).unwrap();
        bridge.send_event("log", &serde_json::json!({"line": "Compiling Foo"}));

        let mut buf = [0u8; 2048];
        let n = rx.recv(&mut buf).unwrap();
        let v: Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(v["kind"], "log");
        assert_eq!(v["payload"]["line"], "Compiling Foo");
    }

    #[test]
    fn unreachable_target_is_silent() {
        // nothing listens on this port; send must still return quietly
        let bridge = UdpBridge::connect("127.0.0.1:9").unwrap();
        for _ in 0..3 {
            bridge.send_event("status", &serde_json::json!({"phase": "linking"}));
        }
    }
}
