use std::sync::Arc;

use anyhow::Result;

use tutor_core::api::{
    AppConfig, BridgeKind, Broadcaster, NoopBroadcaster, ToolchainKind, ToolchainPlanner,
};

use crate::bridge::{HttpBridge, UdpBridge};
use crate::toolchain::{GenericPlanner, SwiftPmPlanner};

/// The configured side-channel bridge, or a no-op.
///
/// A bridge that cannot be set up is logged and replaced by the no-op; the
/// side channel never blocks a run.
pub fn build_bridge(cfg: &AppConfig) -> Arc<dyn Broadcaster> {
    if !cfg.bridge.enabled || cfg.bridge.target.trim().is_empty() {
        return Arc::new(NoopBroadcaster);
    }
    match try_build_bridge(cfg) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(target: "tutor.bridge", error = %e, "bridge disabled");
            Arc::new(NoopBroadcaster)
        }
    }
}

fn try_build_bridge(cfg: &AppConfig) -> Result<Arc<dyn Broadcaster>> {
    let target = cfg.bridge.target.trim();
    match cfg.bridge.kind {
        BridgeKind::Udp => Ok(Arc::new(UdpBridge::connect(target)?)),
        BridgeKind::Http => Ok(Arc::new(HttpBridge::start(
            target,
            cfg.bridge.channel_capacity,
        )?)),
    }
}

pub fn build_toolchain(cfg: &AppConfig) -> Box<dyn ToolchainPlanner> {
    match cfg.toolchain.kind {
        ToolchainKind::Swiftpm => Box::new(SwiftPmPlanner::new(
            cfg.toolchain.program.clone(),
            cfg.toolchain.module_cache,
        )),
        ToolchainKind::Generic => Box::new(GenericPlanner::new(cfg.toolchain.program.clone())),
    }
}
