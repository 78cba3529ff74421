use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

pub const CONFIG_FILE: &str = "tutor.toml";

/// Project root: explicit `--dir`, else `TUTOR_DIR`, else the current directory.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match std::env::var("TUTOR_DIR") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(expand(&v)),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Load `<root>/tutor.toml` (if present) and apply environment overrides.
pub fn load_config(root: &Path) -> Result<AppConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let mut cfg = if path.exists() {
        let s = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok())?;
    Ok(cfg)
}

/// Overlay non-empty environment values on `cfg`.
///
/// `lookup` is injected so tests don't have to mutate the process environment.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("TUTOR_STATUS_FILE") {
        cfg.records.status_file = Some(v);
    }
    if let Some(v) = get("TUTOR_EVENTS_FILE") {
        cfg.records.events_file = Some(v);
    }
    if let Some(v) = get("TUTOR_NO_STATUS") {
        cfg.records.persist_status = !parse_bool("TUTOR_NO_STATUS", &v)?;
    }
    if let Some(v) = get("TUTOR_PORT") {
        cfg.server.port = v.trim().parse().map_err(|_| ConfigError::EnvInvalid {
            key: "TUTOR_PORT".into(),
            value: v.clone(),
        })?;
    }
    if let Some(v) = get("TUTOR_NO_AUTH") {
        cfg.server.no_auth = parse_bool("TUTOR_NO_AUTH", &v)?;
    }
    if let Some(v) = get("TUTOR_SOCKET") {
        cfg.server.socket_path = Some(v);
    }
    if let Some(v) = get("TUTOR_TOOLCHAIN") {
        cfg.toolchain.program = v;
    }
    if let Some(v) = get("TUTOR_BRIDGE_TARGET") {
        cfg.bridge.target = v;
        cfg.bridge.enabled = true;
    }
    if let Some(v) = get("TUTOR_CI") {
        cfg.ci = parse_bool("TUTOR_CI", &v)?;
    } else if let Some(v) = get("CI") {
        // CI providers set this loosely; anything but an explicit false counts
        cfg.ci = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no");
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvInvalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// `~` and `$VAR` expansion for configured paths; falls back to the raw input.
pub fn expand(raw: &str) -> String {
    shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
