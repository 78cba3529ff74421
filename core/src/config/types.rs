use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Emit `::error file=..` annotations. Usually set from `CI`.
    #[serde(default)]
    pub ci: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Directory (relative to the project root) holding the record files.
    #[serde(default = "default_records_dir")]
    pub dir: String,

    #[serde(default)]
    pub status_file: Option<String>,

    #[serde(default)]
    pub events_file: Option<String>,

    /// When false the event log is the sole record.
    #[serde(default = "default_true")]
    pub persist_status: bool,
}

fn default_records_dir() -> String {
    ".tutor".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            dir: default_records_dir(),
            status_file: None,
            events_file: None,
            persist_status: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainKind {
    #[default]
    Swiftpm,
    Generic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default)]
    pub kind: ToolchainKind,

    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_true")]
    pub module_cache: bool,
}

fn default_program() -> String {
    "swift".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            kind: ToolchainKind::default(),
            program: default_program(),
            module_cache: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// `0` binds any free port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub socket_path: Option<String>,

    #[serde(default)]
    pub no_auth: bool,

    #[serde(default)]
    pub token_file: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    53127
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            socket_path: None,
            no_auth: false,
            token_file: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeKind {
    #[default]
    Udp,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub kind: BridgeKind,

    /// `host:port` for udp, a URL for http.
    #[serde(default)]
    pub target: String,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: BridgeKind::default(),
            target: String::new(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    120
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
