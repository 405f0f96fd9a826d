use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub experiment: ExperimentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Webhook listener address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    9417
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Where extracted scores are sent. Resolved once when the publisher is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_scoring_enabled")]
    pub enabled: bool,

    #[serde(default = "default_scoring_host")]
    pub host: String,

    #[serde(default = "default_scoring_port")]
    pub port: u16,

    #[serde(default = "default_scoring_timeout_ms")]
    pub timeout_ms: u64,

    /// 0 disables the bound.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub app_id: Option<String>,
}

fn default_scoring_enabled() -> bool {
    true
}

fn default_scoring_host() -> String {
    "localhost".to_string()
}

fn default_scoring_port() -> u16 {
    9418
}

fn default_scoring_timeout_ms() -> u64 {
    10_000
}

fn default_max_in_flight() -> usize {
    256
}

impl ScoringConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enabled: default_scoring_enabled(),
            host: default_scoring_host(),
            port: default_scoring_port(),
            timeout_ms: default_scoring_timeout_ms(),
            max_in_flight: default_max_in_flight(),
            api_key: None,
            app_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Used when a dataset run arrives without an `experimentId`.
    #[serde(default = "default_experiment_id")]
    pub default_id: String,
}

pub const DEFAULT_EXPERIMENT_ID: &str = "local-experiment";

fn default_experiment_id() -> String {
    DEFAULT_EXPERIMENT_ID.to_string()
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            default_id: default_experiment_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
