use std::path::Path;

use crate::error::ConfigError;

use super::types::AppConfig;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads `config.toml` from the working directory when present, then applies
/// `RUNTAP_*` environment overrides.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let mut cfg = if Path::new(DEFAULT_CONFIG_FILE).exists() {
        load_from_path(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(ConfigError::Parse)
}

/// Blank values are ignored so an exported-but-empty variable does not wipe a
/// file setting.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("RUNTAP_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = get("RUNTAP_SERVER_PORT") {
        cfg.server.port = parse_port("RUNTAP_SERVER_PORT", &v)?;
    }
    if let Some(v) = get("RUNTAP_SCORE_HOST") {
        cfg.scoring.host = v;
    }
    if let Some(v) = get("RUNTAP_SCORE_PORT") {
        cfg.scoring.port = parse_port("RUNTAP_SCORE_PORT", &v)?;
    }
    if let Some(v) = get("RUNTAP_SCORE_API_KEY") {
        cfg.scoring.api_key = Some(v);
    }
    if let Some(v) = get("RUNTAP_SCORE_APP_ID") {
        cfg.scoring.app_id = Some(v);
    }
    if let Some(v) = get("RUNTAP_DEFAULT_EXPERIMENT_ID") {
        cfg.experiment.default_id = v;
    }

    Ok(())
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::EnvInvalid {
            key: key.to_string(),
            source: anyhow::Error::new(e),
        })
}
