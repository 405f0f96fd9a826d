use runtap_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` wins over `cfg.level`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &cfg.level);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn build_filter(rust_log: Option<&str>, fallback: &str) -> EnvFilter {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_new(fallback).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
