//! Webhook transport for runtap: an axum server that accepts run requests,
//! hands them to the dispatcher and streams results back.

pub mod http;
pub mod logging;

use std::sync::Arc;

use runtap_core::api::{AppConfig, Dispatcher, ExecutionHandler};
use runtap_plugins::factory::build_score_publisher;

pub use http::server::{serve_with_shutdown, start_server};
pub use http::AppState;

/// Wires the score publisher and dispatcher from `cfg` and serves until a
/// shutdown signal arrives.
pub async fn serve(handler: Arc<dyn ExecutionHandler>, cfg: AppConfig) -> anyhow::Result<()> {
    let publisher = build_score_publisher(&cfg.scoring)?;
    let dispatcher = Dispatcher::new(handler, publisher, &cfg.experiment);
    let state = AppState::new(dispatcher);

    start_server(&cfg.server, state).await
}
