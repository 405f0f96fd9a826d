//! HTTP传输层

pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Instant;

use runtap_core::api::Dispatcher;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
