//! HTTP路由handlers

use axum::{
    body::Bytes,
    extract::State,
    response::{Html, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use runtap_core::api::DispatchError;
use runtap_core::error::MSG_INVALID_JSON_BODY;
use runtap_core::shaper::error_response;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::http::{response::into_http_response, AppState};

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>runtap webhook</title></head>
  <body>
    <h1>runtap webhook server</h1>
    <p>POST a <code>prompt-run</code> or <code>dataset-run</code> request to <code>/</code>.</p>
    <p>Health: <a href="/health">/health</a></p>
  </body>
</html>
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: f64,
    pub timestamp: String,
}

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_handler).post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// POST / - 执行 prompt-run / dataset-run
async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            info!(
                target: "runtap.http",
                error = %e,
                bytes = body.len(),
                "rejected non-JSON webhook body"
            );
            let err = DispatchError::validation_with_details(MSG_INVALID_JSON_BODY, e.to_string());
            return into_http_response(error_response(&err));
        }
    };

    debug!(
        target: "runtap.http",
        kind = payload.get("type").and_then(serde_json::Value::as_str).unwrap_or("<none>"),
        "webhook request"
    );
    into_http_response(state.dispatcher.dispatch(&payload).await)
}

/// GET / - 首页
async fn landing_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Local::now().to_rfc3339(),
    })
}
