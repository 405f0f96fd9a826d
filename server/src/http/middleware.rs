//! HTTP中间件配置

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// 流式响应标记头（小写形式）
const STREAMING_HEADER_NAME: &str = "agentmark-streaming";

/// 创建CORS中间件 - 仅允许localhost
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.to_str().map(is_local_origin).unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([HeaderName::from_static(STREAMING_HEADER_NAME)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "https://localhost", "http://127.0.0.1", "https://127.0.0.1"]
        .iter()
        .any(|prefix| {
            origin
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
}

/// 创建请求追踪layer
pub fn create_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// 请求日志中间件
///
/// 流式响应在 body 开始发送前即记录，duration 不包含流传输时间。
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    // 根据状态码选择日志级别
    if status.is_client_error() || status.is_server_error() {
        warn!(
            target: "runtap.http",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        info!(
            target: "runtap.http",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    async fn test_handler() -> impl IntoResponse {
        "OK"
    }

    async fn bad_request_handler() -> impl IntoResponse {
        (StatusCode::BAD_REQUEST, "nope")
    }

    #[test]
    fn test_local_origin_matching() {
        assert!(is_local_origin("http://localhost"));
        assert!(is_local_origin("http://localhost:3000"));
        assert!(is_local_origin("https://127.0.0.1:9417"));
        assert!(!is_local_origin("http://localhost.evil.com"));
        assert!(!is_local_origin("http://example.com"));
    }

    #[tokio::test]
    async fn test_cors_localhost_allowed() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(create_cors_layer());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("Origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        let cors_header = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok());
        assert_eq!(cors_header, Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn test_cors_foreign_origin_rejected() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(create_cors_layer());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("Origin", "https://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = Router::new()
            .route("/", post(test_handler))
            .layer(create_cors_layer());

        // OPTIONS preflight
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("Origin", "http://127.0.0.1:5173")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert!(response
            .headers()
            .get("access-control-allow-methods")
            .is_some());
    }

    #[tokio::test]
    async fn test_request_logger() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .route("/bad", get(bad_request_handler))
            .layer(middleware::from_fn(request_logger));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/bad")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
