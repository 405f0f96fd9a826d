//! WireResponse 到 HTTP 响应的渲染

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use runtap_core::api::{WireResponse, NDJSON_CONTENT_TYPE};
use tracing::warn;

/// 渲染单个 WireResponse
pub fn into_http_response(resp: WireResponse) -> Response {
    match resp {
        WireResponse::Json { data, status } => (status_code(status), Json(data)).into_response(),
        WireResponse::Stream { stream, headers } => {
            let mut response = Response::new(Body::from_stream(stream));
            let out = response.headers_mut();
            for (name, value) in &headers {
                match (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    (Ok(name), Ok(value)) => {
                        out.insert(name, value);
                    }
                    _ => warn!(
                        target: "runtap.http",
                        header = %name,
                        "dropping invalid stream header"
                    ),
                }
            }
            // 流式响应默认为 NDJSON
            if !out.contains_key(header::CONTENT_TYPE) {
                out.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(NDJSON_CONTENT_TYPE),
                );
            }
            response
        }
        WireResponse::Error {
            error,
            details,
            status,
        } => (
            status_code(status),
            Json(WireResponse::error_body(&error, details.as_ref())),
        )
            .into_response(),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
