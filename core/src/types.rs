use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Byte stream produced by an execution handler and handed to the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'static>>;

/// Response header set, ordered so rendering is deterministic.
pub type Headers = BTreeMap<String, String>;

/// Boolean header that tells clients the body is NDJSON streamed output.
pub const STREAMING_HEADER: &str = "AgentMark-Streaming";

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

pub fn default_stream_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(STREAMING_HEADER.to_string(), "true".to_string());
    headers
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Output of a single prompt run.
pub enum RunResult {
    Text {
        result: Value,
        usage: Usage,
        finish_reason: String,
    },
    Object {
        result: Value,
        usage: Usage,
        finish_reason: String,
    },
    Stream {
        stream: ByteStream,
        stream_header: Option<Headers>,
    },
}

impl fmt::Debug for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunResult::Text { finish_reason, .. } => f
                .debug_struct("Text")
                .field("finish_reason", finish_reason)
                .finish_non_exhaustive(),
            RunResult::Object { finish_reason, .. } => f
                .debug_struct("Object")
                .field("finish_reason", finish_reason)
                .finish_non_exhaustive(),
            RunResult::Stream { stream_header, .. } => f
                .debug_struct("Stream")
                .field("stream_header", stream_header)
                .finish_non_exhaustive(),
        }
    }
}

/// Output of a dataset run. A handler that leaves `stream` empty has broken
/// its contract; the shaper turns that into a 500.
pub struct ExperimentResult {
    pub stream: Option<ByteStream>,
    pub stream_headers: Headers,
}

impl ExperimentResult {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream: Some(stream),
            stream_headers: default_stream_headers(),
        }
    }
}

impl fmt::Debug for ExperimentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentResult")
            .field("has_stream", &self.stream.is_some())
            .field("stream_headers", &self.stream_headers)
            .finish()
    }
}

/// The only thing the dispatcher hands to a transport.
pub enum WireResponse {
    Json {
        data: Value,
        status: u16,
    },
    Stream {
        stream: ByteStream,
        headers: Headers,
    },
    Error {
        error: String,
        details: Option<Value>,
        status: u16,
    },
}

impl WireResponse {
    pub fn status(&self) -> u16 {
        match self {
            WireResponse::Json { status, .. } | WireResponse::Error { status, .. } => *status,
            WireResponse::Stream { .. } => 200,
        }
    }

    /// `{error, details?}` body for error responses.
    pub fn error_body(error: &str, details: Option<&Value>) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("error".to_string(), Value::String(error.to_string()));
        if let Some(details) = details {
            body.insert("details".to_string(), details.clone());
        }
        Value::Object(body)
    }
}

impl fmt::Debug for WireResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireResponse::Json { data, status } => f
                .debug_struct("Json")
                .field("data", data)
                .field("status", status)
                .finish(),
            WireResponse::Stream { headers, .. } => f
                .debug_struct("Stream")
                .field("headers", headers)
                .finish_non_exhaustive(),
            WireResponse::Error {
                error,
                details,
                status,
            } => f
                .debug_struct("Error")
                .field("error", error)
                .field("details", details)
                .field("status", status)
                .finish(),
        }
    }
}
