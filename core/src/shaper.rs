//! Turns handler results into [`WireResponse`]s.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::json;

use crate::error::{DispatchError, MSG_MISSING_EXPERIMENT_STREAM};
use crate::score::ScorePublisher;
use crate::tap::tap_stream;
use crate::types::{default_stream_headers, ExperimentResult, RunResult, WireResponse};

pub fn shape_run_result(result: RunResult) -> WireResponse {
    match result {
        RunResult::Text {
            result,
            usage,
            finish_reason,
        } => WireResponse::Json {
            data: json!({
                "type": "text",
                "result": result,
                "usage": usage,
                "finishReason": finish_reason,
            }),
            status: 200,
        },
        RunResult::Object {
            result,
            usage,
            finish_reason,
        } => WireResponse::Json {
            data: json!({
                "type": "object",
                "result": result,
                "usage": usage,
                "finishReason": finish_reason,
            }),
            status: 200,
        },
        RunResult::Stream {
            stream,
            stream_header,
        } => WireResponse::Stream {
            stream,
            headers: stream_header.unwrap_or_else(default_stream_headers),
        },
    }
}

/// Dataset-run streams always leave through the score tap.
pub fn shape_experiment_result(
    result: ExperimentResult,
    publisher: &ScorePublisher,
) -> Result<WireResponse, DispatchError> {
    let stream = result
        .stream
        .ok_or_else(|| DispatchError::Contract(MSG_MISSING_EXPERIMENT_STREAM.to_string()))?;

    Ok(WireResponse::Stream {
        stream: tap_stream(stream, publisher.clone()),
        headers: result.stream_headers,
    })
}

pub fn error_response(err: &DispatchError) -> WireResponse {
    WireResponse::Error {
        error: err.to_string(),
        details: err.details().cloned(),
        status: err.status(),
    }
}

/// Awaits a handler call and folds both returned errors and panics into
/// [`DispatchError::Execution`].
pub async fn run_guarded<T, F>(call: F) -> Result<T, DispatchError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(DispatchError::Execution(err.to_string())),
        Err(payload) => Err(DispatchError::Execution(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "execution handler panicked".to_string()
    }
}
