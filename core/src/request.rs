//! Inbound run requests.
//!
//! The wire envelope is `{ "type": "...", "data": { "ast": {...}, ... } }`. The
//! string tag only exists at this boundary; everything past [`validate_request`]
//! works with the exhaustive [`RunRequest`] enum.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DispatchError, MSG_INVALID_AST, MSG_INVALID_PAYLOAD, MSG_UNKNOWN_EVENT};

pub const PROMPT_RUN: &str = "prompt-run";
pub const DATASET_RUN: &str = "dataset-run";

#[derive(Debug, Clone, PartialEq)]
pub enum RunRequest {
    PromptRun(PromptRun),
    DatasetRun(DatasetRun),
}

impl RunRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            RunRequest::PromptRun(_) => PROMPT_RUN,
            RunRequest::DatasetRun(_) => DATASET_RUN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRun {
    pub ast: Value,
    #[serde(default)]
    pub custom_props: Option<Map<String, Value>>,
    #[serde(default)]
    pub options: Option<RunOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    #[serde(default)]
    pub should_stream: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRun {
    pub ast: Value,
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub dataset_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    data: Value,
}

/// Checks the request body and turns it into a typed [`RunRequest`].
///
/// The AST is checked before the tag, so a body with neither reports the AST.
pub fn validate_request(body: &Value) -> Result<RunRequest, DispatchError> {
    // serde would also take a positional array for the envelope struct
    if !body.is_object() {
        return Err(DispatchError::validation_with_details(
            MSG_INVALID_PAYLOAD,
            "request body must be a JSON object",
        ));
    }
    let envelope = Envelope::deserialize(body)
        .map_err(|e| DispatchError::validation_with_details(MSG_INVALID_PAYLOAD, e.to_string()))?;

    if !is_structured(envelope.data.get("ast")) {
        return Err(DispatchError::validation(MSG_INVALID_AST));
    }

    match envelope.kind.as_ref().and_then(Value::as_str) {
        Some(PROMPT_RUN) => decode(envelope.data).map(RunRequest::PromptRun),
        Some(DATASET_RUN) => decode(envelope.data).map(RunRequest::DatasetRun),
        _ => Err(DispatchError::validation(MSG_UNKNOWN_EVENT)),
    }
}

/// Objects and arrays count as structured; scalars and null do not.
fn is_structured(ast: Option<&Value>) -> bool {
    matches!(ast, Some(Value::Object(_)) | Some(Value::Array(_)))
}

fn decode<T: for<'de> Deserialize<'de>>(data: Value) -> Result<T, DispatchError> {
    serde_json::from_value(data)
        .map_err(|e| DispatchError::validation_with_details(MSG_INVALID_PAYLOAD, e.to_string()))
}
