use serde::{Deserialize, Serialize};
use serde_json::Number;

pub const SCORE_TYPE_EXPERIMENT: &str = "experiment";
pub const LABEL_PASS: &str = "PASS";
pub const LABEL_FAIL: &str = "FAIL";

/// One scoring rule applied to one dataset item, as emitted in the stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

/// Sink-ready record; the body of `POST /v1/score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub resource_id: String,
    pub score: Number,
    pub label: String,
    pub reason: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Score {
    /// Explicit fields win. Otherwise `passed == Some(true)` gives 1/PASS and
    /// anything else, including no verdict at all, gives 0/FAIL.
    pub fn from_eval(resource_id: &str, eval: &EvalResult) -> Self {
        let passed = eval.passed == Some(true);

        let derived_label = if passed { LABEL_PASS } else { LABEL_FAIL };
        let label = eval
            .label
            .clone()
            .unwrap_or_else(|| derived_label.to_string());
        let score = eval
            .score
            .clone()
            .unwrap_or_else(|| Number::from(u8::from(passed)));

        Self {
            resource_id: resource_id.to_string(),
            score,
            label,
            reason: eval.reason.clone().unwrap_or_default(),
            name: eval.name.clone(),
            kind: SCORE_TYPE_EXPERIMENT.to_string(),
        }
    }
}
