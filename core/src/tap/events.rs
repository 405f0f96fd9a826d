use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::score::{EvalResult, Score};

pub const EVENT_DATASET: &str = "dataset";

/// One decoded record of a dataset-run stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub run_name: Option<String>,
    #[serde(default)]
    pub result: Option<DatasetItemResult>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetItemResult {
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub actual_output: Value,
    #[serde(default)]
    pub expected_output: Option<Value>,
    #[serde(default, deserialize_with = "evals_each")]
    pub evals: Vec<EvalResult>,
}

/// Decodes evals one at a time so a single mistyped entry does not take its
/// siblings down with it. Entries that fail to decode are skipped.
fn evals_each<'de, D>(deserializer: D) -> Result<Vec<EvalResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match EvalResult::deserialize(value) {
            Ok(eval) => Some(eval),
            Err(e) => {
                tracing::debug!(
                    target: "runtap.tap",
                    index,
                    error = %e,
                    "skipping undecodable eval"
                );
                None
            }
        })
        .collect())
}

#[derive(Debug, PartialEq)]
pub enum LineOutcome {
    Blank,
    Malformed,
    /// Valid record of another type (`text`, `object`, `error`, `done`, ...).
    Other,
    Dataset(DatasetEvent),
}

pub fn parse_line(line: &[u8]) -> LineOutcome {
    let Ok(text) = std::str::from_utf8(line) else {
        return LineOutcome::Malformed;
    };
    let text = text.trim();
    if text.is_empty() {
        return LineOutcome::Blank;
    }

    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return LineOutcome::Malformed;
    };
    if value.get("type").and_then(Value::as_str) != Some(EVENT_DATASET) {
        return LineOutcome::Other;
    }

    match DatasetEvent::deserialize(value) {
        Ok(event) => LineOutcome::Dataset(event),
        Err(_) => LineOutcome::Malformed,
    }
}

impl DatasetEvent {
    /// Scores carried by this event: one per eval, or none when the event has
    /// no trace id or no evals.
    pub fn scores(&self) -> Vec<Score> {
        let Some(trace_id) = self.trace_id.as_deref().filter(|id| !id.is_empty()) else {
            return Vec::new();
        };
        let Some(result) = &self.result else {
            return Vec::new();
        };

        result
            .evals
            .iter()
            .map(|eval| Score::from_eval(trace_id, eval))
            .collect()
    }
}
