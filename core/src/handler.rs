use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{ExperimentResult, RunResult};

/// Options forwarded to [`ExecutionHandler::run_prompt`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptOptions {
    /// Passed through as the caller sent it; `None` lets the handler decide.
    pub should_stream: Option<bool>,
    pub custom_props: Option<Map<String, Value>>,
}

/// Model/provider specific runner that actually executes prompts.
///
/// Errors are reported as `anyhow::Error` so any implementation can bubble up
/// its own error types; only the message reaches the caller.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    async fn run_prompt(&self, ast: &Value, options: PromptOptions) -> anyhow::Result<RunResult>;

    async fn run_experiment(
        &self,
        ast: &Value,
        experiment_id: &str,
        dataset_path: Option<&str>,
    ) -> anyhow::Result<ExperimentResult>;
}
