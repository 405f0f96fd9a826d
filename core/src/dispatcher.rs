use std::sync::Arc;

use serde_json::Value;

use crate::config::ExperimentConfig;
use crate::error::DispatchError;
use crate::handler::{ExecutionHandler, PromptOptions};
use crate::request::{validate_request, DatasetRun, PromptRun, RunRequest};
use crate::score::ScorePublisher;
use crate::shaper::{error_response, run_guarded, shape_experiment_result, shape_run_result};
use crate::types::WireResponse;

/// Routes validated run requests to the execution handler and shapes what
/// comes back. Holds no per-request state; one instance serves every request.
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn ExecutionHandler>,
    publisher: ScorePublisher,
    default_experiment_id: String,
}

impl Dispatcher {
    pub fn new(
        handler: Arc<dyn ExecutionHandler>,
        publisher: ScorePublisher,
        experiment: &ExperimentConfig,
    ) -> Self {
        Self {
            handler,
            publisher,
            default_experiment_id: experiment.default_id.clone(),
        }
    }

    /// Validates a raw request body and runs it. Always produces exactly one
    /// response.
    pub async fn dispatch(&self, body: &Value) -> WireResponse {
        match validate_request(body) {
            Ok(request) => self.dispatch_request(request).await,
            Err(err) => {
                tracing::info!(
                    target: "runtap.dispatch",
                    error = %err,
                    "rejected run request"
                );
                error_response(&err)
            }
        }
    }

    pub async fn dispatch_request(&self, request: RunRequest) -> WireResponse {
        let kind = request.kind();
        match self.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    target: "runtap.dispatch",
                    kind,
                    status = err.status(),
                    error = %err,
                    "run request failed"
                );
                error_response(&err)
            }
        }
    }

    async fn execute(&self, request: RunRequest) -> Result<WireResponse, DispatchError> {
        match request {
            RunRequest::PromptRun(run) => self.run_prompt(run).await,
            RunRequest::DatasetRun(run) => self.run_dataset(run).await,
        }
    }

    async fn run_prompt(&self, run: PromptRun) -> Result<WireResponse, DispatchError> {
        let options = PromptOptions {
            should_stream: run.options.and_then(|o| o.should_stream),
            custom_props: run.custom_props,
        };
        tracing::debug!(
            target: "runtap.dispatch",
            should_stream = ?options.should_stream,
            "dispatching prompt-run"
        );

        let result = run_guarded(self.handler.run_prompt(&run.ast, options)).await?;
        Ok(shape_run_result(result))
    }

    async fn run_dataset(&self, run: DatasetRun) -> Result<WireResponse, DispatchError> {
        let experiment_id = run
            .experiment_id
            .unwrap_or_else(|| self.default_experiment_id.clone());
        tracing::debug!(
            target: "runtap.dispatch",
            experiment_id = %experiment_id,
            dataset_path = ?run.dataset_path,
            "dispatching dataset-run"
        );

        let result = run_guarded(self.handler.run_experiment(
            &run.ast,
            &experiment_id,
            run.dataset_path.as_deref(),
        ))
        .await?;
        shape_experiment_result(result, &self.publisher)
    }
}
