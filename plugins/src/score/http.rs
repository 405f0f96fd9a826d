use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use runtap_core::config::ScoringConfig;
use runtap_core::error::PublishError;
use runtap_core::score::{Score, ScoreSink};

pub const SCORE_PATH: &str = "/v1/score";
pub const APP_ID_HEADER: &str = "X-Agentmark-App-Id";

const BODY_SNIPPET_CHARS: usize = 200;

/// Posts each score as JSON to `{base_url}/v1/score`.
pub struct HttpScoreSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    app_id: Option<String>,
}

impl HttpScoreSink {
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: Option<String>,
        app_id: Option<String>,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        let endpoint = format!("{}{}", base_url.as_ref().trim_end_matches('/'), SCORE_PATH);
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
            app_id: app_id.filter(|a| !a.is_empty()),
        })
    }

    pub fn from_config(cfg: &ScoringConfig) -> anyhow::Result<Self> {
        Self::new(
            cfg.base_url(),
            cfg.api_key.clone(),
            cfg.app_id.clone(),
            cfg.timeout_ms,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoreSink for HttpScoreSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, score: &Score) -> Result<(), PublishError> {
        let body = serde_json::to_vec(score).map_err(PublishError::Encode)?;

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(key) = &self.api_key {
            req = req.header(AUTHORIZATION, key);
        }
        if let Some(app_id) = &self.app_id {
            req = req.header(APP_ID_HEADER, app_id);
        }

        let resp = req.send().await.map_err(map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PublishError::HttpStatus {
                status: status.as_u16(),
                body_snippet: text.chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        tracing::trace!(
            target: "runtap.score",
            resource_id = %score.resource_id,
            name = %score.name,
            "score accepted"
        );
        Ok(())
    }
}

fn map_transport(err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        PublishError::Timeout
    } else {
        PublishError::Transport(err.into())
    }
}
