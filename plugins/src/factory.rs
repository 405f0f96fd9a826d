use std::sync::Arc;

use anyhow::Result;

use runtap_core::config::ScoringConfig;
use runtap_core::score::ScorePublisher;

use crate::score::HttpScoreSink;

pub fn build_score_publisher(cfg: &ScoringConfig) -> Result<ScorePublisher> {
    if !cfg.enabled {
        tracing::info!(target: "runtap.score", "score publishing disabled");
        return Ok(ScorePublisher::disabled());
    }

    let sink = HttpScoreSink::from_config(cfg)?;
    tracing::info!(
        target: "runtap.score",
        endpoint = %sink.endpoint(),
        max_in_flight = cfg.max_in_flight,
        "score publishing enabled"
    );
    Ok(ScorePublisher::new(Arc::new(sink), cfg.max_in_flight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtap_core::score::{EvalResult, Score};

    #[test]
    fn disabled_config_builds_noop_publisher() {
        let cfg = ScoringConfig {
            enabled: false,
            ..Default::default()
        };
        let publisher = build_score_publisher(&cfg).unwrap();
        assert!(!publisher.is_enabled());
    }

    #[tokio::test]
    async fn enabled_config_posts_to_configured_host() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/score")
            .match_header("authorization", "key-1")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let addr = server.host_with_port();
        let (host, port) = addr.rsplit_once(':').unwrap();
        let cfg = ScoringConfig {
            host: host.to_string(),
            port: port.parse().unwrap(),
            api_key: Some("key-1".into()),
            ..Default::default()
        };

        let publisher = build_score_publisher(&cfg).unwrap();
        assert!(publisher.is_enabled());

        let eval = EvalResult {
            name: "accuracy".into(),
            passed: Some(true),
            ..Default::default()
        };
        let handle = publisher.publish(Score::from_eval("t1", &eval)).unwrap();
        handle.await.unwrap();

        mock.assert_async().await;
    }
}
