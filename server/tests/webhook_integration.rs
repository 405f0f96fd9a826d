//! End-to-end: real TCP listener, real HTTP client, scoring sink on mockito.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use runtap_core::api::*;
use runtap_plugins::factory::build_score_publisher;
use runtap_server::{serve_with_shutdown, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const DATASET_BODY: &str = concat!(
    r#"{"type":"dataset","traceId":"t1","result":{"evals":[{"name":"accuracy","passed":true}]}}"#,
    "\n",
    r#"{"type":"dataset","traceId":"t2","result":{"evals":[{"name":"accuracy","passed":false,"reason":"Mismatch"}]}}"#,
    "\n",
);

struct SplittingHandler;

#[async_trait]
impl ExecutionHandler for SplittingHandler {
    async fn run_prompt(&self, _ast: &Value, options: PromptOptions) -> anyhow::Result<RunResult> {
        Ok(RunResult::Object {
            result: json!({"stream": options.should_stream}),
            usage: Usage {
                prompt_tokens: 3,
                completion_tokens: 4,
                total_tokens: 7,
            },
            finish_reason: "stop".into(),
        })
    }

    async fn run_experiment(
        &self,
        _ast: &Value,
        _experiment_id: &str,
        _dataset_path: Option<&str>,
    ) -> anyhow::Result<ExperimentResult> {
        // cut the first record in half so it straddles two chunks
        let (a, b) = DATASET_BODY.as_bytes().split_at(40);
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::copy_from_slice(a)),
            Ok(Bytes::copy_from_slice(b)),
        ];
        Ok(ExperimentResult::new(Box::pin(futures::stream::iter(chunks))))
    }
}

struct Running {
    base: String,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

async fn start(scoring: ScoringConfig) -> Running {
    let publisher = build_score_publisher(&scoring).unwrap();
    let dispatcher = Dispatcher::new(
        Arc::new(SplittingHandler),
        publisher,
        &ExperimentConfig::default(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve_with_shutdown(
        listener,
        AppState::new(dispatcher),
        async move {
            let _ = rx.await;
        },
    ));

    Running {
        base,
        shutdown,
        handle,
    }
}

async fn stop(running: Running) {
    let _ = running.shutdown.send(());
    let result = tokio::time::timeout(Duration::from_secs(5), running.handle)
        .await
        .expect("server did not shut down");
    assert!(result.unwrap().is_ok());
}

fn scoring_for(server: &mockito::ServerGuard) -> ScoringConfig {
    let addr = server.host_with_port();
    let (host, port) = addr.rsplit_once(':').unwrap();
    ScoringConfig {
        host: host.to_string(),
        port: port.parse().unwrap(),
        app_id: Some("app-42".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn dataset_run_streams_and_scores() {
    let mut sink = mockito::Server::new_async().await;
    let pass = sink
        .mock("POST", "/v1/score")
        .match_header("x-agentmark-app-id", "app-42")
        .match_body(mockito::Matcher::Json(json!({
            "resourceId": "t1", "score": 1, "label": "PASS", "reason": "",
            "name": "accuracy", "type": "experiment"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let fail = sink
        .mock("POST", "/v1/score")
        .match_body(mockito::Matcher::Json(json!({
            "resourceId": "t2", "score": 0, "label": "FAIL", "reason": "Mismatch",
            "name": "accuracy", "type": "experiment"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let running = start(scoring_for(&sink)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/", running.base))
        .json(&json!({"type": "dataset-run", "data": {"ast": {"type": "root"}, "experimentId": "exp-1"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["agentmark-streaming"], "true");
    assert_eq!(resp.headers()["content-type"], "application/x-ndjson");
    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], DATASET_BODY.as_bytes());

    // publishing is detached; give it a moment to land
    for _ in 0..50 {
        if pass.matched_async().await && fail.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    pass.assert_async().await;
    fail.assert_async().await;

    stop(running).await;
}

#[tokio::test]
async fn dataset_run_survives_broken_sink() {
    let mut sink = mockito::Server::new_async().await;
    let _broken = sink
        .mock("POST", "/v1/score")
        .with_status(500)
        .create_async()
        .await;

    let running = start(scoring_for(&sink)).await;
    let resp = reqwest::Client::new()
        .post(format!("{}/", running.base))
        .json(&json!({"type": "dataset-run", "data": {"ast": {"type": "root"}}}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(&resp.bytes().await.unwrap()[..], DATASET_BODY.as_bytes());

    stop(running).await;
}

#[tokio::test]
async fn prompt_run_and_validation_over_http() {
    let running = start(ScoringConfig {
        enabled: false,
        ..Default::default()
    })
    .await;
    let client = reqwest::Client::new();
    let url = format!("{}/", running.base);

    let resp = client
        .post(&url)
        .json(&json!({"type": "prompt-run", "data": {"ast": {"type": "root"}, "options": {"shouldStream": false}}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({
            "type": "object",
            "result": {"stream": false},
            "usage": {"promptTokens": 3, "completionTokens": 4, "totalTokens": 7},
            "finishReason": "stop"
        })
    );

    let resp = client
        .post(&url)
        .json(&json!({"type": "prompt-run", "data": {"ast": null}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Invalid or missing AST object"})
    );

    let resp = client.get(format!("{}/health", running.base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap()["status"], "healthy");

    stop(running).await;
}
