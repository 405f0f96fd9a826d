//! HTTP服务器生命周期管理

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::middleware;
use runtap_core::config::ServerConfig;
use tokio::{net::TcpListener, signal};
use tracing::info;

use crate::http::{
    middleware::{create_cors_layer, create_trace_layer, request_logger},
    routes::create_router,
    AppState,
};

/// 启动HTTP服务器，直到收到 Ctrl+C 或 SIGTERM
pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// 在已绑定的 listener 上提供服务，`shutdown` 完成后优雅关闭
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_trace_layer())
        .layer(create_cors_layer());

    let addr = listener.local_addr()?;
    info!(target: "runtap.http", "webhook server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(target: "runtap.http", "Starting graceful shutdown...");
        })
        .await?;

    info!(target: "runtap.http", "Server shutdown complete");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!(target: "runtap.http", "Received Ctrl+C signal");
        }
        _ = wait_for_sigterm() => {
            info!(target: "runtap.http", "Received SIGTERM signal");
        }
    }
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(target: "runtap.http", error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtap_core::api::{Dispatcher, ExperimentConfig, ScorePublisher};
    use std::time::Duration;
    use tokio::sync::oneshot;

    struct NeverCalled;

    #[async_trait::async_trait]
    impl runtap_core::api::ExecutionHandler for NeverCalled {
        async fn run_prompt(
            &self,
            _ast: &serde_json::Value,
            _options: runtap_core::api::PromptOptions,
        ) -> anyhow::Result<runtap_core::api::RunResult> {
            anyhow::bail!("not used")
        }

        async fn run_experiment(
            &self,
            _ast: &serde_json::Value,
            _experiment_id: &str,
            _dataset_path: Option<&str>,
        ) -> anyhow::Result<runtap_core::api::ExperimentResult> {
            anyhow::bail!("not used")
        }
    }

    fn test_state() -> AppState {
        AppState::new(Dispatcher::new(
            std::sync::Arc::new(NeverCalled),
            ScorePublisher::disabled(),
            &ExperimentConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_server_lifecycle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(serve_with_shutdown(listener, test_state(), async move {
            let _ = shutdown_rx.await;
        }));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(Duration::from_secs(5), server_handle).await;
        assert!(result.is_ok(), "Server should shutdown gracefully");
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_listen_address() {
        let config = ServerConfig {
            host: "not a host".into(),
            port: 9417,
        };
        let err = start_server(&config, test_state()).await.unwrap_err();
        assert!(err.to_string().contains("invalid listen address"));
    }
}
