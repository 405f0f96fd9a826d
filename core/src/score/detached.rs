use std::fmt::Display;
use std::future::Future;

use tokio::task::JoinHandle;

/// Spawns `task` without anyone awaiting its outcome.
///
/// Failures are logged at debug level and dropped. The returned handle is only
/// there so tests can wait for completion; production callers ignore it.
pub fn spawn_detached<F, E>(label: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = task.await {
            tracing::debug!(
                target: "runtap.score",
                task = label,
                error = %err,
                "detached task failed"
            );
        }
    })
}
