use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::PublishError;

use super::detached::spawn_detached;
use super::model::Score;

/// Destination for extracted scores.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, score: &Score) -> Result<(), PublishError>;
}

/// Fire-and-forget front of a [`ScoreSink`].
///
/// `publish` never blocks and never reports failure. When `max_in_flight`
/// sends are already pending the new score is dropped, the same way a full
/// events channel drops lines.
#[derive(Clone)]
pub struct ScorePublisher {
    sink: Option<Arc<dyn ScoreSink>>,
    in_flight: Option<Arc<Semaphore>>,
    max_in_flight: usize,
    dropped: Arc<AtomicU64>,
}

impl ScorePublisher {
    pub fn new(sink: Arc<dyn ScoreSink>, max_in_flight: usize) -> Self {
        let in_flight = (max_in_flight > 0).then(|| Arc::new(Semaphore::new(max_in_flight)));
        Self {
            sink: Some(sink),
            in_flight,
            max_in_flight,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A publisher that discards every score.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            in_flight: None,
            max_in_flight: 0,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Launches the send in the background. Returns `None` when nothing was
    /// spawned (publisher disabled or at capacity).
    pub fn publish(&self, score: Score) -> Option<JoinHandle<()>> {
        let sink = self.sink.clone()?;

        let permit = match &self.in_flight {
            Some(sem) => match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.note_dropped(&score);
                    return None;
                }
            },
            None => None,
        };

        Some(spawn_detached("score.publish", async move {
            let _permit = permit;
            let result = sink.send(&score).await;
            match &result {
                Ok(()) => tracing::debug!(
                    target: "runtap.score",
                    sink = sink.name(),
                    resource_id = %score.resource_id,
                    name = %score.name,
                    "score published"
                ),
                Err(err) => tracing::debug!(
                    target: "runtap.score",
                    sink = sink.name(),
                    resource_id = %score.resource_id,
                    name = %score.name,
                    error = ?err,
                    "score publish failed"
                ),
            }
            result
        }))
    }

    fn note_dropped(&self, score: &Score) {
        let count = self.dropped.fetch_add(1, Ordering::Relaxed);
        // Log every 100 dropped scores to avoid log spam
        if count.is_multiple_of(100) {
            tracing::warn!(
                target: "runtap.score",
                dropped_total = count + 1,
                limit = self.max_in_flight,
                resource_id = %score.resource_id,
                error = %PublishError::AtCapacity { limit: self.max_in_flight },
                "score sink saturated, scores are being dropped"
            );
        }
    }
}
