use futures::StreamExt;

use crate::score::ScorePublisher;
use crate::types::ByteStream;

use super::events::{parse_line, LineOutcome};
use super::ndjson::LineAssembler;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TapStats {
    pub chunks: u64,
    pub bytes: u64,
    pub lines: u64,
    pub malformed: u64,
    pub dataset_events: u64,
    pub scores: u64,
}

/// Per-stream extraction state. Lives and dies with one tapped stream.
pub struct ScoreTap {
    assembler: LineAssembler,
    publisher: ScorePublisher,
    stats: TapStats,
}

impl ScoreTap {
    pub fn new(publisher: ScorePublisher) -> Self {
        Self {
            assembler: LineAssembler::new(),
            publisher,
            stats: TapStats::default(),
        }
    }

    /// Feeds one chunk through the line assembler and hands any scores it
    /// completes to the publisher. Never fails.
    pub fn observe(&mut self, chunk: &[u8]) {
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len() as u64;

        for line in self.assembler.push(chunk) {
            self.stats.lines += 1;
            match parse_line(&line) {
                LineOutcome::Dataset(event) => {
                    self.stats.dataset_events += 1;
                    for score in event.scores() {
                        self.stats.scores += 1;
                        self.publisher.publish(score);
                    }
                }
                LineOutcome::Malformed => {
                    self.stats.malformed += 1;
                    tracing::trace!(
                        target: "runtap.tap",
                        bytes = line.len(),
                        "skipping malformed line"
                    );
                }
                LineOutcome::Blank | LineOutcome::Other => {}
            }
        }
    }

    pub fn finish(self) -> TapStats {
        let discarded = self.assembler.finish();
        tracing::debug!(
            target: "runtap.tap",
            chunks = self.stats.chunks,
            bytes = self.stats.bytes,
            lines = self.stats.lines,
            malformed = self.stats.malformed,
            dataset_events = self.stats.dataset_events,
            scores = self.stats.scores,
            discarded_tail_bytes = discarded,
            "tap finished"
        );
        self.stats
    }
}

/// Wraps a dataset-run stream so scores are extracted on the side.
///
/// The returned stream yields exactly the upstream items, in order. It only
/// pulls the next upstream chunk after the consumer has taken the previous
/// one, and dropping it stops upstream reads. Score sends already spawned keep
/// running on their own.
pub fn tap_stream(upstream: ByteStream, publisher: ScorePublisher) -> ByteStream {
    Box::pin(async_stream::stream! {
        let mut upstream = upstream;
        let mut tap = ScoreTap::new(publisher);

        while let Some(item) = upstream.next().await {
            match item {
                Ok(chunk) => {
                    tap.observe(&chunk);
                    yield Ok(chunk);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "runtap.tap",
                        error = %err,
                        "upstream dataset stream failed"
                    );
                    yield Err(err);
                    break;
                }
            }
        }

        tap.finish();
    })
}
