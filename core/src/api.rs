//! Stable re-exports for consumers (`plugins`, `server`, and external crates).
//!
//! Prefer importing from `runtap_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, ExperimentConfig, LoggingConfig, ScoringConfig,
    ServerConfig,
};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{ConfigError, DispatchError, PublishError};
pub use crate::handler::{ExecutionHandler, PromptOptions};
pub use crate::request::{validate_request, DatasetRun, PromptRun, RunOptions, RunRequest};
pub use crate::score::{spawn_detached, EvalResult, Score, ScorePublisher, ScoreSink};
pub use crate::tap::{tap_stream, DatasetEvent, LineAssembler, ScoreTap, TapStats};
pub use crate::types::{
    default_stream_headers, ByteStream, ExperimentResult, Headers, RunResult, Usage,
    WireResponse, NDJSON_CONTENT_TYPE, STREAMING_HEADER,
};
