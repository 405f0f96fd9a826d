mod events;
mod ndjson;
mod stream;

pub use events::{parse_line, DatasetEvent, DatasetItemResult, LineOutcome, EVENT_DATASET};
pub use ndjson::LineAssembler;
pub use stream::{tap_stream, ScoreTap, TapStats};
