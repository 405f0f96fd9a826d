mod detached;
mod model;
mod publisher;

pub use detached::spawn_detached;
pub use model::{EvalResult, Score, LABEL_FAIL, LABEL_PASS, SCORE_TYPE_EXPERIMENT};
pub use publisher::{ScorePublisher, ScoreSink};
