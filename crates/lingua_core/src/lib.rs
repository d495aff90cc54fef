//! Lingua core: pure translation-job domain types and estimators.
mod history;
mod job;
mod progress;
mod queue;
mod sanitize;
mod tuning;

pub use history::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};
pub use job::{InputSnapshot, Job, Reason};
pub use progress::{ProgressEstimator, ProgressView};
pub use queue::JobQueue;
pub use sanitize::sanitize_for_transport;
pub use tuning::{auto_tune, GenerateParams, TuningMode};
