//! Progress tracking for suggestion runs
//!
//! The orchestrator reports the expected item count once and a start/end
//! pair per candidate through a `ProgressSink`. The sink owns the
//! `ProcessingState` and decides how it is persisted; `MemoryProgress`
//! keeps it in memory and `FileProgress` writes JSON snapshots.

mod file;
mod sink;
mod state;

use thiserror::Error;

pub use file::FileProgress;
pub use sink::{MemoryProgress, ProgressSink};
pub use state::{ItemOperation, ItemOutcome, ItemRecord, ItemStatus, ProcessingState, RunStatus};

/// Errors from persisting progress
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Progress store unavailable: {0}")]
    Unavailable(String),
}
