//! ProgressSink trait and the in-memory sink

use async_trait::async_trait;
use tracing::debug;

use super::{ItemOperation, ItemOutcome, ProcessingState, ProgressError};

/// Receives progress of a suggestion run
///
/// Implementations own the [`ProcessingState`] and decide how `flush`
/// persists it. The state-changing methods only touch memory.
#[async_trait]
pub trait ProgressSink: Send {
    fn state(&self) -> &ProcessingState;

    fn state_mut(&mut self) -> &mut ProcessingState;

    /// Persist the current state
    async fn flush(&mut self) -> Result<(), ProgressError>;

    fn set_expected_progress(&mut self, expected: usize) {
        self.state_mut().set_expected_progress(expected);
    }

    fn record_start(&mut self, key: &str) -> ItemOperation {
        self.state_mut().record_start(key)
    }

    fn record_end(&mut self, op: ItemOperation, outcome: ItemOutcome) {
        self.state_mut().record_end(op, outcome);
    }

    fn record_exception(&mut self, message: &str) {
        self.state_mut().record_exception(message);
    }

    /// Finish the run and persist the final state
    async fn close(&mut self) -> Result<(), ProgressError> {
        self.state_mut().finish();
        self.flush().await
    }
}

/// Keeps the state in memory; flushing only counts calls
#[derive(Debug, Clone)]
pub struct MemoryProgress {
    state: ProcessingState,
    flushes: usize,
}

impl MemoryProgress {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            state: ProcessingState::new(activity),
            flushes: 0,
        }
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn into_state(self) -> ProcessingState {
        self.state
    }
}

#[async_trait]
impl ProgressSink for MemoryProgress {
    fn state(&self) -> &ProcessingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProcessingState {
        &mut self.state
    }

    async fn flush(&mut self) -> Result<(), ProgressError> {
        self.flushes += 1;
        debug!(flushes = self.flushes, "MemoryProgress::flush: called");
        Ok(())
    }
}
