//! ProcessingState - per-run item tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Run-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Aborted,
}

/// Status of one processed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Succeeded,
    Failed,
}

/// How an item ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Success,
    Failure,
}

/// Handle returned by `record_start`, passed back to `record_end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOperation {
    index: usize,
}

/// One started item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub key: String,
    pub status: ItemStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Progress of one suggestion run
///
/// Items appear in the order they were started. Items not started yet are
/// pending and only counted through `expected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingState {
    pub run_id: String,
    pub activity: String,
    pub status: RunStatus,
    pub expected: usize,
    pub items: Vec<ItemRecord>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProcessingState {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::now_v7().to_string(),
            activity: activity.into(),
            status: RunStatus::NotStarted,
            expected: 0,
            items: Vec::new(),
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Set the expected item count and mark the run as running
    pub fn set_expected_progress(&mut self, expected: usize) {
        debug!(%expected, activity = %self.activity, "set_expected_progress: called");
        self.expected = expected;
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn record_start(&mut self, key: &str) -> ItemOperation {
        debug!(%key, "record_start: called");
        self.items.push(ItemRecord {
            key: key.to_string(),
            status: ItemStatus::InProgress,
            started_at: Utc::now(),
            finished_at: None,
        });
        ItemOperation {
            index: self.items.len() - 1,
        }
    }

    pub fn record_end(&mut self, op: ItemOperation, outcome: ItemOutcome) {
        let Some(item) = self.items.get_mut(op.index) else {
            debug!(index = op.index, "record_end: unknown item operation");
            return;
        };
        debug!(key = %item.key, ?outcome, "record_end: called");
        item.status = match outcome {
            ItemOutcome::Success => ItemStatus::Succeeded,
            ItemOutcome::Failure => ItemStatus::Failed,
        };
        item.finished_at = Some(Utc::now());
    }

    /// Record the error that terminated the run
    pub fn record_exception(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "record_exception: called");
        self.error = Some(message);
        self.status = RunStatus::Aborted;
    }

    /// Close the run; a running run becomes completed
    pub fn finish(&mut self) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Completed;
        }
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> usize {
        self.count(ItemStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(ItemStatus::Failed)
    }

    pub fn pending(&self) -> usize {
        self.expected.saturating_sub(self.items.len())
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}
