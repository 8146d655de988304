//! FileProgress - persists the processing state as a JSON snapshot

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ProcessingState, ProgressError, ProgressSink};

/// Writes the whole state to a file on every flush
///
/// The file is replaced atomically so readers polling it never see a
/// partial snapshot.
#[derive(Debug, Clone)]
pub struct FileProgress {
    state: ProcessingState,
    path: PathBuf,
}

impl FileProgress {
    pub fn new(activity: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            state: ProcessingState::new(activity),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a snapshot written by a previous flush
    pub async fn read_snapshot(path: impl AsRef<Path>) -> Result<ProcessingState, ProgressError> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl ProgressSink for FileProgress {
    fn state(&self) -> &ProcessingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProcessingState {
        &mut self.state
    }

    async fn flush(&mut self) -> Result<(), ProgressError> {
        debug!(path = %self.path.display(), items = self.state.items.len(), "FileProgress::flush: called");
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(&self.state)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
