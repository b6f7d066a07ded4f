//! File-based checkpoint saver — one JSON document per thread.
//!
//! Each thread is stored as `<dir>/<sha256(thread_id)>.json` holding a
//! [`Checkpoint`]. The digest keeps file names fixed-length and safe for any
//! thread id; the id itself is read back from the stored checkpoint.
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous checkpoint intact.

use async_trait::async_trait;
use roster_core::checkpoint::{Checkpoint, CheckpointStore, ThreadId};
use roster_core::error::CheckpointError;
use roster_core::state::ConversationState;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A directory of per-thread JSON checkpoints.
pub struct FileSaver {
    dir: PathBuf,
}

impl FileSaver {
    /// Create a saver rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, thread_id: &ThreadId) -> PathBuf {
        let digest = Sha256::digest(thread_id.as_str().as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }

    async fn read_checkpoint(path: &Path) -> Result<Checkpoint, String> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CheckpointStore for FileSaver {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<ConversationState, CheckpointError> {
        let path = self.path_for(thread_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ConversationState::new());
            }
            Err(e) => {
                return Err(CheckpointError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let checkpoint: Checkpoint =
            serde_json::from_str(&content).map_err(|e| CheckpointError::Corrupted {
                thread_id: thread_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!(thread_id = %thread_id, turns = checkpoint.state.len(), "Loaded file checkpoint");
        Ok(checkpoint.state)
    }

    async fn save(&self, thread_id: &ThreadId, state: &ConversationState) -> Result<(), CheckpointError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CheckpointError::Storage(format!("Failed to create checkpoint directory: {e}"))
        })?;

        let checkpoint = Checkpoint::new(thread_id.clone(), state.clone());
        let content = serde_json::to_string_pretty(&checkpoint)
            .map_err(|e| CheckpointError::Storage(format!("Failed to serialize checkpoint: {e}")))?;

        let path = self.path_for(thread_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to write checkpoint: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to replace checkpoint: {e}")))?;

        Ok(())
    }

    async fn threads(&self) -> Result<Vec<ThreadId>, CheckpointError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CheckpointError::Storage(format!(
                    "Failed to list checkpoints: {e}"
                )));
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to list checkpoints: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_checkpoint(&path).await {
                Ok(checkpoint) => ids.push(checkpoint.thread_id),
                Err(reason) => warn!(file = %path.display(), %reason, "Skipping unreadable checkpoint"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
