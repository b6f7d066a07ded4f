//! In-memory checkpoint saver — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::CheckpointError;
use roster_core::state::ConversationState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps one state per thread in a map. Lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemorySaver {
    threads: Arc<RwLock<HashMap<ThreadId, ConversationState>>>,
}

impl InMemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemorySaver {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<ConversationState, CheckpointError> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, thread_id: &ThreadId, state: &ConversationState) -> Result<(), CheckpointError> {
        self.threads
            .write()
            .await
            .insert(thread_id.clone(), state.clone());
        Ok(())
    }

    async fn threads(&self) -> Result<Vec<ThreadId>, CheckpointError> {
        let mut ids: Vec<ThreadId> = self.threads.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
