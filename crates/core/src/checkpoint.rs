//! Checkpoint store trait — per-thread persistence of conversation state.
//!
//! The store exclusively owns persisted state; the executor works on a
//! transient copy for one invocation. A `save` for a thread must be visible to
//! the next `load` of the same thread. No isolation is promised between
//! threads or for concurrent writers of one thread.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CheckpointError;
use crate::state::ConversationState;

/// Opaque identifier of a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    /// Generate a fresh random thread id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted snapshot of one thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: ThreadId,
    pub state: ConversationState,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: ThreadId, state: ConversationState) -> Self {
        Self {
            thread_id,
            state,
            saved_at: Utc::now(),
        }
    }
}

/// The checkpoint store contract.
///
/// Implementations: in-memory, JSON files, SQLite.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "file", "memory").
    fn name(&self) -> &str;

    /// Load a thread's state; an unseen thread yields an empty state.
    async fn load(&self, thread_id: &ThreadId) -> Result<ConversationState, CheckpointError>;

    /// Persist a thread's full state, replacing the previous checkpoint.
    async fn save(&self, thread_id: &ThreadId, state: &ConversationState) -> Result<(), CheckpointError>;

    /// List the threads that have a checkpoint.
    async fn threads(&self) -> Result<Vec<ThreadId>, CheckpointError>;
}
