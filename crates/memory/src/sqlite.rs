//! SQLite checkpoint saver.
//!
//! One row per thread in a single `checkpoints` table. The conversation state
//! is stored as a JSON array of turns; `save` replaces the row in place.

use async_trait::async_trait;
use chrono::Utc;
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::CheckpointError;
use roster_core::state::ConversationState;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// A durable checkpoint store backed by a SQLite database file.
pub struct SqliteSaver {
    pool: SqlitePool,
}

impl SqliteSaver {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CheckpointError::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to open SQLite: {e}")))?;

        let saver = Self::from_pool(pool).await?;
        info!("SQLite checkpoint saver initialized at {}", path.display());
        Ok(saver)
    }

    /// An ephemeral in-process database. A single connection keeps every
    /// query on the same memory database.
    pub async fn in_memory() -> Result<Self, CheckpointError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to open SQLite: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, CheckpointError> {
        let saver = Self { pool };
        saver.run_migrations().await?;
        Ok(saver)
    }

    async fn run_migrations(&self) -> Result<(), CheckpointError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id  TEXT PRIMARY KEY NOT NULL,
                state      TEXT NOT NULL,
                saved_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CheckpointError::MigrationFailed(format!("checkpoints table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for SqliteSaver {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<ConversationState, CheckpointError> {
        let row = sqlx::query("SELECT state FROM checkpoints WHERE thread_id = ?1")
            .bind(thread_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CheckpointError::Storage(format!("SELECT failed: {e}")))?;

        let Some(row) = row else {
            return Ok(ConversationState::new());
        };

        let json: String = row
            .try_get("state")
            .map_err(|e| CheckpointError::Storage(format!("state column: {e}")))?;
        let state: ConversationState =
            serde_json::from_str(&json).map_err(|e| CheckpointError::Corrupted {
                thread_id: thread_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!(thread_id = %thread_id, turns = state.len(), "Loaded checkpoint");
        Ok(state)
    }

    async fn save(&self, thread_id: &ThreadId, state: &ConversationState) -> Result<(), CheckpointError> {
        let json = serde_json::to_string(state)
            .map_err(|e| CheckpointError::Storage(format!("State serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO checkpoints (thread_id, state, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(thread_id) DO UPDATE SET
                state = excluded.state,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(thread_id.as_str())
        .bind(&json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| CheckpointError::Storage(format!("INSERT failed: {e}")))?;

        debug!(thread_id = %thread_id, turns = state.len(), "Saved checkpoint");
        Ok(())
    }

    async fn threads(&self) -> Result<Vec<ThreadId>, CheckpointError> {
        let rows = sqlx::query("SELECT thread_id FROM checkpoints ORDER BY thread_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CheckpointError::Storage(format!("SELECT failed: {e}")))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("thread_id")
                    .map(ThreadId)
                    .map_err(|e| CheckpointError::Storage(format!("thread_id column: {e}")))
            })
            .collect()
    }
}
