//! Error types for the Roster domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] is what an
//! invocation of the agent loop fails with.

use thiserror::Error;

/// The top-level error type for all Roster operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Vector search errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Persistence errors ---
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    // --- Control flow ---
    #[error("Invocation exceeded maximum steps ({limit})")]
    StepLimitExceeded { limit: u32 },

    #[error("Thread '{0}' already has an invocation in progress")]
    ThreadBusy(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

impl ToolError {
    /// Whether the model can react to this failure through a tool turn.
    ///
    /// Argument and lookup failures happen before any backend is touched.
    /// Backend failures are not recoverable and abort the invocation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ToolError::NotFound(_) | ToolError::InvalidArguments(_))
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted checkpoint for thread '{thread_id}': {reason}")]
    Corrupted { thread_id: String, reason: String },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
