//! # Roster Core
//!
//! Domain types, traits, and error definitions for the Roster agent loop.
//! This crate has **no backend dependencies**: it defines the conversation
//! model and the narrow ports every external collaborator is reached through.
//!
//! ## Ports
//!
//! - [`Provider`] — chat-capable model (and query embeddings)
//! - [`Tool`] — named, schema-validated callable
//! - [`VectorStore`] — similarity search over an external index
//! - [`CheckpointStore`] — per-thread persistence of [`ConversationState`]
//!
//! Implementations live in their respective crates, so tests can swap in
//! deterministic fakes.

pub mod checkpoint;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod search;
pub mod state;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use checkpoint::{Checkpoint, CheckpointStore, ThreadId};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Role, ToolInvocation, Turn, FINAL_ANSWER_MARKER};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use search::{Document, ScoredDocument, VectorStore};
pub use state::ConversationState;
pub use tool::{Tool, ToolRegistry, ToolResult};
