//! Persistence and retrieval backends for Roster.
//!
//! - Checkpoint savers: [`InMemorySaver`], [`FileSaver`], and (with the
//!   `sqlite` feature) [`SqliteSaver`]
//! - Vector search: [`InMemoryVectorStore`] over a pre-embedded JSONL index

pub mod file_backend;
pub mod in_memory;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_backend::FileSaver;
pub use in_memory::InMemorySaver;
pub use vector::{IndexedDocument, InMemoryVectorStore, cosine_similarity};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSaver;
