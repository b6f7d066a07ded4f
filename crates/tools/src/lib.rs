//! Tools the Roster agent can call.
//!
//! There is one domain tool today, [`employee_lookup::EmployeeLookupTool`],
//! which searches the HR vector index.

pub mod employee_lookup;

use roster_core::search::VectorStore;
use roster_core::tool::ToolRegistry;
use std::sync::Arc;

pub use employee_lookup::EmployeeLookupTool;

/// Create the default tool registry backed by the given vector store.
pub fn default_registry(store: Arc<dyn VectorStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EmployeeLookupTool::new(store)));
    registry
}
