//! Employee lookup tool — similarity search over the HR vector index.
//!
//! Arguments are validated before the index is touched; a bad request comes
//! back as [`ToolError::InvalidArguments`] so the model can correct itself.

use async_trait::async_trait;
use roster_core::error::ToolError;
use roster_core::search::VectorStore;
use roster_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Number of results when the model does not ask for a specific count.
pub const DEFAULT_RESULT_COUNT: i64 = 10;

#[derive(Debug, Deserialize)]
struct LookupArgs {
    query: String,
    /// Models may send whole numbers as doubles (`5.0`)
    #[serde(default = "default_n")]
    n: serde_json::Number,
}

fn default_n() -> serde_json::Number {
    DEFAULT_RESULT_COUNT.into()
}

pub struct EmployeeLookupTool {
    store: Arc<dyn VectorStore>,
}

impl EmployeeLookupTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    fn parse_args(arguments: serde_json::Value) -> Result<(String, usize), ToolError> {
        let args: LookupArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let n = match (args.n.as_u64(), args.n.as_f64()) {
            (Some(n), _) => n,
            (None, Some(f)) if f.fract() == 0.0 && f >= 1.0 && f <= u64::MAX as f64 => f as u64,
            _ => {
                return Err(ToolError::InvalidArguments(format!(
                    "'n' must be a whole number of at least 1, got {}",
                    args.n
                )));
            }
        };
        if n < 1 {
            return Err(ToolError::InvalidArguments(format!(
                "'n' must be at least 1, got {n}"
            )));
        }
        let n = usize::try_from(n)
            .map_err(|_| ToolError::InvalidArguments(format!("'n' is too large: {n}")))?;

        Ok((args.query, n))
    }
}

#[async_trait]
impl Tool for EmployeeLookupTool {
    fn name(&self) -> &str {
        "employee_lookup"
    }

    fn description(&self) -> &str {
        "Gathers employee details from the HR database"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-text description of the employees to find"
                },
                "n": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "minimum": 1,
                    "default": DEFAULT_RESULT_COUNT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let (query, n) = Self::parse_args(arguments)?;
        info!(tool = "employee_lookup", query = %query, n, "Tool call");

        let hits = self
            .store
            .similarity_search_with_score(&query, n)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let data = serde_json::to_value(&hits).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: format!("Failed to serialize results: {e}"),
        })?;

        Ok(ToolResult {
            output: data.to_string(),
            data: Some(data),
        })
    }
}
