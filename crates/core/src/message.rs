//! Turn domain types.
//!
//! A [`Turn`] is one message in a thread: the human's query, a model response
//! (possibly requesting tools), or the result of a tool invocation.
//! Turns are created through constructors and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix a model uses to flag a conclusive answer for a supervising agent.
///
/// Routing never reads it; only the presence of tool calls matters.
pub const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER";

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    Human,
    /// The language model
    Model,
    /// Prompt instructions (rendered per call, never stored in a thread)
    System,
    /// Tool execution result
    Tool,
}

/// A model-issued request to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation ID, echoed by the resulting tool turn
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as produced by the model (validated by the tool)
    pub arguments: serde_json::Value,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who produced this turn
    pub role: Role,

    /// Text content (tool turns carry serialized JSON)
    pub content: String,

    /// Tool calls requested by the model (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,

    /// If this is a tool result, which invocation it answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Tool turn carrying an error payload instead of a result
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,

    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    /// Create a human turn.
    pub fn human(content: impl Into<String>) -> Self {
        Self::with_role(Role::Human, content.into())
    }

    /// Create a model turn with final text.
    pub fn model(content: impl Into<String>) -> Self {
        Self::with_role(Role::Model, content.into())
    }

    /// Create a model turn that requests tools.
    pub fn model_with_tools(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        let mut turn = Self::with_role(Role::Model, content.into());
        turn.tool_calls = tool_calls;
        turn
    }

    /// Create a system turn (prompt rendering only).
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create a successful tool result turn.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut turn = Self::with_role(Role::Tool, content.into());
        turn.tool_call_id = Some(tool_call_id.into());
        turn
    }

    /// Create a failed tool result turn.
    pub fn tool_error(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut turn = Self::tool_result(tool_call_id, content);
        turn.is_error = true;
        turn
    }

    /// A model turn with at least one pending tool request.
    pub fn requests_tools(&self) -> bool {
        self.role == Role::Model && !self.tool_calls.is_empty()
    }

    /// Whether the content opens with [`FINAL_ANSWER_MARKER`].
    pub fn is_final_answer(&self) -> bool {
        self.role == Role::Model && self.content.trim_start().starts_with(FINAL_ANSWER_MARKER)
    }
}
