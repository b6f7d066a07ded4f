//! Model gateway — renders the prompt and calls the provider.
//!
//! Every call sends one system turn followed by the full thread history.
//! The gateway keeps no state between calls.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::error::ProviderError;
use roster_core::message::Turn;
use roster_core::provider::{Provider, ProviderRequest, ProviderResponse};
use roster_core::state::ConversationState;
use roster_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::debug;

/// System prompt template. `{tool_names}`, `{system_message}` and `{time}`
/// are substituted on every call.
pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a helpful AI assistant, collaborating with other assistants. \
Use the provided tools to progress towards answering the question. If you are unable to fully answer, \
that's OK, another assistant with different tools will help where you left off. \
Execute what you can to make progress. If you or any of the other assistants have the final answer or deliverable, \
prefix your response with FINAL ANSWER so the team knows to stop.
If you need more information, use the \"employee_lookup\" tool.
You have access to the following tools: {tool_names}.
{system_message}
Current time: {time}.";

/// Render the system prompt for one model call.
pub fn render_system_prompt(tool_names: &[&str], system_message: &str, time: DateTime<Utc>) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{tool_names}", &tool_names.join(", "))
        .replace("{system_message}", system_message)
        .replace("{time}", &time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    model: String,
    system_message: String,
    max_tokens: Option<u32>,
}

impl ModelGateway {
    /// Sampling temperature for every call.
    pub const TEMPERATURE: f32 = 0.0;

    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_message: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_message: system_message.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    /// Build the request for the given history at time `now`.
    pub fn build_request(
        &self,
        state: &ConversationState,
        tools: &ToolRegistry,
        now: DateTime<Utc>,
    ) -> ProviderRequest {
        let system = render_system_prompt(&tools.names(), &self.system_message, now);

        let mut messages = Vec::with_capacity(state.len() + 1);
        messages.push(Turn::system(system));
        messages.extend(state.iter().cloned());

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: Self::TEMPERATURE,
            max_tokens: self.max_tokens,
            tools: tools.definitions(),
        }
    }

    /// Call the model with the full history and return its response.
    pub async fn invoke(
        &self,
        state: &ConversationState,
        tools: &ToolRegistry,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(state, tools, Utc::now());
        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            "Calling model"
        );
        self.provider.complete(request).await
    }
}
