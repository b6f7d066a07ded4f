//! Shared test doubles for the agent crate.

use async_trait::async_trait;
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::{CheckpointError, ProviderError, SearchError};
use roster_core::message::{ToolInvocation, Turn};
use roster_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use roster_core::search::{Document, ScoredDocument, VectorStore};
use roster_core::state::ConversationState;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Vec<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// First requests the given tools, then answers with `answer`.
    pub fn tool_then_answer(tool_calls: Vec<ToolInvocation>, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        match self.responses.get(index) {
            Some(response) => Ok(response.clone()),
            None => panic!(
                "SequentialMockProvider: no more responses (call #{index}, have {})",
                self.responses.len()
            ),
        }
    }
}

/// A provider that requests `employee_lookup` on every call.
#[derive(Default)]
pub struct AlwaysToolProvider {
    calls: Mutex<usize>,
}

impl AlwaysToolProvider {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for AlwaysToolProvider {
    fn name(&self) -> &str {
        "always_tool"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        Ok(make_tool_call_response(vec![ToolInvocation::new(
            format!("call_{n}"),
            "employee_lookup",
            serde_json::json!({ "query": "again" }),
        )]))
    }
}

/// A provider whose backend is unreachable.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Returns one fixed document for every query.
#[derive(Default)]
pub struct StaticStore;

#[async_trait]
impl VectorStore for StaticStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        _k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        Ok(vec![ScoredDocument {
            document: Document {
                page_content: format!("Employee matching {query}"),
                metadata: serde_json::Map::new(),
            },
            score: 0.9,
        }])
    }
}

pub struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        Err(SearchError::Unavailable("index offline".into()))
    }
}

/// Loads empty state and rejects every save.
pub struct FailingSaver;

#[async_trait]
impl CheckpointStore for FailingSaver {
    fn name(&self) -> &str {
        "failing"
    }

    async fn load(&self, _thread_id: &ThreadId) -> Result<ConversationState, CheckpointError> {
        Ok(ConversationState::new())
    }

    async fn save(&self, _thread_id: &ThreadId, _state: &ConversationState) -> Result<(), CheckpointError> {
        Err(CheckpointError::Storage("disk full".into()))
    }

    async fn threads(&self) -> Result<Vec<ThreadId>, CheckpointError> {
        Ok(Vec::new())
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        turn: Turn::model(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call_response(tool_calls: Vec<ToolInvocation>) -> ProviderResponse {
    ProviderResponse {
        turn: Turn::model_with_tools("", tool_calls),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
