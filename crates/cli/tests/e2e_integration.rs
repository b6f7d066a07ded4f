//! End-to-end integration tests for the Roster agent.
//!
//! These tests wire a full session (gateway, tool registry, vector index and
//! checkpoint savers) around a scripted provider and drive it through the
//! public entry point.

use std::sync::{Arc, Mutex};

use roster_agent::{AgentSession, RunConfig, call_agent};
use roster_config::AppConfig;
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::{Error, ProviderError, SearchError, ToolError};
use roster_core::message::{Role, ToolInvocation, Turn};
use roster_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use roster_core::search::{Document, ScoredDocument, VectorStore};
use roster_core::state::ConversationState;
use roster_memory::{FileSaver, InMemorySaver, InMemoryVectorStore, IndexedDocument, SqliteSaver};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A provider that returns scripted responses in sequence and embeds text
/// as keyword presence flags.
struct ScriptedProvider {
    responses: Vec<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

const KEYWORDS: [&str; 4] = ["carlos", "sales", "finance", "engineering"];

fn embed(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .map(|kw| if lower.contains(kw) { 1.0 } else { 0.0 })
        .collect()
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);
        match self.responses.get(index) {
            Some(response) => Ok(response.clone()),
            None => panic!(
                "ScriptedProvider exhausted: call #{index}, have {}",
                self.responses.len()
            ),
        }
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| embed(t)).collect(),
            model: request.model,
        })
    }
}

/// Requests a lookup on every call.
#[derive(Default)]
struct LoopingProvider {
    calls: Mutex<u32>,
}

#[async_trait::async_trait]
impl Provider for LoopingProvider {
    fn name(&self) -> &str {
        "looping"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        Ok(tool_response(vec![lookup(&format!("loop_{n}"), "Carlos")]))
    }
}

struct BrokenIndex;

#[async_trait::async_trait]
impl VectorStore for BrokenIndex {
    fn name(&self) -> &str {
        "broken"
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        Err(SearchError::Unavailable("cluster unreachable".into()))
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        turn: Turn::model(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn tool_response(tool_calls: Vec<ToolInvocation>) -> ProviderResponse {
    ProviderResponse {
        turn: Turn::model_with_tools("", tool_calls),
        usage: None,
        model: "mock".into(),
    }
}

fn lookup(id: &str, query: &str) -> ToolInvocation {
    ToolInvocation::new(id, "employee_lookup", serde_json::json!({ "query": query }))
}

fn employee(text: &str, email: &str) -> IndexedDocument {
    let mut metadata = serde_json::Map::new();
    metadata.insert("email".into(), serde_json::json!(email));
    IndexedDocument {
        document: Document {
            page_content: text.into(),
            metadata,
        },
        embedding: embed(text),
    }
}

fn index(provider: Arc<dyn Provider>) -> Arc<InMemoryVectorStore> {
    Arc::new(InMemoryVectorStore::new(
        provider,
        "text-embedding-004",
        vec![
            employee("Carlos Salazar, Sales", "carlos@co"),
            employee("Dana Wu, Engineering", "dana@co"),
            employee("Priya Nair, Finance", "priya@co"),
        ],
    ))
}

fn session_with(
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    saver: Arc<dyn CheckpointStore>,
) -> AgentSession {
    AgentSession::new(AppConfig::default(), provider, store, saver)
}

fn session(provider: Arc<ScriptedProvider>, saver: Arc<dyn CheckpointStore>) -> AgentSession {
    let store = index(provider.clone());
    session_with(provider, store, saver)
}

// ── E2E: Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_lookup_then_final_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![lookup("call_1", "Carlos")]),
        text_response("Employee Carlos Salazar, Sales, carlos@co"),
    ]));
    let saver = Arc::new(InMemorySaver::new());
    let session = session(provider.clone(), saver.clone());

    let answer = call_agent(&session, "Find employees named Carlos", "t-carlos")
        .await
        .expect("invocation should succeed");

    assert_eq!(answer, "Employee Carlos Salazar, Sales, carlos@co");

    let state = saver.load(&ThreadId::from("t-carlos")).await.unwrap();
    let roles: Vec<Role> = state.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::Human, Role::Model, Role::Tool, Role::Model]);

    // tool turn carries ranked search hits for the model
    let tool_turn = &state.turns()[2];
    assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_1"));
    let hits: Vec<ScoredDocument> = serde_json::from_str(&tool_turn.content).unwrap();
    assert_eq!(hits[0].document.page_content, "Carlos Salazar, Sales");
    assert_eq!(hits[0].document.metadata["email"], "carlos@co");

    // the second model call saw the tool result
    let second = &provider.requests()[1];
    assert_eq!(second.messages.last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn e2e_direct_answer_skips_tools() {
    let provider = Arc::new(ScriptedProvider::new(vec![text_response(
        "I can help you find employees.",
    )]));
    let saver = Arc::new(InMemorySaver::new());
    let session = session(provider.clone(), saver.clone());

    let answer = call_agent(&session, "What can you do?", "t-direct").await.unwrap();

    assert_eq!(answer, "I can help you find employees.");
    assert_eq!(provider.calls(), 1);
    let state = saver.load(&ThreadId::from("t-direct")).await.unwrap();
    assert_eq!(state.len(), 2);
    assert!(state.iter().all(|t| t.role != Role::Tool));
}

#[tokio::test]
async fn e2e_search_backend_failure_keeps_prior_checkpoint() {
    let saver = Arc::new(InMemorySaver::new());
    let thread = ThreadId::from("t-broken");
    let prior = ConversationState::from(vec![
        Turn::human("Hello"),
        Turn::model("Hi, how can I help?"),
    ]);
    saver.save(&thread, &prior).await.unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![tool_response(vec![lookup(
        "call_1", "Carlos",
    )])]));
    let session = session_with(provider, Arc::new(BrokenIndex), saver.clone());

    let err = call_agent(&session, "Find Carlos", "t-broken").await.unwrap_err();

    assert!(matches!(err, Error::Tool(ToolError::ExecutionFailed { .. })));
    let after = saver.load(&thread).await.unwrap();
    assert_eq!(after, prior);
    assert!(after.iter().all(|t| t.content != "Find Carlos"));
}

#[tokio::test]
async fn e2e_thread_resumes_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("checkpoints.db");

    {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(vec![lookup("call_1", "Carlos")]),
            text_response("Carlos Salazar works in Sales."),
        ]));
        let saver = Arc::new(SqliteSaver::new(&db).await.unwrap());
        let session = session(provider, saver);
        call_agent(&session, "Who is Carlos?", "t-resume").await.unwrap();
    }

    let provider = Arc::new(ScriptedProvider::new(vec![text_response("carlos@co")]));
    let saver = Arc::new(SqliteSaver::new(&db).await.unwrap());
    let session = session(provider.clone(), saver);

    let answer = call_agent(&session, "What is his email?", "t-resume").await.unwrap();
    assert_eq!(answer, "carlos@co");

    // system + 4 prior turns + new human turn
    let request = &provider.requests()[0];
    assert_eq!(request.messages.len(), 6);
    assert_eq!(request.messages[1].content, "Who is Carlos?");
    assert_eq!(session.history("t-resume").await.unwrap().len(), 6);
}

#[tokio::test]
async fn e2e_threads_are_independent() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("answer a"),
        text_response("answer b"),
    ]));
    let saver = Arc::new(InMemorySaver::new());
    let session = session(provider.clone(), saver.clone());

    call_agent(&session, "question a", "a").await.unwrap();
    call_agent(&session, "question b", "b").await.unwrap();

    // thread b's first model call saw only its own turn
    assert_eq!(provider.requests()[1].messages.len(), 2);
    assert_eq!(saver.load(&ThreadId::from("a")).await.unwrap().len(), 2);
    assert_eq!(
        session.threads().await.unwrap(),
        vec![ThreadId::from("a"), ThreadId::from("b")]
    );
}

// ── E2E: Tool correlation and validation ─────────────────────────────────

#[tokio::test]
async fn e2e_every_request_gets_one_correlated_result() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![
            lookup("c_sales", "sales"),
            lookup("c_fin", "finance"),
            lookup("c_eng", "engineering"),
        ]),
        tool_response(vec![lookup("c_again", "Carlos")]),
        text_response("Done."),
    ]));
    let saver = Arc::new(InMemorySaver::new());
    let session = session(provider.clone(), saver);

    let outcome = session.invoke("Summarize departments", "t-multi").await.unwrap();

    assert_eq!(outcome.steps, 5);
    let mut pending: Vec<String> = Vec::new();
    for turn in outcome.state.iter() {
        match turn.role {
            Role::Model => {
                assert!(pending.is_empty(), "model turn before all results arrived");
                pending = turn.tool_calls.iter().map(|c| c.id.clone()).collect();
            }
            Role::Tool => {
                let id = turn.tool_call_id.clone().unwrap();
                assert_eq!(pending.first(), Some(&id), "results arrive in request order");
                pending.remove(0);
            }
            _ => {}
        }
    }
    assert!(pending.is_empty());
    assert_eq!(outcome.state.iter().filter(|t| t.role == Role::Tool).count(), 4);
}

#[tokio::test]
async fn e2e_invalid_arguments_let_model_recover() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![ToolInvocation::new(
            "bad",
            "employee_lookup",
            serde_json::json!({ "query": "Carlos", "n": 0 }),
        )]),
        tool_response(vec![lookup("good", "Carlos")]),
        text_response("Carlos Salazar, Sales"),
    ]));
    let session = session(provider.clone(), Arc::new(InMemorySaver::new()));

    let outcome = session.invoke("Find Carlos", "t-recover").await.unwrap();

    let tool_turns: Vec<&Turn> = outcome.state.iter().filter(|t| t.role == Role::Tool).collect();
    assert!(tool_turns[0].is_error);
    assert!(!tool_turns[1].is_error);
    assert_eq!(outcome.answer, "Carlos Salazar, Sales");
    assert_eq!(provider.calls(), 3);
}

// ── E2E: Step bound ──────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_step_bound_stops_pathological_model() {
    let provider = Arc::new(LoopingProvider::default());
    let store = index(Arc::new(ScriptedProvider::new(vec![])));
    let saver = Arc::new(InMemorySaver::new());
    let session = session_with(provider.clone(), store, saver.clone());

    let err = call_agent(&session, "Loop", "t-loop").await.unwrap_err();

    assert!(matches!(err, Error::StepLimitExceeded { limit: 15 }));
    assert!(err.to_string().contains("maximum steps"));
    assert_eq!(*provider.calls.lock().unwrap(), 8);

    // persisted up to the last completed TOOLS step: human + 7 × (model, tool)
    let state = saver.load(&ThreadId::from("t-loop")).await.unwrap();
    assert_eq!(state.len(), 15);
    assert_eq!(state.last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn e2e_custom_step_bound() {
    let provider = Arc::new(LoopingProvider::default());
    let store = index(Arc::new(ScriptedProvider::new(vec![])));
    let session = session_with(provider.clone(), store, Arc::new(InMemorySaver::new()));

    let err = session
        .executor()
        .invoke("Loop", &RunConfig::new("t").with_recursion_limit(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StepLimitExceeded { limit: 2 }));
    assert_eq!(*provider.calls.lock().unwrap(), 1);
}

// ── E2E: Checkpoint savers ───────────────────────────────────────────────

fn sample_state() -> ConversationState {
    ConversationState::from(vec![
        Turn::human("Find employees named Carlos"),
        Turn::model_with_tools("", vec![lookup("call_1", "Carlos")]),
        Turn::tool_result("call_1", "[]"),
        Turn::tool_error("call_2", "{\"error\":\"bad\"}"),
        Turn::model("FINAL ANSWER: nobody"),
    ])
}

async fn assert_round_trip(saver: &dyn CheckpointStore) {
    let long = "t".repeat(200);
    for thread in ["plain", "with spaces", "ünïcode/slash", long.as_str()] {
        let id = ThreadId::from(thread);
        assert!(saver.load(&id).await.unwrap().is_empty());
        saver.save(&id, &sample_state()).await.unwrap();
        assert_eq!(saver.load(&id).await.unwrap(), sample_state(), "{}", saver.name());
    }
    assert_eq!(saver.threads().await.unwrap().len(), 4);
}

#[tokio::test]
async fn e2e_in_memory_saver_round_trip() {
    assert_round_trip(&InMemorySaver::new()).await;
}

#[tokio::test]
async fn e2e_file_saver_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    assert_round_trip(&FileSaver::new(dir.path())).await;
}

#[tokio::test]
async fn e2e_sqlite_saver_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let saver = SqliteSaver::new(dir.path().join("cp.db")).await.unwrap();
    assert_round_trip(&saver).await;
}
