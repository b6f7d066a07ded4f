//! Session wiring and the public entry point.
//!
//! An [`AgentSession`] bundles the provider, vector store, checkpoint store
//! and configuration behind one handle. [`call_agent`] is the entry point
//! callers use: one query on one thread, answered or failed.

use roster_config::{AppConfig, CheckpointConfig, DEFAULT_RECURSION_LIMIT};
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::{Error, Result};
use roster_core::event::EventBus;
use roster_core::provider::Provider;
use roster_core::search::VectorStore;
use roster_core::state::ConversationState;
use roster_memory::{FileSaver, InMemorySaver, InMemoryVectorStore, SqliteSaver};
use std::sync::Arc;
use tracing::info;

use crate::gateway::ModelGateway;
use crate::graph::{GraphExecutor, InvocationOutcome, RunConfig};

pub struct AgentSession {
    config: AppConfig,
    executor: GraphExecutor,
}

impl AgentSession {
    /// Assemble a session from already-built collaborators.
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        let gateway = ModelGateway::new(
            provider,
            &config.provider.model,
            &config.agent.system_message,
        )
        .with_max_tokens(config.provider.max_tokens);

        let tools = Arc::new(roster_tools::default_registry(store));
        let executor = GraphExecutor::new(gateway, tools, checkpoints, Arc::new(EventBus::default()));

        Self { config, executor }
    }

    /// Build the provider, load the vector index and open the configured
    /// checkpoint backend.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = roster_providers::build_from_config(config)?;

        let store = InMemoryVectorStore::load_jsonl(
            provider.clone(),
            &config.provider.embedding_model,
            config.search.resolved_index_path(),
        )
        .await?;

        let checkpoints = open_checkpoint_store(&config.checkpoint).await?;

        info!(
            provider = provider.name(),
            model = %config.provider.model,
            checkpoint = checkpoints.name(),
            documents = store.len(),
            "Agent session ready"
        );

        Ok(Self::new(config.clone(), provider, Arc::new(store), checkpoints))
    }

    pub fn executor(&self) -> &GraphExecutor {
        &self.executor
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        self.executor.event_bus()
    }

    /// Run one invocation with the configured recursion limit.
    pub async fn invoke(&self, query: &str, thread_id: &str) -> Result<InvocationOutcome> {
        let run = RunConfig::new(thread_id).with_recursion_limit(self.config.agent.recursion_limit);
        self.executor.invoke(query, &run).await
    }

    /// The persisted state of a thread (empty if unseen).
    pub async fn history(&self, thread_id: &str) -> Result<ConversationState> {
        Ok(self.executor.checkpoints().load(&ThreadId::from(thread_id)).await?)
    }

    pub async fn threads(&self) -> Result<Vec<ThreadId>> {
        Ok(self.executor.checkpoints().threads().await?)
    }
}

/// Open the checkpoint backend named in the configuration.
pub async fn open_checkpoint_store(config: &CheckpointConfig) -> Result<Arc<dyn CheckpointStore>> {
    let store: Arc<dyn CheckpointStore> = match config.backend.as_str() {
        "memory" => Arc::new(InMemorySaver::new()),
        "file" => Arc::new(FileSaver::new(config.resolved_path())),
        "sqlite" => Arc::new(SqliteSaver::new(config.resolved_path()).await?),
        other => {
            return Err(Error::Config {
                message: format!("unknown checkpoint backend '{other}'"),
            });
        }
    };
    Ok(store)
}

/// Answer `query` on `thread_id` and return the final model turn's content.
///
/// Loads the thread's prior state, runs the agent loop with a step bound of
/// 15 and persists the result. Fails instead of returning a partial answer.
pub async fn call_agent(session: &AgentSession, query: &str, thread_id: &str) -> Result<String> {
    let run = RunConfig::new(thread_id).with_recursion_limit(DEFAULT_RECURSION_LIMIT);
    let outcome = session.executor().invoke(query, &run).await?;
    Ok(outcome.answer)
}
