//! Graph executor — the AGENT ⇄ TOOLS loop for one invocation.
//!
//! An invocation loads the thread's checkpoint, appends the human turn and
//! walks the node graph until END or the step bound. Every AGENT or TOOLS
//! node execution is one step.
//!
//! State is persisted only at resolved boundaries: after a TOOLS step (every
//! request of the preceding model turn answered) and at END. If an invocation
//! fails, whatever it produced after the last boundary is discarded.

use chrono::Utc;
use roster_core::checkpoint::{CheckpointStore, ThreadId};
use roster_core::error::{Error, Result};
use roster_core::event::{DomainEvent, EventBus};
use roster_core::message::Turn;
use roster_core::state::ConversationState;
use roster_core::tool::ToolRegistry;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::gateway::ModelGateway;
use crate::routing::Node;

/// Per-invocation settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub thread_id: ThreadId,
    /// Maximum AGENT/TOOLS node executions
    pub recursion_limit: u32,
}

impl RunConfig {
    pub fn new(thread_id: impl Into<ThreadId>) -> Self {
        Self {
            thread_id: thread_id.into(),
            recursion_limit: roster_config::DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// The result of a completed invocation.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    /// Content of the final model turn
    pub answer: String,
    /// Full thread state as persisted at END
    pub state: ConversationState,
    /// AGENT/TOOLS steps executed
    pub steps: u32,
}

/// Releases the thread claim when the invocation finishes, however it ends.
struct ThreadGuard {
    active: Arc<Mutex<HashSet<ThreadId>>>,
    thread_id: ThreadId,
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.thread_id);
        }
    }
}

pub struct GraphExecutor {
    gateway: ModelGateway,
    tools: Arc<ToolRegistry>,
    checkpoints: Arc<dyn CheckpointStore>,
    event_bus: Arc<EventBus>,
    active: Arc<Mutex<HashSet<ThreadId>>>,
}

impl GraphExecutor {
    pub fn new(
        gateway: ModelGateway,
        tools: Arc<ToolRegistry>,
        checkpoints: Arc<dyn CheckpointStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            gateway,
            tools,
            checkpoints,
            event_bus,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn checkpoints(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpoints
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Run one invocation for `query` on the configured thread.
    ///
    /// Fails with [`Error::ThreadBusy`] if another invocation on the same
    /// thread is in flight, and with [`Error::StepLimitExceeded`] if END is
    /// not reached within `recursion_limit` steps.
    pub async fn invoke(&self, query: &str, config: &RunConfig) -> Result<InvocationOutcome> {
        let _guard = self.claim(&config.thread_id)?;
        let span = info_span!("invoke", thread_id = %config.thread_id);

        let result = self.run(query, config).instrument(span).await;
        if let Err(e) = &result {
            warn!(thread_id = %config.thread_id, error = %e, "Invocation failed");
            self.event_bus.publish(DomainEvent::InvocationFailed {
                thread_id: config.thread_id.to_string(),
                error_message: e.to_string(),
                timestamp: Utc::now(),
            });
        }
        result
    }

    fn claim(&self, thread_id: &ThreadId) -> Result<ThreadGuard> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| Error::Internal("thread registry lock poisoned".into()))?;
        if !active.insert(thread_id.clone()) {
            return Err(Error::ThreadBusy(thread_id.to_string()));
        }
        Ok(ThreadGuard {
            active: self.active.clone(),
            thread_id: thread_id.clone(),
        })
    }

    async fn run(&self, query: &str, config: &RunConfig) -> Result<InvocationOutcome> {
        let thread_id = &config.thread_id;
        let limit = config.recursion_limit;

        let mut state = self.checkpoints.load(thread_id).await?;
        info!(prior_turns = state.len(), limit, "Invocation starting");
        state.push(Turn::human(query));

        let mut node = Node::Agent;
        let mut steps = 0u32;

        while !node.is_terminal() {
            if steps >= limit {
                return Err(Error::StepLimitExceeded { limit });
            }
            steps += 1;
            debug!(step = steps, ?node, "Executing step");

            match node {
                Node::Agent => self.agent_step(thread_id, &mut state).await?,
                Node::Tools => {
                    self.tools_step(thread_id, &mut state).await?;
                    self.persist(thread_id, &state).await?;
                }
                Node::End => {}
            }
            node = node.next(&state);
        }

        self.persist(thread_id, &state).await?;

        let answer = state.last().map(|t| t.content.clone()).unwrap_or_default();
        info!(steps, turns = state.len(), "Invocation completed");
        Ok(InvocationOutcome {
            answer,
            state,
            steps,
        })
    }

    async fn agent_step(&self, thread_id: &ThreadId, state: &mut ConversationState) -> Result<()> {
        let response = self.gateway.invoke(state, &self.tools).await?;
        let turn = response.turn;

        self.event_bus.publish(DomainEvent::ModelResponded {
            thread_id: thread_id.to_string(),
            model: response.model,
            tool_calls: turn.tool_calls.len(),
            tokens_used: response.usage.map(|u| u.total_tokens),
            timestamp: Utc::now(),
        });
        if turn.is_final_answer() {
            debug!("Model marked its reply as a final answer");
        }

        state.push(turn);
        Ok(())
    }

    /// Answer every tool request of the latest model turn, in order.
    async fn tools_step(&self, thread_id: &ThreadId, state: &mut ConversationState) -> Result<()> {
        let calls = match state.last() {
            Some(turn) if turn.requests_tools() => turn.tool_calls.clone(),
            _ => {
                return Err(Error::Internal(
                    "TOOLS step without a pending tool request".into(),
                ));
            }
        };

        for call in &calls {
            let start = std::time::Instant::now();
            let result = self.tools.execute(call).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let turn = match result {
                Ok(output) => Turn::tool_result(&call.id, output.output),
                Err(e) if e.is_recoverable() => {
                    warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call rejected");
                    let payload = serde_json::json!({ "error": e.to_string() });
                    Turn::tool_error(&call.id, payload.to_string())
                }
                Err(e) => return Err(e.into()),
            };

            self.event_bus.publish(DomainEvent::ToolExecuted {
                thread_id: thread_id.to_string(),
                tool_name: call.name.clone(),
                call_id: call.id.clone(),
                success: !turn.is_error,
                duration_ms,
                timestamp: Utc::now(),
            });
            state.push(turn);
        }
        Ok(())
    }

    async fn persist(&self, thread_id: &ThreadId, state: &ConversationState) -> Result<()> {
        self.checkpoints.save(thread_id, state).await?;
        debug!(turns = state.len(), "Checkpoint saved");
        self.event_bus.publish(DomainEvent::CheckpointSaved {
            thread_id: thread_id.to_string(),
            turns: state.len(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
