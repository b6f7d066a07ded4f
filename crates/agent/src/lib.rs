//! The Roster agent loop.
//!
//! One invocation runs a small graph:
//!
//! 1. **Load** the thread's checkpoint and append the human turn
//! 2. **AGENT**: render the prompt and call the model
//! 3. **Route**: if the model requested tools go to TOOLS, otherwise END
//! 4. **TOOLS**: run each requested tool once, append one tool turn per
//!    request, checkpoint, and loop back to AGENT
//! 5. **END**: checkpoint and return the final model turn's content
//!
//! The loop is bounded by a per-invocation step limit.

pub mod gateway;
pub mod graph;
pub mod routing;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use gateway::{ModelGateway, SYSTEM_PROMPT_TEMPLATE, render_system_prompt};
pub use graph::{GraphExecutor, InvocationOutcome, RunConfig};
pub use routing::{Node, Route, route};
pub use session::{AgentSession, call_agent, open_checkpoint_store};
