//! `roster history` — Print a thread's persisted turns.

use roster_core::checkpoint::ThreadId;
use roster_core::message::{Role, Turn};

pub async fn run(thread: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = roster_agent::open_checkpoint_store(&config.checkpoint).await?;
    let state = store.load(&ThreadId::from(thread.as_str())).await?;

    if state.is_empty() {
        println!("No turns stored for thread '{thread}'.");
        return Ok(());
    }

    for turn in &state {
        println!("{}", format_turn(turn));
    }
    Ok(())
}

fn format_turn(turn: &Turn) -> String {
    let time = turn.timestamp.format("%Y-%m-%d %H:%M:%S");
    match turn.role {
        Role::Human => format!("[{time}] you: {}", turn.content),
        Role::System => format!("[{time}] system: {}", turn.content),
        Role::Model if turn.requests_tools() => {
            let calls: Vec<String> = turn
                .tool_calls
                .iter()
                .map(|c| format!("{}({})", c.name, c.arguments))
                .collect();
            format!("[{time}] model → {}", calls.join(", "))
        }
        Role::Model => format!("[{time}] model: {}", turn.content),
        Role::Tool => {
            let id = turn.tool_call_id.as_deref().unwrap_or("?");
            let label = if turn.is_error { "tool error" } else { "tool" };
            format!("[{time}] {label} [{id}]: {}", turn.content)
        }
    }
}
