pub mod ask;
pub mod chat;
pub mod history;
pub mod init;
pub mod status;
pub mod threads;

use roster_agent::AgentSession;
use roster_config::AppConfig;
use roster_core::checkpoint::ThreadId;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load()?)
}

/// Build a session, with setup guidance when no API key is configured.
pub(crate) async fn open_session(config: &AppConfig) -> Result<AgentSession, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ROSTER_API_KEY  (generic)");
        eprintln!("    GEMINI_API_KEY  (Google AI Studio)");
        eprintln!("    OPENAI_API_KEY  (OpenAI-compatible endpoints)");
        eprintln!();
        eprintln!("  Or add `api_key` to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(AgentSession::from_config(config).await?)
}

/// Use the given thread or start a new one, announcing new ids on stderr.
pub(crate) fn resolve_thread(thread: Option<String>) -> String {
    match thread {
        Some(id) => id,
        None => {
            let id = ThreadId::new().to_string();
            eprintln!("  thread: {id}");
            id
        }
    }
}
