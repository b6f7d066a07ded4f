//! Roster CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Answer one question on a thread
//! - `chat`     — Interactive conversation on a thread
//! - `history`  — Print a thread's persisted turns
//! - `threads`  — List persisted threads
//! - `status`   — Show configuration status
//! - `init`     — Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Roster — HR assistant agent with resumable threads",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question to answer
        query: String,

        /// Thread to continue (a new one is created when omitted)
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Chat interactively on one thread
    Chat {
        /// Thread to continue (a new one is created when omitted)
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Show the persisted turns of a thread
    History {
        #[arg(short, long)]
        thread: String,
    },

    /// List persisted threads
    Threads,

    /// Show configuration status
    Status,

    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { query, thread } => commands::ask::run(query, thread).await?,
        Commands::Chat { thread } => commands::chat::run(thread).await?,
        Commands::History { thread } => commands::history::run(thread).await?,
        Commands::Threads => commands::threads::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Init => commands::init::run().await?,
    }

    Ok(())
}
