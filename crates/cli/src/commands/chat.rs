//! `roster chat` — Interactive conversation on a single thread.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(thread: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let session = super::open_session(&config).await?;
    let thread_id = super::resolve_thread(thread);

    println!();
    println!("  Roster — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.provider.model);
    println!("  Thread:    {thread_id}");
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        match session.invoke(query, &thread_id).await {
            Ok(outcome) => println!("\n  Roster > {}\n", outcome.answer),
            Err(e) => {
                tracing::debug!(thread_id = %thread_id, error = ?e, "Chat turn failed");
                eprintln!("\n  Error: {e}\n");
            }
        }
    }

    println!("  Goodbye!");
    Ok(())
}
