//! `roster threads` — List persisted threads.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = roster_agent::open_checkpoint_store(&config.checkpoint).await?;
    let threads = store.threads().await?;

    if threads.is_empty() {
        println!("No threads stored ({} backend).", store.name());
        return Ok(());
    }

    for thread in threads {
        let turns = store.load(&thread).await?.len();
        println!("{thread}\t{turns} turns");
    }
    Ok(())
}
