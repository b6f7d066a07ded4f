//! `roster status` — Show configuration status.

use roster_config::AppConfig;
use roster_core::error::ProviderError;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let index_path = config.search.resolved_index_path();

    println!("Roster Status");
    println!("=============");
    println!("  Config dir:       {}", AppConfig::config_dir().display());
    println!("  Provider:         {} ({})", config.provider.name, config.provider.base_url);
    println!("  Model:            {}", config.provider.model);
    println!("  Embeddings:       {}", config.provider.embedding_model);
    println!("  API key:          {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Recursion limit:  {}", config.agent.recursion_limit);
    println!(
        "  Checkpoints:      {} ({})",
        config.checkpoint.backend,
        config.checkpoint.resolved_path().display()
    );
    println!("  Employee index:   {}", index_path.display());

    if config.has_api_key() {
        let provider = roster_providers::build_from_config(&config)?;
        println!("  Reachable:        {}", describe_health(provider.health_check().await));
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `roster init` first");
    }
    if !index_path.exists() {
        println!("  ⚠️  Employee index not found");
    }

    Ok(())
}

fn describe_health(result: Result<bool, ProviderError>) -> String {
    match result {
        Ok(true) => "yes".into(),
        Ok(false) => "no (endpoint rejected the request)".into(),
        Err(e) => format!("no ({e})"),
    }
}
