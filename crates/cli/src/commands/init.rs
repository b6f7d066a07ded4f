//! `roster init` — Write a default config file.

use roster_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config file exists: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Wrote default config: {}", config_path.display());
    }

    println!();
    println!("  Next steps:");
    println!("    1. Set ROSTER_API_KEY (or GEMINI_API_KEY)");
    println!(
        "    2. Place the employee index at {}",
        AppConfig::default().search.resolved_index_path().display()
    );
    println!("    3. Run `roster ask \"Who works in Finance?\"`");
    Ok(())
}
