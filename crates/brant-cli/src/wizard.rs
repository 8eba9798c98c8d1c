use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use brant_config::AppConfig;
use dialoguer::{Confirm, Input};
use tracing::info;

/// Run the interactive setup. Writes config.yml into the config directory.
pub fn run_wizard(config_dir: &Path) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        println!("Non-interactive environment detected.");
        println!(
            "To configure Brant, edit: {}/config.yml",
            config_dir.display()
        );
        println!();
        println!("Minimal config.yml example:");
        println!("---");
        println!("gateway:");
        println!("  host: 127.0.0.1");
        println!("  port: 8790");
        println!("database:");
        println!("  path: /var/lib/brant/app.db");
        return Ok(());
    }

    println!();
    println!("  Brant Setup Wizard");
    println!("  ------------------");
    println!();

    let defaults = AppConfig::default();

    let host: String = Input::new()
        .with_prompt("Gateway host")
        .default(defaults.gateway.host.clone())
        .interact_text()
        .context("host input cancelled")?;

    let port: u16 = Input::new()
        .with_prompt("Gateway port")
        .default(defaults.gateway.port)
        .interact_text()
        .context("port input cancelled")?;

    let db_path: String = Input::new()
        .with_prompt("Database path (leave empty for the default data dir)")
        .allow_empty(true)
        .interact_text()
        .context("database path input cancelled")?;

    let mut config = AppConfig::default();
    config.gateway.host = host;
    config.gateway.port = port;
    if !db_path.trim().is_empty() {
        config.database.path = Some(db_path.trim().into());
    }

    let config_path = config_dir.join("config.yml");
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists, overwrite?", config_path.display()))
            .default(false)
            .interact()
            .context("confirmation cancelled")?;
        if !overwrite {
            println!("Leaving existing config untouched.");
            return Ok(());
        }
    }

    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
    std::fs::write(&config_path, yaml)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    info!("config written to {}", config_path.display());
    println!();
    println!("Config written to {}", config_path.display());
    println!("Start the gateway with: brant serve");
    Ok(())
}
