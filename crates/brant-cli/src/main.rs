mod banner;
mod wizard;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use brant_config::{AppConfig, ConfigLoader};
use brant_db::{MigrationStore, Migrator, REGISTRY};
use brant_gateway::GatewayServer;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brant", version, about = "Schema migration gateway")]
struct Cli {
    /// Directory holding config.yml and the default data dir.
    #[arg(long, global = true, env = "BRANT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway.
    Serve,
    /// Apply pending migrations once and exit.
    Migrate,
    /// Show applied and pending migrations.
    Status,
    /// Interactive setup, writes config.yml.
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = ConfigLoader::load(&config_dir)?;
            serve(config, &config_dir).await
        }
        Command::Migrate => {
            let config = ConfigLoader::load(&config_dir)?;
            migrate(&config)
        }
        Command::Status => {
            let config = ConfigLoader::load(&config_dir)?;
            status(&config)
        }
        Command::Init => wizard::run_wizard(&config_dir),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("brant=info,brant_gateway=info,brant_db=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".brant"))
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn serve(config: AppConfig, config_dir: &Path) -> Result<()> {
    banner::print_banner(
        &config.gateway.host,
        config.gateway.port,
        &config,
        config_dir,
    );
    GatewayServer::new(config).run().await?;
    Ok(())
}

fn open_migrator(config: &AppConfig) -> Result<Migrator> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let store = MigrationStore::open(&db_path)?;
    Ok(Migrator::new(Arc::new(store)))
}

fn migrate(config: &AppConfig) -> Result<()> {
    let migrator = open_migrator(config)?;
    let report = migrator.run()?;

    if report.applied.is_empty() {
        println!("Nothing to apply, database is up to date.");
    } else {
        for migration in &report.applied {
            println!("applied {} ({})", migration.version, migration.name);
        }
        println!("Applied {} migration(s).", report.applied.len());
    }
    Ok(())
}

fn status(config: &AppConfig) -> Result<()> {
    let migrator = open_migrator(config)?;
    let status = migrator.status()?;
    let applied = migrator.store().applied_versions()?;

    println!("Database: {}", config.database_path().display());
    match status.schema_version {
        Some(version) => println!("Schema version: {version}"),
        None => println!("Schema version: none (fresh database)"),
    }
    println!();

    for migration in REGISTRY {
        let mark = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        println!("  {:>4}  {:<36} {mark}", migration.version, migration.name);
    }
    Ok(())
}
