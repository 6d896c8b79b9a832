use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process;
use sysconf_config::RUST_LOG;
use sysconf_settings::SettingsStorage;
use sysconf_storage::StorageConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::settings::{handle_settings_command, SettingsCommands};

#[derive(Parser, Debug)]
#[command(name = "sysconf")]
#[command(about = "sysconf - manage administrator-overridable system settings")]
#[command(version)]
struct Cli {
    /// Path to the settings database (overrides SYSCONF_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: SettingsCommands,
}

#[tokio::main]
async fn main() {
    // .env is optional
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_tracing() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(RUST_LOG).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = StorageConfig::from_env()?;
    if let Some(path) = cli.database {
        config = config.with_path(path);
    }

    debug!("Opening settings database at {}", config.path.display());
    let pool = sysconf_storage::open(&config).await?;
    let storage = SettingsStorage::new(pool);

    handle_settings_command(&storage, cli.command).await
}
