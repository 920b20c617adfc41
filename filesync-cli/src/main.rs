use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filesync::{Config, StatusChannel, SyncEngine};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "filesync")]
#[command(about = "Mirrors files from configured source trees to their destinations")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror a single file that was just saved (wire this to an editor's on-save hook)
    Saved {
        /// The saved file
        path: PathBuf,
    },
    /// Sync the tree containing PATH, copying only missing or newer files
    Refresh {
        /// Any path inside a configured source root, e.g. the active document
        path: PathBuf,
    },
    /// Sync the tree containing PATH, copying every file unconditionally
    Force {
        /// Any path inside a configured source root, e.g. the active document
        path: PathBuf,
    },
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filesync")
        .join("filesync.toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level.parse::<Level>().unwrap_or(Level::INFO))
        .init();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path).await.with_context(|| {
        format!("Failed to load configuration from '{}'", config_path.display())
    })?;
    config.validate()?;

    let (reporter, mut channel) = StatusChannel::new();
    let printer = tokio::spawn(async move {
        while let Some(event) = channel.recv().await {
            println!("{event}");
        }
    });

    let engine = SyncEngine::with_reporter(&config, reporter)?;

    let report = match cli.command {
        Commands::Saved { path } => engine.on_document_saved(&path).await?,
        Commands::Refresh { path } => engine.refresh_requested(&path).await?,
        Commands::Force { path } => engine.force_requested(&path).await?,
    };

    // Dropping the engine closes the status channel so the printer drains out
    drop(engine);
    printer.await?;

    info!("{}", report.summary());
    Ok(())
}
