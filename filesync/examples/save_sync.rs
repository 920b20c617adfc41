//! Minimal example: mirror one saved file according to a rule set.
//!
//! Run with: cargo run --example save_sync -- <saved-file>

use std::path::PathBuf;

use filesync::{Config, StatusChannel, SyncEngine, SyncRule};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let saved: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/home/user/project/index.html".to_string())
        .into();

    let config = Config {
        rules: vec![SyncRule {
            source: "/home/user/project/".to_string(),
            destinations: vec!["/srv/www/project/".to_string()],
        }],
        exclude: filesync::default_exclude_patterns(),
    };
    config.validate()?;

    let (reporter, mut channel) = StatusChannel::new();
    let engine = SyncEngine::with_reporter(&config, reporter)?;

    let report = engine.on_document_saved(&saved).await?;
    drop(engine);

    while let Some(event) = channel.try_recv() {
        println!("{event}");
    }
    println!("Done: {}", report.summary());

    Ok(())
}
