//! File Mirroring Engine
//!
//! A small synchronization library that mirrors files from configured source
//! directory trees to corresponding destination trees, providing:
//! - Anchored-prefix path mapping with fan-out to multiple destinations
//! - Exclusion filtering over regex patterns
//! - Save-triggered single-file sync and on-demand tree sync
//! - Freshness comparison by modification time (refresh mode)
//! - Mirrored copy with directory creation and permission-mode propagation
//! - Status reporting to a caller-supplied channel
//!
//! Hosting environments (an editor shell, the bundled CLI) invoke the
//! engine's trigger interface and display its status messages; the engine
//! knows nothing about them.

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod preserve;
pub mod status;

// Re-export main types and functions
pub use compare::{freshness, Freshness};
pub use config::{default_exclude_patterns, Config, SyncRule};
pub use engine::{SyncEngine, SyncMode, SyncReport, SyncTask};
pub use error::{Result, SyncError};
pub use mapper::PathMapper;
pub use status::{StatusChannel, StatusEvent, StatusReporter};

/// Mirror a single saved file according to `config`.
pub async fn sync_saved_file(
    config: &Config,
    path: impl AsRef<std::path::Path>,
) -> Result<SyncReport> {
    let engine = SyncEngine::new(config)?;
    engine.sync_on_save(path.as_ref()).await
}

/// Sync every configured tree containing `path`, per `mode`.
pub async fn sync_tree(
    config: &Config,
    path: impl AsRef<std::path::Path>,
    mode: SyncMode,
) -> Result<SyncReport> {
    let engine = SyncEngine::new(config)?;
    engine.sync_tree(path.as_ref(), mode).await
}
