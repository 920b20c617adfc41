//! The synchronization engine: save-triggered and tree-mode mirroring

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compare::{freshness, Freshness};
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::mapper::{CompiledRule, PathMapper};
use crate::preserve;
use crate::status::{StatusEvent, StatusReporter};

/// Tree-sync trigger modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Copy only files whose destination is absent or older than the source
    Refresh,
    /// Copy every non-excluded file unconditionally
    Force,
}

/// One pending copy operation, created per file per destination rule and
/// discarded once the attempt completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Counters accumulated over one engine invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Files written to a destination
    pub copied: usize,
    /// Files left alone (destination already up to date, or unmappable path)
    pub skipped: usize,
    /// Copy attempts that failed and were walked past
    pub failed: usize,
}

impl SyncReport {
    /// True when the invocation touched nothing and reported nothing.
    pub fn is_noop(&self) -> bool {
        self.copied == 0 && self.skipped == 0 && self.failed == 0
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} copied, {} skipped, {} failed",
            self.copied, self.skipped, self.failed
        )
    }
}

/// Mirrors files from configured source trees to their destinations.
///
/// Every operation runs serially to completion on the calling task; the
/// engine spawns no workers and keeps no state between invocations.
pub struct SyncEngine {
    mapper: PathMapper,
    reporter: Option<StatusReporter>,
}

impl SyncEngine {
    /// Create an engine over an immutable configuration, without status
    /// reporting.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            mapper: PathMapper::new(config)?,
            reporter: None,
        })
    }

    /// Create an engine that emits status events to `reporter`.
    pub fn with_reporter(config: &Config, reporter: StatusReporter) -> Result<Self> {
        Ok(Self {
            mapper: PathMapper::new(config)?,
            reporter: Some(reporter),
        })
    }

    /// The mapper backing this engine.
    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Trigger: the host observed a document being saved.
    pub async fn on_document_saved(&self, path: &Path) -> Result<SyncReport> {
        self.sync_on_save(path).await
    }

    /// Trigger: the user requested a refresh of the active document's tree.
    pub async fn refresh_requested(&self, active: &Path) -> Result<SyncReport> {
        self.sync_tree(active, SyncMode::Refresh).await
    }

    /// Trigger: the user requested a forced sync of the active document's tree.
    pub async fn force_requested(&self, active: &Path) -> Result<SyncReport> {
        self.sync_tree(active, SyncMode::Force).await
    }

    /// Mirror a single saved file to every destination of every matching
    /// rule, unconditionally.
    ///
    /// Excluded paths, paths outside all configured roots, and sources that
    /// vanished before the copy (a "save as" landing elsewhere, or a race)
    /// are silent no-ops. A copy failure ends the invocation; there is only
    /// one file at stake.
    pub async fn sync_on_save(&self, path: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        if self.mapper.is_excluded(path) {
            debug!("Excluded from sync: {}", path.display());
            return Ok(report);
        }

        let destinations = self.mapper.find_destinations(path);
        if destinations.is_empty() {
            return Ok(report);
        }

        if !path.exists() {
            debug!("Source vanished before sync: {}", path.display());
            return Ok(report);
        }

        for destination in destinations {
            let task = SyncTask {
                source: path.to_path_buf(),
                destination,
            };
            self.copy_file(&task.source, &task.destination).await?;
            report.copied += 1;
        }

        self.announce(StatusEvent::SavedFileSynced {
            path: path.to_path_buf(),
        })?;

        Ok(report)
    }

    /// Walk every configured source root containing `active` and mirror its
    /// files per `mode`. No matching root is a silent no-op.
    ///
    /// A failed copy is logged and counted but does not abort the walk.
    pub async fn sync_tree(&self, active: &Path, mode: SyncMode) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for rule in self.mapper.matching_rules(active) {
            let root = rule.source_root().to_path_buf();
            self.announce(StatusEvent::TreeSyncStarted {
                root: root.clone(),
                mode,
            })?;

            self.sync_root(rule, mode, &mut report).await;

            self.announce(StatusEvent::TreeSyncCompleted { root, mode })?;
        }

        Ok(report)
    }

    /// Depth-first walk of one rule's source root. Excluded directories are
    /// pruned without descending; excluded files are skipped.
    async fn sync_root(&self, rule: &CompiledRule, mode: SyncMode, report: &mut SyncReport) {
        let walker = WalkDir::new(rule.source_root())
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.mapper.is_excluded(entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error under '{}': {}", rule.source_root().display(), e);
                    report.failed += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(path_str) = entry.path().to_str() else {
                warn!("Skipping non-UTF-8 path: {}", entry.path().display());
                report.skipped += 1;
                continue;
            };

            for destination in rule.map(path_str) {
                let task = SyncTask {
                    source: entry.path().to_path_buf(),
                    destination,
                };
                match self.execute(&task, mode).await {
                    Ok(true) => report.copied += 1,
                    Ok(false) => report.skipped += 1,
                    Err(e) => {
                        warn!(
                            "Failed to sync '{}' to '{}': {}",
                            task.source.display(),
                            task.destination.display(),
                            e
                        );
                        report.failed += 1;
                    }
                }
            }
        }
    }

    /// Carry out one task. Returns true when a copy happened, false when the
    /// destination was already up to date.
    async fn execute(&self, task: &SyncTask, mode: SyncMode) -> Result<bool> {
        if mode == SyncMode::Refresh {
            if freshness(&task.source, &task.destination).await? == Freshness::UpToDate {
                return Ok(false);
            }
        }
        self.copy_file(&task.source, &task.destination).await?;
        Ok(true)
    }

    /// Mirror one file: create missing parent directories (propagating the
    /// source parent's permission mode onto a newly created immediate
    /// parent), then copy content and mode, overwriting any existing
    /// destination. A directory source is a no-op; parent creation is all a
    /// directory needs.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    SyncError::copy_error(
                        source,
                        destination,
                        format!("Failed to create parent directory: {}", e),
                    )
                })?;
                if let Some(source_parent) = source.parent() {
                    preserve::copy_mode(source_parent, parent).await?;
                }
            }
        }

        let metadata = fs::metadata(source).await?;
        if metadata.is_dir() {
            return Ok(());
        }

        fs::copy(source, destination).await.map_err(|e| {
            SyncError::copy_error(source, destination, format!("Failed to copy file: {}", e))
        })?;
        preserve::copy_mode(source, destination).await?;

        Ok(())
    }

    fn announce(&self, event: StatusEvent) -> Result<()> {
        match &self.reporter {
            Some(reporter) => reporter.emit(event),
            None => Ok(()),
        }
    }
}
