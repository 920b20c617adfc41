//! Freshness comparison between a source file and its destination
//!
//! The only comparison this engine performs is by modification timestamp;
//! content is never inspected.

use std::path::Path;

use tokio::fs;

use crate::error::{Result, SyncError};

/// Outcome of comparing a source file against its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Destination does not exist yet
    DestinationMissing,
    /// Source was modified strictly later than the destination
    SourceNewer,
    /// Destination is at least as recent as the source
    UpToDate,
}

/// Compare modification timestamps. Equal timestamps are [`Freshness::UpToDate`];
/// only a strictly newer source warrants a copy in refresh mode.
pub async fn freshness(source: &Path, destination: &Path) -> Result<Freshness> {
    let dest_metadata = match fs::metadata(destination).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Freshness::DestinationMissing);
        }
        Err(e) => {
            return Err(SyncError::path_error(
                destination,
                format!("Failed to read metadata: {}", e),
            ));
        }
    };

    let source_metadata = fs::metadata(source)
        .await
        .map_err(|e| SyncError::path_error(source, format!("Failed to read metadata: {}", e)))?;

    let source_mtime = source_metadata
        .modified()
        .map_err(|e| SyncError::path_error(source, format!("Modification time unavailable: {}", e)))?;
    let dest_mtime = dest_metadata
        .modified()
        .map_err(|e| SyncError::path_error(destination, format!("Modification time unavailable: {}", e)))?;

    if source_mtime > dest_mtime {
        Ok(Freshness::SourceNewer)
    } else {
        Ok(Freshness::UpToDate)
    }
}
