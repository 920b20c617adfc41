//! Permission-mode propagation between source and destination entries

use std::path::Path;

use tokio::fs;

use crate::error::{Result, SyncError};

/// Copy the permission mode of `source` onto `destination`.
///
/// On Unix the full mode bits are applied; Windows only carries a read-only
/// attribute, so the mode degrades to that flag there.
pub async fn copy_mode(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .await
        .map_err(|e| SyncError::path_error(source, format!("Failed to read metadata: {}", e)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(metadata.permissions().mode());
        fs::set_permissions(destination, permissions)
            .await
            .map_err(|e| SyncError::path_error(destination, format!("Failed to set permissions: {}", e)))?;
    }

    #[cfg(windows)]
    {
        let mut permissions = fs::metadata(destination)
            .await
            .map_err(|e| SyncError::path_error(destination, format!("Failed to read metadata: {}", e)))?
            .permissions();
        permissions.set_readonly(metadata.permissions().readonly());
        fs::set_permissions(destination, permissions)
            .await
            .map_err(|e| SyncError::path_error(destination, format!("Failed to set permissions: {}", e)))?;
    }

    Ok(())
}
