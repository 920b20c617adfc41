//! Error types for the sync engine library

use std::path::PathBuf;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering configuration, pattern, and filesystem failures
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file parse errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Pattern compilation errors
    #[error("Pattern error in '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Path-related errors
    #[error("Path error at '{path}': {message}")]
    Path { path: PathBuf, message: String },

    /// File copying errors
    #[error("File copy error: {message}")]
    FileCopy { message: String },

    /// Status reporting errors
    #[error("Status reporting error: {0}")]
    Status(String),
}

impl SyncError {
    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new pattern error
    pub fn pattern_error(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a new path error
    pub fn path_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new file copy error
    pub fn copy_error(
        source: impl AsRef<std::path::Path>,
        dest: impl AsRef<std::path::Path>,
        message: impl Into<String>,
    ) -> Self {
        let full_message = format!(
            "File copy error from '{}' to '{}': {}",
            source.as_ref().display(),
            dest.as_ref().display(),
            message.into()
        );
        Self::FileCopy {
            message: full_message,
        }
    }
}
