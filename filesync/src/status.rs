//! Status reporting for sync operations
//!
//! The engine emits human-readable progress events to a caller-supplied
//! channel; the host decides how to display them (the CLI prints to stdout,
//! an editor shell would push them to a status bar).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::engine::SyncMode;
use crate::error::{Result, SyncError};

/// Progress and result messages emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatusEvent {
    /// A saved file was mirrored to every destination
    SavedFileSynced { path: PathBuf },
    /// A tree sync over `root` began
    TreeSyncStarted { root: PathBuf, mode: SyncMode },
    /// A tree sync over `root` finished
    TreeSyncCompleted { root: PathBuf, mode: SyncMode },
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::SavedFileSynced { path } => {
                write!(f, "Synced saved file: {}", path.display())
            }
            StatusEvent::TreeSyncStarted { root, mode: SyncMode::Force } => {
                write!(f, "Syncing: {} ...", root.display())
            }
            StatusEvent::TreeSyncStarted { root, mode: SyncMode::Refresh } => {
                write!(f, "Refreshing: {} ...", root.display())
            }
            StatusEvent::TreeSyncCompleted { root, mode: SyncMode::Force } => {
                write!(f, "Synced: {}", root.display())
            }
            StatusEvent::TreeSyncCompleted { root, mode: SyncMode::Refresh } => {
                write!(f, "Refreshed: {}", root.display())
            }
        }
    }
}

/// Receiving side of the status stream.
pub struct StatusChannel {
    receiver: mpsc::UnboundedReceiver<StatusEvent>,
}

impl StatusChannel {
    /// Create a connected reporter/channel pair.
    pub fn new() -> (StatusReporter, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (StatusReporter { sender }, Self { receiver })
    }

    /// Receive the next status event.
    pub async fn recv(&mut self) -> Option<StatusEvent> {
        self.receiver.recv().await
    }

    /// Receive a status event without blocking.
    pub fn try_recv(&mut self) -> Option<StatusEvent> {
        self.receiver.try_recv().ok()
    }

    /// Close the channel.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Sending side handed to the engine.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    sender: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusReporter {
    /// Emit one event to the host.
    pub fn emit(&self, event: StatusEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| SyncError::Status("status channel disconnected".to_string()))
    }
}
