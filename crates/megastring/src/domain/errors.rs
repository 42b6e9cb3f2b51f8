//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The path-list file could not be read.
#[derive(Debug, Error)]
#[error("failed to read path list {}: {source}", .path.display())]
pub struct PathListError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// No clipboard backend accepted the text.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard rejected text: {0}")]
    Rejected(String),
    #[error("failed to copy text to clipboard using available backends")]
    NoBackend,
}

/// Errors that abort a single pipeline run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    PathList(#[from] PathListError),
    #[error(transparent)]
    Publish(#[from] ClipboardError),
}

/// Errors from the change watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to initialize watcher: {0}")]
    Init(#[from] notify::Error),
    #[error("cannot watch {}: {source}", .path.display())]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("file event channel closed unexpectedly")]
    ChannelClosed,
}
