//! Error types for the bridge

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the library layer
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Download failed: {0}")]
    Download(String),
}

/// Reasons a working-directory change is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
