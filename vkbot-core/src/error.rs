//! Error types for the framework core.

use thiserror::Error;

/// Top-level error for framework plumbing (event bus, logging setup, IO).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Event bus closed")]
    BusClosed,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
