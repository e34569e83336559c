//! # Error Types
//!
//! Custom error types for Pylon Bridge using `thiserror`.
//!
//! The battery model itself never fails; these errors only come from the
//! layers around it (configuration, snapshot loading, publishing).

use thiserror::Error;

/// Main error type for Pylon Bridge
#[derive(Debug, Error)]
pub enum PylonError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed stack snapshot
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Snapshot reports more units than the stack can hold
    #[error("Stack capacity exceeded: {count} units reported, at most {max} supported")]
    Capacity {
        count: usize,
        max: usize,
    },
}

/// Result type alias for Pylon Bridge
pub type Result<T> = std::result::Result<T, PylonError>;
