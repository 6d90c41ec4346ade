//! Error types for the link layer
use thiserror::Error;

/// Link layer errors
#[derive(Error, Debug)]
pub enum LinkError {
    /// Transport operation failed (scan, connect, write, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The write characteristic has not been discovered yet
    #[error("write characteristic not available")]
    CharacteristicUnavailable,

    /// The driver task is no longer running
    #[error("link driver stopped")]
    DriverStopped,

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;
