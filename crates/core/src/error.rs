use thiserror::Error;

/// Result type alias for quill-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Quill engine and its configuration
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    /// The engine task has stopped and no longer accepts commands
    #[error("engine is no longer running")]
    EngineClosed,
}

/// Errors raised by the page model
///
/// The dispatcher checks capacity before it opens a line, so hitting one of these
/// from the engine means a caller broke the append contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The page already holds `capacity` lines
    #[error("page is full ({capacity} lines)")]
    Full { capacity: usize },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
