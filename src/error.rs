//! Error types for spaced-recall

use thiserror::Error;

/// Result type alias for spaced-recall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scheduling, grading or storing reviews
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed a value outside the documented domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Note or review does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Grader reply could not be turned into a verdict
    #[error("grading error: {0}")]
    Grading(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
