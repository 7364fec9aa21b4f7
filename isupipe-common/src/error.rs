//! Common error types for isupipe

use thiserror::Error;

use crate::ranking::RankingError;

/// Common result type for isupipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the isupipe crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A computation was called with input that violates its contract
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

impl From<RankingError> for Error {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::TargetNotFound(_) => Error::NotFound(err.to_string()),
            RankingError::EmptyScoreSet => Error::Precondition(err.to_string()),
        }
    }
}
