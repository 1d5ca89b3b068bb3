//! Error types for credential operations

/// Errors from credential and token handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no token stored for account {0}")]
    MissingToken(i64),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Result alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;
