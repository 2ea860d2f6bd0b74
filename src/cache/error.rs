//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// A cache miss is never an error: drivers report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The selected backend was not compiled into this build.
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid expiration '{expression}': {reason}")]
    InvalidExpiration { expression: String, reason: String },
}

impl CacheError {
    pub fn invalid_expiration(expression: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidExpiration {
            expression: expression.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
