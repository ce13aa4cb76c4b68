//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations.
///
/// Errors are `Clone` because a single generation pass may have many
/// waiters, each of which receives the stored error.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Generator reported a failure; displays as the generator's own message
    #[error("{0}")]
    Generator(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Build a generator failure from any displayable message
    pub fn generator(msg: impl Into<String>) -> Self {
        Self::Generator(msg.into())
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
