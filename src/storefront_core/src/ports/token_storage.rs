use thiserror::Error;

use crate::domain::credentials::BearerToken;

#[derive(Debug, Error)]
pub enum TokenStorageError {
    #[error("Token storage I/O error: {0}")]
    Io(String),
    #[error("Stored token is unreadable: {0}")]
    Corrupt(String),
}

/// Durable home of the bearer token: exactly one key.
///
/// Synchronous because logout must complete without suspending.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<BearerToken>, TokenStorageError>;
    fn store(&self, token: &BearerToken) -> Result<(), TokenStorageError>;
    fn clear(&self) -> Result<(), TokenStorageError>;
}
