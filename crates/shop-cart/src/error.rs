//! Cart Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CartError>;

/// Errors raised by cart persistence.
///
/// Cart transitions themselves are total and never fail.
#[derive(Error, Debug)]
pub enum CartError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Invalid persisted cart: {0}")]
    InvalidState(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
