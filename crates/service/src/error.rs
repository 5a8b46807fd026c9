use pixelpost_storage::StorageError;
use thiserror::Error;

use crate::relay::RelayError;
use crate::validation::ValidationError;

/// Errors returned to the HTTP and CLI surfaces.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Compose input rejected before it reached the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }
}

/// Why a single message could not be delivered. Both variants are permanent.
///
/// The `Display` text is stored verbatim as the message's `last_error`.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] RelayError),
}
