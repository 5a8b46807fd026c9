//! Failures surfaced by [`EmailStore`](crate::EmailStore) implementations.

use pixelpost_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A query that must return a row returned none.
    #[error("email message not found")]
    NotFound,

    /// Another message already owns this tracking token.
    #[error("tracking token already in use: {0}")]
    DuplicateToken(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored row could not be mapped back to an [`EmailMessage`](pixelpost_core::EmailMessage).
    #[error("corrupt email row: {0}")]
    CorruptRow(#[from] CoreError),

    #[error("schema migration failed: {0}")]
    Migration(#[source] sqlx::Error),

    /// The store is refusing writes.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Connection-level failures that may clear up on their own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            Self::Unavailable(_) => true,
            _ => false,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateToken(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::DuplicateToken(db.message().to_owned())
            },
            other => Self::Database(other),
        }
    }
}
