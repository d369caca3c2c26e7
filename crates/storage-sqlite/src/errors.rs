use thiserror::Error;

use moneta_core::errors::{DatabaseError, Error};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted record: {0}")]
    Corrupted(String),

    #[error("store worker is gone")]
    WorkerGone,
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Corrupted(message) => Error::Database(DatabaseError::Corrupted(message)),
            other => Error::Database(DatabaseError::Internal(other.to_string())),
        }
    }
}
