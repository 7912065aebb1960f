use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or failed while executing the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Short description of the failed operation.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A row with the same unique key already exists.
    #[error("duplicate {entity} key `{key}`")]
    UniqueViolation {
        /// Kind of row, e.g. `room`.
        entity: &'static str,
        /// The colliding key.
        key: String,
    },
    /// A write referenced a row that does not exist.
    #[error("missing {entity} referenced by write")]
    MissingReference {
        /// Kind of row that was missing, `room` or `user`.
        entity: &'static str,
    },
    /// A counter update would leave the stored value outside the `i64` range.
    #[error("{entity} count out of range")]
    CountOverflow {
        /// Counter kind, e.g. `sorena`.
        entity: &'static str,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the failure was caused by a unique key collision.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StorageError::UniqueViolation { .. })
    }
}
