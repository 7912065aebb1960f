use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    ai::GenerationError,
    dao::storage::StorageError,
    ids::IdError,
    state::lifecycle::InvalidTransition,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// The text generator failed while a room was being started.
    #[error("generator unavailable: {0}")]
    Unavailable(String),
    /// Unexpected failure that the caller cannot act upon.
    #[error("internal error: {0}")]
    Internal(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
    /// Every generated identifier collided with an existing one.
    #[error("no free identifier after {attempts} attempts")]
    IdsExhausted {
        /// Number of identifiers tried before giving up.
        attempts: u32,
    },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingReference { entity } => {
                ServiceError::NotFound(format!("{entity} not found"))
            }
            StorageError::CountOverflow { entity } => {
                ServiceError::InvalidInput(format!("{entity} count would exceed the maximum"))
            }
            other => ServiceError::Storage(other),
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<IdError> for ServiceError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::Exhausted { attempts } => ServiceError::IdsExhausted { attempts },
            IdError::Storage(source) => source.into(),
        }
    }
}

impl ServiceError {
    /// Generator failure surfaced while starting a room.
    pub fn unavailable(err: GenerationError) -> Self {
        ServiceError::Unavailable(err.to_string())
    }

    /// Generator failure surfaced while summarizing a log batch.
    pub fn generation_failed(err: GenerationError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input or a request the room's state forbids.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A dependency could not serve the request right now.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => {
                error!(error = ?source, "storage failure");
                AppError::Internal("storage failure".into())
            }
            ServiceError::Unavailable(message) => {
                error!(%message, "text generation failed");
                AppError::ServiceUnavailable("text generation is unavailable".into())
            }
            ServiceError::Internal(message) => {
                error!(%message, "request failed");
                AppError::Internal("unexpected failure".into())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Timeout => AppError::ServiceUnavailable("operation timed out".into()),
            ServiceError::IdsExhausted { attempts } => {
                error!(attempts, "identifier space exhausted");
                AppError::ServiceUnavailable("could not allocate an identifier".into())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
