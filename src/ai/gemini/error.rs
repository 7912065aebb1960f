//! Error types raised by the Gemini adapter.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`GeminiError`] failures.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Failures that can occur while calling the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Required environment variable is missing.
    #[error("missing Gemini environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Gemini client")]
    ClientBuilder {
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to send Gemini request for model `{model}`")]
    RequestSend {
        /// Model the request targeted.
        model: String,
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
    /// Gemini answered with a non-success status code.
    #[error("unexpected Gemini response status {status} for model `{model}`")]
    RequestStatus {
        /// Model the request targeted.
        model: String,
        /// Status code Gemini answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed.
    #[error("failed to decode Gemini response for model `{model}`")]
    DecodeResponse {
        /// Model the request targeted.
        model: String,
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
    /// Gemini answered without any text candidate.
    #[error("Gemini returned no text candidates")]
    EmptyCandidates,
}
