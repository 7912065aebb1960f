//! Google Gemini `generateContent` adapter.

mod config;
mod error;
mod generator;
mod models;

pub use config::GeminiConfig;
pub use error::GeminiError;
pub use generator::GeminiGenerator;

use super::GenerationError;

impl From<GeminiError> for GenerationError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::EmptyCandidates => GenerationError::EmptyResponse,
            other => GenerationError::upstream(other.to_string(), other),
        }
    }
}
