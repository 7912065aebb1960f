//! Text generation capability used while rooms change state.
//!
//! The rest of the crate only sees [`DiscussionGenerator`]; which adapter backs it
//! is decided once, when the application state is composed.

/// Deterministic generator for tests and offline runs.
pub mod canned;
#[cfg(feature = "gemini")]
pub mod gemini;

use std::{error::Error, fmt::Write};

use futures::future::BoxFuture;
use thiserror::Error;

/// Result alias for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Opaque failure of the generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend could not be reached or rejected the request.
    #[error("generator unavailable: {message}")]
    Upstream {
        /// Short description of the failed call.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered without any usable text.
    #[error("generator returned no usable text")]
    EmptyResponse,
    /// The backend reported a failure without an underlying error value.
    #[error("generator failed: {0}")]
    Failed(String),
}

impl GenerationError {
    /// Construct an upstream error from any backend failure.
    pub fn upstream(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        GenerationError::Upstream {
            message,
            source: Box::new(source),
        }
    }
}

/// What a room is about, as handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTopic {
    /// Room title.
    pub title: String,
    /// Free-form description; may be empty.
    pub description: String,
}

/// One message of a conversation batch to summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Author of the message.
    pub user_id: String,
    /// Message text.
    pub message: String,
}

/// Capability producing the text a room needs at its transitions.
pub trait DiscussionGenerator: Send + Sync {
    /// Produce an opening question for a room about to start.
    fn initial_question(&self, topic: RoomTopic) -> BoxFuture<'static, GenerationResult<String>>;
    /// Condense a batch of chat messages into a short summary.
    fn summarize_logs(&self, logs: Vec<LogLine>) -> BoxFuture<'static, GenerationResult<String>>;
}

/// Prompt asking for a single opening question.
pub fn opening_question_prompt(topic: &RoomTopic) -> String {
    format!(
        "Room title: {}\nDescription: {}\nWrite one opening question that fits this room \
         and gets the discussion started. Reply with the question only.",
        topic.title.trim(),
        topic.description.trim()
    )
}

/// Prompt asking for a concise conclusion of a conversation log.
pub fn summary_prompt(logs: &[LogLine]) -> String {
    let mut prompt = String::from(
        "Summarize the following meeting log as a short, clear conclusion. \
         Include key decisions and next actions if there are any.\n\nLog:\n",
    );
    for line in logs {
        let _ = writeln!(prompt, "{}: {}", line.user_id, line.message);
    }
    prompt
}

/// Trim generated text, treating blank output as a failure.
pub(crate) fn non_empty(text: &str) -> GenerationResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_prompt_mentions_title_and_description() {
        let prompt = opening_question_prompt(&RoomTopic {
            title: " Weekly sync ".into(),
            description: "Progress check".into(),
        });
        assert!(prompt.contains("Room title: Weekly sync\n"));
        assert!(prompt.contains("Description: Progress check\n"));
    }

    #[test]
    fn summary_prompt_lists_every_line_in_order() {
        let prompt = summary_prompt(&[
            LogLine {
                user_id: "u1".into(),
                message: "ship on friday".into(),
            },
            LogLine {
                user_id: "u2".into(),
                message: "agreed".into(),
            },
        ]);
        let log = prompt.split("Log:\n").nth(1).unwrap();
        assert_eq!(log, "u1: ship on friday\nu2: agreed\n");
    }

    #[test]
    fn blank_generation_is_rejected() {
        assert!(matches!(non_empty(" \n"), Err(GenerationError::EmptyResponse)));
        assert_eq!(non_empty(" Why? \n").unwrap(), "Why?");
    }
}
