//! Generator returning fixed text, for tests and offline runs.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::time::sleep;

use super::{DiscussionGenerator, GenerationError, GenerationResult, LogLine, RoomTopic};

const DEFAULT_QUESTION: &str = "What would make this discussion worth everyone's time?";
const DEFAULT_SUMMARY: &str = "The group shared their views and agreed on next steps.";

/// Canned [`DiscussionGenerator`]. Clones share the call counter.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    question: Arc<str>,
    summary: Arc<str>,
    failure: Option<Arc<str>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self {
            question: Arc::from(DEFAULT_QUESTION),
            summary: Arc::from(DEFAULT_SUMMARY),
            failure: None,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CannedGenerator {
    /// Generator answering with the built-in question and summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every opening-question request with `question`.
    pub fn with_question(mut self, question: impl AsRef<str>) -> Self {
        self.question = Arc::from(question.as_ref());
        self
    }

    /// Answer every summary request with `summary`.
    pub fn with_summary(mut self, summary: impl AsRef<str>) -> Self {
        self.summary = Arc::from(summary.as_ref());
        self
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: impl AsRef<str>) -> Self {
        self.failure = Some(Arc::from(message.as_ref()));
        self
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of generation calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, text: Arc<str>) -> BoxFuture<'static, GenerationResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.failure.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            match failure {
                Some(message) => Err(GenerationError::Failed(message.to_string())),
                None => Ok(text.to_string()),
            }
        })
    }
}

impl DiscussionGenerator for CannedGenerator {
    fn initial_question(&self, _topic: RoomTopic) -> BoxFuture<'static, GenerationResult<String>> {
        self.respond(self.question.clone())
    }

    fn summarize_logs(&self, _logs: Vec<LogLine>) -> BoxFuture<'static, GenerationResult<String>> {
        self.respond(self.summary.clone())
    }
}
