use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use super::{
    config::GeminiConfig,
    error::{GeminiError, GeminiResult},
    models::{GenerateContentRequest, GenerateContentResponse},
};
use crate::ai::{
    DiscussionGenerator, GenerationResult, LogLine, RoomTopic, non_empty,
    opening_question_prompt, summary_prompt,
};

/// [`DiscussionGenerator`] backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    config: Arc<GeminiConfig>,
}

impl GeminiGenerator {
    /// Build the HTTP client used for every call.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| GeminiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, prompt: String) -> GeminiResult<String> {
        let model = self.config.model.clone();
        let request = GenerateContentRequest::from_prompt(prompt, self.config.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|source| GeminiError::RequestSend {
                model: model.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::RequestStatus { model, status });
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|source| GeminiError::DecodeResponse {
                model: model.clone(),
                source,
            })?;

        let text = payload.first_text().ok_or(GeminiError::EmptyCandidates)?;
        debug!(%model, chars = text.len(), "Gemini generation completed");
        Ok(text.to_owned())
    }
}

impl DiscussionGenerator for GeminiGenerator {
    fn initial_question(&self, topic: RoomTopic) -> BoxFuture<'static, GenerationResult<String>> {
        let generator = self.clone();
        Box::pin(async move {
            let text = generator.generate(opening_question_prompt(&topic)).await?;
            non_empty(&text)
        })
    }

    fn summarize_logs(&self, logs: Vec<LogLine>) -> BoxFuture<'static, GenerationResult<String>> {
        let generator = self.clone();
        Box::pin(async move {
            let text = generator.generate(summary_prompt(&logs)).await?;
            non_empty(&text)
        })
    }
}
