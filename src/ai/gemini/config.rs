use std::{fmt, sync::Arc, time::Duration};

use super::error::{GeminiError, GeminiResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Runtime configuration describing how to reach the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: Arc<str>,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API root without a trailing slash.
    pub base_url: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Per-request timeout of the HTTP client.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Construct a configuration with the default model and endpoint.
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self {
            api_key: Arc::from(api_key.as_ref()),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            temperature: 1.0,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API root, mostly for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration by reading `GOOGLE_API_KEY`.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingEnvVar {
                var: "GOOGLE_API_KEY",
            })?;
        Ok(Self::new(api_key))
    }

    pub(super) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}
