//! Application-level configuration loading: server port, text generator choice, and
//! identifier policies.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::ids::IdPolicy;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ELMO_BACK_CONFIG_PATH";
/// Environment variable that overrides the configured generator backend.
const AI_BACKEND_ENV: &str = "ELMO_AI_BACKEND";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Which text generator backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiBackend {
    /// Google Gemini over REST.
    Gemini,
    /// Fixed answers, for local runs without network access.
    Canned,
}

impl FromStr for AiBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiBackend::Gemini),
            "canned" => Ok(AiBackend::Canned),
            other => Err(format!("unknown AI backend `{other}`")),
        }
    }
}

/// Settings for the text generator.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    /// Which generator implementation to build.
    pub backend: AiBackend,
    /// Model name override; the backend default is used when absent.
    pub model: Option<String>,
    /// Endpoint override; the backend default is used when absent.
    pub base_url: Option<String>,
    /// Sampling temperature override.
    pub temperature: Option<f32>,
    /// Upper bound for the generation step of a room transition.
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            backend: AiBackend::Gemini,
            model: None,
            base_url: None,
            temperature: None,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Text generator settings.
    pub ai: AiSettings,
    /// Length and retry budget of room identifiers.
    pub room_ids: IdPolicy,
    /// Length and retry budget of user identifiers.
    pub user_ids: IdPolicy,
    /// Size of the Postgres connection pool.
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ai: AiSettings::default(),
            room_ids: IdPolicy::ROOM,
            user_ids: IdPolicy::USER,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to
    /// built-in defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env_overrides();
        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent sections keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }

        if let Ok(value) = env::var(AI_BACKEND_ENV) {
            match value.parse() {
                Ok(backend) => self.ai.backend = backend,
                Err(err) => warn!(error = %err, "ignoring {AI_BACKEND_ENV}"),
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    server: RawServer,
    ai: RawAi,
    ids: RawIds,
    database: RawDatabase,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServer {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAi {
    backend: Option<AiBackend>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIds {
    room_length: Option<usize>,
    user_length: Option<usize>,
    max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDatabase {
    max_connections: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let max_attempts = raw.ids.max_attempts.filter(|n| *n > 0);

        Self {
            port: raw.server.port.unwrap_or(defaults.port),
            ai: AiSettings {
                backend: raw.ai.backend.unwrap_or(defaults.ai.backend),
                model: raw.ai.model.filter(|m| !m.trim().is_empty()),
                base_url: raw.ai.base_url.filter(|u| !u.trim().is_empty()),
                temperature: raw.ai.temperature,
                timeout: raw
                    .ai
                    .timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.ai.timeout),
            },
            room_ids: IdPolicy {
                length: raw
                    .ids
                    .room_length
                    .filter(|n| *n > 0)
                    .unwrap_or(IdPolicy::ROOM.length),
                max_attempts: max_attempts.unwrap_or(IdPolicy::ROOM.max_attempts),
            },
            user_ids: IdPolicy {
                length: raw
                    .ids
                    .user_length
                    .filter(|n| *n > 0)
                    .unwrap_or(IdPolicy::USER.length),
                max_attempts: max_attempts.unwrap_or(IdPolicy::USER.max_attempts),
            },
            max_connections: raw
                .database
                .max_connections
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
