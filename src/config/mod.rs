//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::game::{InputMethod, Role};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the simulation service (no trailing slash)
    pub api_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// File the tracing subscriber writes to
    pub log_file: PathBuf,
    pub log_format: LogFormat,

    /// Name used to pre-seed session storage
    pub player_name: Option<String>,
    /// Input method selected at startup
    pub input_method: InputMethod,
    /// Role the human plays at startup
    pub human_role: Role,

    /// When set, every applied state is rendered by the server and written here
    pub render_output: Option<PathBuf>,
    /// Per-request timeout; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("API_URL"))?;
        let api_url = normalize_base_url(&api_url)?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let input_method = match lookup("INPUT_METHOD") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "INPUT_METHOD",
                value: v,
            })?,
            None => InputMethod::default(),
        };

        let human_role = match lookup("HUMAN_ROLE") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "HUMAN_ROLE",
                value: v,
            })?,
            None => Role::default(),
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_MS") {
            Some(v) => {
                let ms: u64 = v.parse().map_err(|_| ConfigError::Invalid {
                    key: "REQUEST_TIMEOUT_MS",
                    value: v.clone(),
                })?;
                Some(Duration::from_millis(ms))
            }
            None => None,
        };

        Ok(Self {
            api_url,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("prey_predator_client.log")),
            log_format,
            player_name: lookup("PLAYER_NAME").filter(|v| !v.trim().is_empty()),
            input_method,
            human_role,
            render_output: lookup("RENDER_OUTPUT").map(PathBuf::from),
            request_timeout,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("API_URL must be an http(s) URL, got {0}")]
    InvalidUrl(String),
}
