//! Run and model configuration.
//!
//! Both are plain values handed to the pipeline and the model client at
//! construction; nothing reads the environment behind your back.
//! [`ModelConfig::from_env`] exists for the binary, and
//! [`ModelConfig::from_lookup`] lets callers supply variables from anywhere.

use std::time::Duration;

use crate::budget::DEFAULT_MAX_CHUNKS;
use crate::chunker::DEFAULT_CHUNK_LENGTH;
use crate::error::ConfigError;
use crate::wrap::DEFAULT_LINE_WIDTH;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECS";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for one pipeline run.
///
/// ```rust
/// use pagesift::PipelineConfig;
///
/// let config = PipelineConfig::default().with_max_chunks(4);
/// assert_eq!(config.chunk_length, 6000);
/// assert_eq!(config.max_chunks, 4);
/// assert_eq!(config.line_width, 80);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum chunk length in bytes.
    pub chunk_length: usize,
    /// Maximum number of chunks sent to the model.
    pub max_chunks: usize,
    /// Output line width in graphemes.
    pub line_width: usize,
}

impl PipelineConfig {
    /// Set the chunk length.
    #[must_use]
    pub const fn with_chunk_length(self, chunk_length: usize) -> Self {
        Self {
            chunk_length,
            ..self
        }
    }

    /// Set the chunk budget.
    #[must_use]
    pub const fn with_max_chunks(self, max_chunks: usize) -> Self {
        Self { max_chunks, ..self }
    }

    /// Set the output line width.
    #[must_use]
    pub const fn with_line_width(self, line_width: usize) -> Self {
        Self { line_width, ..self }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_length: DEFAULT_CHUNK_LENGTH,
            max_chunks: DEFAULT_MAX_CHUNKS,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Settings for a remote model client.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// API credential. Required before any request is made.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// API base URL, without a trailing path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ModelConfig {
    /// Default settings with the given key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read settings from the process environment.
    ///
    /// A missing key is not an error here; it is reported by
    /// [`credential`](Self::credential) when a client is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// ```rust
    /// use pagesift::ModelConfig;
    ///
    /// let config = ModelConfig::from_lookup(|name| match name {
    ///     "GEMINI_API_KEY" => Some("secret".to_owned()),
    ///     "GEMINI_MODEL" => Some("gemini-1.5-pro".to_owned()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.credential().unwrap(), "secret");
    /// assert_eq!(config.model, "gemini-1.5-pro");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    var: TIMEOUT_VAR,
                    value: raw,
                })?,
            None => defaults.timeout,
        };

        Ok(Self {
            api_key: lookup(API_KEY_VAR),
            model: lookup(MODEL_VAR).unwrap_or(defaults.model),
            base_url: lookup(BASE_URL_VAR).unwrap_or(defaults.base_url),
            timeout,
        })
    }

    /// The API key, trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if no key is set or it is
    /// blank.
    pub fn credential(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential { var: API_KEY_VAR })
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
