//! Error types for pagesift.

use crate::model::ModelError;

/// Errors that can occur while running the extraction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid chunk length (must be > 0).
    #[error("invalid chunk length: {0} (must be > 0)")]
    InvalidChunkLength(usize),

    /// Invalid line width (must be > 0).
    #[error("invalid line width: {0} (must be > 0)")]
    InvalidLineWidth(usize),

    /// The model backend is not usable as configured.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A chunk's model call failed; the rest of the batch was abandoned.
    #[error("failed to generate content for chunk {index}: {source}")]
    ChunkInvocation {
        /// One-based index of the failing chunk.
        index: usize,
        /// The underlying model failure.
        #[source]
        source: ModelError,
    },

    /// The run was cancelled before every chunk was processed.
    #[error("cancelled after {completed} chunk(s)")]
    Cancelled {
        /// Number of chunks that finished before cancellation was observed.
        completed: usize,
    },
}

/// Problems with the model configuration, reported before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No API credential was supplied.
    #[error("{var} not set")]
    MissingCredential {
        /// The environment variable the credential is normally read from.
        var: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    Client {
        /// Why construction failed.
        reason: String,
    },

    /// An environment value could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// The offending variable.
        var: &'static str,
        /// The raw value.
        value: String,
    },
}

/// Result type for pagesift operations.
pub type Result<T> = std::result::Result<T, Error>;
