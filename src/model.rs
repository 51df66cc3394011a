//! The language-model boundary.
//!
//! The pipeline only needs one operation from a model: take an instruction and
//! a chunk, give back a response made of ordered parts. Transport,
//! authentication and model choice belong to the implementation
//! (see `GeminiClient` behind the `gemini` feature).

use std::sync::Arc;

/// A generative model that answers one instruction about one chunk.
///
/// This allows plugging in different backends (Gemini, a local model, a test
/// double).
pub trait Model: Send + Sync {
    /// Run `instruction` against `chunk`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] when the request could not be completed. A
    /// response without any text is not an error.
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError>;
}

impl<M: Model + ?Sized> Model for &M {
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        (**self).generate(instruction, chunk)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        (**self).generate(instruction, chunk)
    }
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        (**self).generate(instruction, chunk)
    }
}

/// A raw model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Candidate answers, in the order the model returned them.
    pub candidates: Vec<Candidate>,
}

/// One candidate answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// The candidate's content, absent when the model withheld it.
    pub content: Option<Content>,
}

/// The parts making up a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// Ordered parts.
    pub parts: Vec<Part>,
}

/// A single piece of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Plain text.
    Text(String),
    /// Anything else (inline data, function calls, ...), named by its kind.
    Other(String),
}

impl Response {
    /// A response holding one candidate with one text part.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part::Text(text.into())],
                }),
            }],
        }
    }

    /// The text parts of every candidate joined with `\n`, in response order.
    ///
    /// Non-text parts are skipped. A response with no candidates or no text
    /// parts gives an empty string.
    ///
    /// ```rust
    /// use pagesift::model::{Candidate, Content, Part, Response};
    ///
    /// let response = Response {
    ///     candidates: vec![Candidate {
    ///         content: Some(Content {
    ///             parts: vec![
    ///                 Part::Text("first".into()),
    ///                 Part::Other("inlineData".into()),
    ///                 Part::Text("second".into()),
    ///             ],
    ///         }),
    ///     }],
    /// };
    /// assert_eq!(response.text(), "first\nsecond");
    /// assert_eq!(Response::default().text(), "");
    /// ```
    #[must_use]
    pub fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::Other(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Failure of a single model call.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The service answered with a non-success status.
    #[error("model returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {source}")]
    Transport {
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Whether repeating the request may succeed.
        retryable: bool,
    },

    /// The response body was not in the expected shape.
    #[error("failed to decode model response: {0}")]
    Decode(String),

    /// The call was abandoned because the run was cancelled.
    #[error("cancelled")]
    Cancelled,
}

impl ModelError {
    /// A transport failure that is not worth retrying.
    pub fn transport(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport {
            source: source.into(),
            retryable: false,
        }
    }

    /// A transport failure that may clear up on its own (timeout, refused
    /// connection).
    pub fn transient(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport {
            source: source.into(),
            retryable: true,
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// True for rate limiting (429), server errors (5xx) and transient
    /// transport failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Transport { retryable, .. } => *retryable,
            Self::Decode(_) | Self::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_candidates_in_order() {
        let response = Response {
            candidates: vec![
                Candidate {
                    content: Some(Content {
                        parts: vec![Part::Text("a".into()), Part::Text("b".into())],
                    }),
                },
                Candidate { content: None },
                Candidate {
                    content: Some(Content {
                        parts: vec![Part::Text("c".into())],
                    }),
                },
            ],
        };
        assert_eq!(response.text(), "a\nb\nc");
    }

    #[test]
    fn test_empty_content_is_empty_text() {
        let response = Response {
            candidates: vec![Candidate {
                content: Some(Content::default()),
            }],
        };
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_retryable_classification() {
        let status = |status| ModelError::Status {
            status,
            body: String::new(),
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(ModelError::transient("timed out").is_retryable());
        assert!(!ModelError::transport("bad url").is_retryable());
        assert!(!ModelError::Decode("eof".into()).is_retryable());
        assert!(!ModelError::Cancelled.is_retryable());
    }

    #[test]
    fn test_forwarding_impls() {
        struct Echo;
        impl Model for Echo {
            fn generate(&self, _: &str, chunk: &str) -> Result<Response, ModelError> {
                Ok(Response::from_text(chunk))
            }
        }

        let boxed: Box<dyn Model> = Box::new(Echo);
        let shared = Arc::new(Echo);
        assert_eq!(boxed.generate("i", "x").unwrap().text(), "x");
        assert_eq!(shared.generate("i", "y").unwrap().text(), "y");
    }
}
