//! Blocking client for the Gemini `generateContent` API.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ModelConfig, API_KEY_VAR};
use crate::error::ConfigError;
use crate::model::{Candidate, Content, Model, ModelError, Part, Response};

/// A [`Model`] backed by Google's Gemini API.
///
/// Construction checks the credential before anything touches the network:
///
/// ```rust
/// use pagesift::{Error, GeminiClient, ModelConfig};
///
/// let err = GeminiClient::new(&ModelConfig::default()).unwrap_err();
/// assert!(matches!(err, Error::Configuration(_)));
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) when the
    /// API key is missing or unusable, or the HTTP client cannot be built.
    pub fn new(config: &ModelConfig) -> crate::Result<Self> {
        let api_key = config.credential()?;
        let mut key = HeaderValue::from_str(api_key).map_err(|_| ConfigError::InvalidValue {
            var: API_KEY_VAR,
            value: "<redacted>".to_owned(),
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ConfigError::Client {
                reason: err.to_string(),
            })?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
        })
    }

    /// The model identifier requests are sent to.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// The full request URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Model for GeminiClient {
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        tracing::debug!(
            model = %self.model,
            chunk_len = chunk.len(),
            "sending generateContent request"
        );

        let body = GenerateRequest::new(instruction, chunk);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(classify_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            tracing::warn!(status = status.as_u16(), "generateContent request failed");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().map_err(classify_transport)?;
        parse_response(&text)
    }
}

fn classify_transport(err: reqwest::Error) -> ModelError {
    if err.is_timeout() || err.is_connect() {
        ModelError::transient(err)
    } else {
        ModelError::transport(err)
    }
}

/// Decode a `generateContent` response body.
fn parse_response(body: &str) -> Result<Response, ModelError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|err| ModelError::Decode(err.to_string()))?;
    Ok(parsed.into())
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

impl<'a> GenerateRequest<'a> {
    fn new(instruction: &'a str, chunk: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: instruction }, RequestPart { text: chunk }],
            }],
        }
    }
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Map<String, Value>>,
}

impl From<GenerateResponse> for Response {
    fn from(wire: GenerateResponse) -> Self {
        let candidates = wire
            .candidates
            .into_iter()
            .map(|candidate| Candidate {
                content: candidate.content.map(|content| Content {
                    parts: content.parts.into_iter().map(part_from_wire).collect(),
                }),
            })
            .collect();
        Self { candidates }
    }
}

fn part_from_wire(mut part: Map<String, Value>) -> Part {
    match part.remove("text") {
        Some(Value::String(text)) => Part::Text(text),
        _ => Part::Other(
            part.keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "unknown".to_owned()),
        ),
    }
}
