//! # pagesift
//!
//! Ask a language model to pull something out of a web page that is too big to
//! send in one request.
//!
//! ## The Problem
//!
//! A cleaned page can run to hundreds of kilobytes. The model takes a bounded
//! prompt, every call costs time and money, and the answer for the page has to
//! read as one piece. So the text is cut into model-sized chunks, a capped
//! number of them are sent one after another with the same instruction, and the
//! answers are stitched back together in page order.
//!
//! ## The Pipeline
//!
//! ```text
//! document ──split──> [c1, c2, ..., c17]          FixedChunker (6000 bytes)
//!          ──select─> [c1, ..., c16]              ChunkBudget  (16 chunks)
//!          ──invoke─> ["r1", ..., "r16"]          ModelInvoker (one call each, in order)
//!          ──join───> "r1\nr2\n...\nr16"          aggregate
//!          ──wrap───> "r1\nr2\n...\n"             wrap         (80 columns)
//! ```
//!
//! Every stage is a pure function of its input except the invoker, which talks
//! to a [`Model`]. The stages never log; progress is reported through an
//! optional callback and failures come back as [`Error`] values.
//!
//! ### Chunking
//!
//! Fixed-length byte slices, no overlap, never splitting a UTF-8 character.
//! Concatenating the chunks gives back the document exactly.
//!
//! ### Budget
//!
//! Only the first `max_chunks` chunks are sent. The rest are dropped without
//! error; [`Extraction::chunks_dropped`] says how many.
//!
//! ### Invocation
//!
//! Strictly sequential. The first failing chunk aborts the run with
//! [`Error::ChunkInvocation`] carrying its one-based index, and no partial
//! answer is returned. A response with no text counts as an empty answer.
//! Retries are opt-in, by wrapping the model in [`Retrying`].
//!
//! ### Formatting
//!
//! Greedy fixed-width wrapping in grapheme clusters; every line ends in `\n`.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagesift::model::{Model, ModelError, Response};
//! use pagesift::{Pipeline, PipelineConfig};
//!
//! struct Shout;
//!
//! impl Model for Shout {
//!     fn generate(&self, _instruction: &str, chunk: &str) -> Result<Response, ModelError> {
//!         Ok(Response::from_text(chunk.to_uppercase()))
//!     }
//! }
//!
//! let config = PipelineConfig::default().with_chunk_length(5);
//! let pipeline = Pipeline::new(Shout, config).unwrap();
//! let extraction = pipeline.run("hello world", "shout it").unwrap();
//!
//! assert_eq!(extraction.text, "HELLO\n WORL\nD");
//! ```
//!
//! ## Talking to Gemini (requires `gemini` feature)
//!
//! ```rust,no_run
//! use pagesift::{GeminiClient, ModelConfig, Pipeline, PipelineConfig};
//!
//! let client = GeminiClient::new(&ModelConfig::from_env()?)?;
//! let pipeline = Pipeline::new(client, PipelineConfig::default())?;
//! let extraction = pipeline.run("<page text>", "List every product and its price")?;
//! print!("{}", extraction.formatted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! | Feature | Adds |
//! |---------|------|
//! | `gemini` | [`GeminiClient`], a blocking `generateContent` client |
//! | `page` | [`page`], static page fetching and text extraction |
//! | `cli` (default) | the `pagesift` interactive binary |

mod aggregate;
mod budget;
mod chunk;
mod chunker;
mod config;
mod error;
mod invoker;
pub mod model;
mod pipeline;
mod retry;
mod wrap;

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "page")]
pub mod page;

pub use aggregate::aggregate;
pub use budget::{ChunkBudget, DEFAULT_MAX_CHUNKS};
pub use chunk::Chunk;
pub use chunker::{split, FixedChunker, DEFAULT_CHUNK_LENGTH};
pub use config::{
    ModelConfig, PipelineConfig, API_KEY_VAR, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT, MODEL_VAR, TIMEOUT_VAR,
};
pub use error::{ConfigError, Error, Result};
pub use invoker::{CancelToken, ModelInvoker, Progress};
pub use model::{Model, ModelError, Response};
pub use pipeline::{Extraction, Pipeline};
pub use retry::{RetryPolicy, Retrying};
pub use wrap::{wrap, DEFAULT_LINE_WIDTH};

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
