//! The full run: split, select, invoke, aggregate, wrap.

use crate::invoker::{CancelToken, ModelInvoker, Progress};
use crate::model::Model;
use crate::{aggregate, wrap, ChunkBudget, Error, FixedChunker, PipelineConfig, Result};

/// The outcome of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Per-chunk answers joined in chunk order.
    pub text: String,
    /// `text` wrapped for display.
    pub formatted: String,
    /// Number of chunks the document split into.
    pub chunks_total: usize,
    /// Number of chunks sent to the model.
    pub chunks_processed: usize,
}

impl Extraction {
    /// Chunks cut by the budget.
    #[must_use]
    pub fn chunks_dropped(&self) -> usize {
        self.chunks_total - self.chunks_processed
    }
}

/// A configured extraction pipeline around a [`Model`].
///
/// ```rust
/// use pagesift::model::{Model, ModelError, Response};
/// use pagesift::{Pipeline, PipelineConfig};
///
/// struct Length;
///
/// impl Model for Length {
///     fn generate(&self, _: &str, chunk: &str) -> Result<Response, ModelError> {
///         Ok(Response::from_text(chunk.len().to_string()))
///     }
/// }
///
/// let config = PipelineConfig::default().with_chunk_length(4);
/// let pipeline = Pipeline::new(Length, config).unwrap();
/// let extraction = pipeline.run("abcdefghij", "count").unwrap();
///
/// assert_eq!(extraction.text, "4\n4\n2");
/// assert_eq!(extraction.chunks_total, 3);
/// ```
pub struct Pipeline<M> {
    chunker: FixedChunker,
    budget: ChunkBudget,
    line_width: usize,
    invoker: ModelInvoker<M>,
}

impl<M: Model> Pipeline<M> {
    /// Build a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkLength`](crate::Error::InvalidChunkLength)
    /// or [`Error::InvalidLineWidth`](crate::Error::InvalidLineWidth) for zero
    /// settings.
    pub fn new(model: M, config: PipelineConfig) -> Result<Self> {
        let chunker = FixedChunker::new(config.chunk_length)?;
        if config.line_width == 0 {
            return Err(Error::InvalidLineWidth(0));
        }
        Ok(Self {
            chunker,
            budget: ChunkBudget::new(config.max_chunks),
            line_width: config.line_width,
            invoker: ModelInvoker::new(model),
        })
    }

    /// Call `observer` before each chunk is sent.
    #[must_use]
    pub fn with_progress(mut self, observer: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.invoker = self.invoker.with_progress(observer);
        self
    }

    /// Stop between chunks once `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.invoker = self.invoker.with_cancel(token);
        self
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        self.invoker.model()
    }

    /// Extract from `document` according to `instruction`.
    ///
    /// # Errors
    ///
    /// Propagates [`ModelInvoker::invoke_all`] failures. No partial result is
    /// returned.
    pub fn run(&self, document: &str, instruction: &str) -> Result<Extraction> {
        let chunks = self.chunker.chunk(document);
        let batch = self.budget.select(&chunks);
        let results = self.invoker.invoke_all(batch, instruction)?;
        let text = aggregate(&results);
        let formatted = wrap(&text, self.line_width)?;

        Ok(Extraction {
            text,
            formatted,
            chunks_total: chunks.len(),
            chunks_processed: batch.len(),
        })
    }
}

impl<M> std::fmt::Debug for Pipeline<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("chunker", &self.chunker)
            .field("budget", &self.budget)
            .field("line_width", &self.line_width)
            .field("invoker", &self.invoker)
            .finish()
    }
}
