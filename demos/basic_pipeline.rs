//! Basic Pipeline
//!
//! The minimal run: split a document, send each chunk to a model, print the
//! stitched answer. The "model" here just reports the first word of each chunk,
//! so no API key is needed.
//!
//! ```bash
//! cargo run --example basic_pipeline
//! ```

use pagesift::model::{Model, ModelError, Response};
use pagesift::{Pipeline, PipelineConfig};

struct FirstWord;

impl Model for FirstWord {
    fn generate(&self, _instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        let word = chunk.split_whitespace().next().unwrap_or_default();
        Ok(Response::from_text(format!("chunk starts with {word:?}")))
    }
}

fn main() -> Result<(), pagesift::Error> {
    let document = "Machine learning models learn patterns from data. \
        They generalize these patterns to make predictions. \
        This is fundamentally different from traditional programming. \
        Deep learning extends this with multiple hidden layers. \
        Each layer learns increasingly abstract representations.";

    let config = PipelineConfig::default()
        .with_chunk_length(64)
        .with_max_chunks(3)
        .with_line_width(40);
    let pipeline = Pipeline::new(FirstWord, config)?.with_progress(|progress| println!("{progress}"));

    let extraction = pipeline.run(document, "What does each chunk start with?")?;

    println!("Document: {} bytes", document.len());
    println!(
        "Chunks: {} total, {} processed, {} dropped\n",
        extraction.chunks_total,
        extraction.chunks_processed,
        extraction.chunks_dropped()
    );
    print!("{}", extraction.formatted);

    Ok(())
}
