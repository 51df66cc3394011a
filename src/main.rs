//! Interactive front end: fetch a page, ask what to extract, print the answer.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pagesift::page::PageFetcher;
use pagesift::{
    CancelToken, Extraction, GeminiClient, ModelConfig, Pipeline, PipelineConfig, RetryPolicy,
    Retrying, DEFAULT_BASE_URL, DEFAULT_CHUNK_LENGTH, DEFAULT_LINE_WIDTH, DEFAULT_MAX_CHUNKS,
    DEFAULT_MODEL,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pagesift",
    version,
    about = "Scrape a web page and extract what you ask for with Gemini"
)]
struct Cli {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds, for page fetches and model calls
    #[arg(long, env = "GEMINI_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Maximum chunk length in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_LENGTH)]
    chunk_length: usize,

    /// Maximum number of chunks sent to the model per page
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNKS)]
    max_chunks: usize,

    /// Output line width
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    line_width: usize,

    /// Extra attempts for rate-limited or failed model calls
    #[arg(long, default_value_t = 0)]
    retries: usize,

    /// Page to scrape; with --instruction, runs once and exits
    #[arg(long, requires = "instruction")]
    url: Option<String>,

    /// What to extract from the page
    #[arg(long, requires = "url")]
    instruction: Option<String>,
}

impl Cli {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout(),
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(self.retries.saturating_add(1))
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_chunk_length(self.chunk_length)
            .with_max_chunks(self.max_chunks)
            .with_line_width(self.line_width)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let fetcher = PageFetcher::new(cli.timeout()).context("failed to build page fetcher")?;

    if let (Some(url), Some(instruction)) = (&cli.url, &cli.instruction) {
        let document = fetcher.fetch_text(url)?;
        let extraction = extract(&cli, &document, instruction, CancelToken::new())?;
        print!("{}", extraction.formatted);
        return Ok(());
    }

    let cancel = CancelToken::new();
    let busy = Arc::new(AtomicBool::new(false));
    install_signal_handler(cancel.clone(), Arc::clone(&busy))?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(url) = prompt(
            &mut lines,
            "Enter the website URL you want to scrape (or type 'exit' to quit): ",
        )?
        else {
            break;
        };
        if url.eq_ignore_ascii_case("exit") {
            println!("Exiting application.");
            break;
        }
        if url.is_empty() {
            continue;
        }

        println!("Scraping website, please wait...");
        let document = match fetcher.fetch_text(&url) {
            Ok(document) => document,
            Err(err) => {
                println!("Error scraping website: {err}");
                continue;
            }
        };
        tracing::debug!(url = %url, bytes = document.len(), "page reduced to text");

        let Some(instruction) = prompt(
            &mut lines,
            "Describe what you want to parse from the website: ",
        )?
        else {
            break;
        };

        println!("Processing your request, please wait...");
        cancel.reset();
        busy.store(true, Ordering::SeqCst);
        let outcome = extract(&cli, &document, &instruction, cancel.clone());
        busy.store(false, Ordering::SeqCst);

        match outcome {
            Ok(extraction) => {
                if extraction.chunks_dropped() > 0 {
                    println!(
                        "Note: only the first {} of {} chunks were processed.",
                        extraction.chunks_processed, extraction.chunks_total
                    );
                }
                println!("Parsed Result:\n{}", extraction.formatted);
            }
            Err(err) => println!("Error parsing content: {err:#}"),
        }
    }

    Ok(())
}

/// Build a fresh pipeline for one page and run it.
fn extract(cli: &Cli, document: &str, instruction: &str, cancel: CancelToken) -> Result<Extraction> {
    let client = GeminiClient::new(&cli.model_config())?;
    let model = Retrying::new(client, cli.retry_policy()).with_cancel(cancel.clone());
    let pipeline = Pipeline::new(model, cli.pipeline_config())?
        .with_cancel(cancel)
        .with_progress(|progress| {
            tracing::debug!(index = progress.index, total = progress.total, "dispatching chunk");
            println!("{progress}");
        });
    Ok(pipeline.run(document, instruction)?)
}

/// What a Ctrl-C press should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Cancel,
    Exit,
}

/// First Ctrl-C during a run cancels it; a second press, or one between runs,
/// exits.
fn on_interrupt(cancel: &CancelToken, busy: &AtomicBool) -> Interrupt {
    if busy.load(Ordering::SeqCst) && !cancel.is_cancelled() {
        cancel.cancel();
        Interrupt::Cancel
    } else {
        Interrupt::Exit
    }
}

fn install_signal_handler(cancel: CancelToken, busy: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || match on_interrupt(&cancel, &busy) {
        Interrupt::Cancel => {
            eprintln!("\nCancelling after the current request (press Ctrl-C again to exit)...");
        }
        Interrupt::Exit => {
            println!("\nReceived shutdown signal, exiting...");
            std::process::exit(0);
        }
    })
    .context("failed to install signal handler")
}

/// Print `message` and read one trimmed line; `None` at end of input.
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush().context("failed to flush stdout")?;
    let line = lines.next().transpose().context("failed to read input")?;
    Ok(line.map(|line| line.trim().to_owned()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
