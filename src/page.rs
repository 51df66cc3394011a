//! Fetching a page and reducing it to its visible text.
//!
//! Pages are fetched as static HTML; scripts are not executed. The text is the
//! concatenation of every text node under `<body>`, minus the contents of
//! `script`, `style`, `noscript` and `template` elements.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{Html, Node, Selector};

/// Elements whose text never reaches the document.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// User agent sent with page requests.
const USER_AGENT: &str = concat!("pagesift/", env!("CARGO_PKG_VERSION"));

/// Errors surfaced while fetching a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The request could not be sent or the body could not be read.
    #[error("failed to fetch page: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

/// Blocking page downloader.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Request`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, PageError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Download the raw HTML at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Request`] on transport failures and
    /// [`PageError::Status`] on non-success responses.
    pub fn fetch(&self, url: &str) -> Result<String, PageError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        let html = resp.text()?;
        tracing::info!(url, bytes = html.len(), "fetched page");
        Ok(html)
    }

    /// Download `url` and reduce it to visible text.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub fn fetch_text(&self, url: &str) -> Result<String, PageError> {
        let html = self.fetch(url)?;
        Ok(extract_text(&html))
    }
}

/// The visible text of an HTML document.
///
/// ```rust
/// let html = "<html><head><title>t</title></head>\
///             <body><p>Hello <b>world</b></p><script>var x;</script></body></html>";
/// assert_eq!(pagesift::page::extract_text(html), "Hello world");
/// ```
#[must_use]
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_and_style() {
        let html = r"<html><head><style>h1 { color: red }</style></head>
            <body><h1>Title</h1><style>.x{}</style><p>Body</p>
            <script>console.log('hidden')</script></body></html>";
        let text = extract_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Body"));
        assert!(!text.contains("color"));
        assert!(!text.contains("console"));
    }

    #[test]
    fn test_head_text_excluded() {
        let html = "<html><head><title>Tab title</title></head><body>content</body></html>";
        assert_eq!(extract_text(html), "content");
    }

    #[test]
    fn test_nested_text_in_order() {
        let html = "<body><ul><li>one</li><li>two <em>and</em> three</li></ul></body>";
        assert_eq!(extract_text(html), "onetwo and three");
    }

    #[test]
    fn test_fragment_without_body() {
        assert_eq!(extract_text("just <i>text</i>"), "just text");
    }

    #[test]
    fn test_unreachable_host_is_request_error() {
        let fetcher = PageFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").unwrap_err();
        assert!(matches!(err, PageError::Request(_)));
    }
}
