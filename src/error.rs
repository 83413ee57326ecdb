// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Two kinds of failure happen while crawling a single page:
// - Transport: the network request failed or the server answered non-2xx
// - MalformedDocument: the HTML came back but has no heading/content region
//
// Neither of these stops the crawl. The page is marked Failed and becomes a
// dead end (see crawl/page.rs). The remaining variants are real errors that
// end the run with exit code 2.
//
// Rust concepts:
// - thiserror: derive Display + std::error::Error for an enum
// - #[from]: lets the ? operator convert other error types into ours
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The request itself failed (DNS, connection reset, timeout, ...)
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered, but not with a 2xx status
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The page has no usable heading or content region
    #[error("malformed document at {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("cannot build an article URL for '{0}'")]
    InvalidArticle(String),

    /// A fetch task panicked or was cancelled before it handed its page back
    #[error("fetch worker stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("target page {0} could not be fetched")]
    TargetUnavailable(String),
}

impl CrawlError {
    /// True for network-level failures (including bad HTTP status codes)
    pub fn is_transport(&self) -> bool {
        matches!(self, CrawlError::Transport { .. } | CrawlError::HttpStatus { .. })
    }
}
