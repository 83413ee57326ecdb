// src/wiki/http.rs
// =============================================================================
// This module downloads article pages.
//
// The crawl engine never talks to reqwest directly. It only needs one
// capability: "give me the HTML behind this URL, or tell me why you can't".
// That capability is the `Fetcher` trait. The real implementation wraps a
// reqwest Client; the tests plug in an in-memory wiki instead.
//
// Rust concepts:
// - Traits: a shared interface that several types can implement
// - impl Future in traits: lets the trait describe an async method
// - Send + Sync + 'static: the fetcher is shared by tasks on many threads
// =============================================================================

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::CrawlError;

// Anything that can download a page
pub trait Fetcher: Send + Sync + 'static {
    /// Downloads the page at `url` and returns its body.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, CrawlError>> + Send;
}

// Settings for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!(
                "{}/{} (shortest link path finder)",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

// Fetcher backed by a reqwest Client
//
// Client is cheap to clone (it's an Arc internally) and pools connections,
// so one HttpFetcher is shared by every fetch task of a run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CrawlError::Transport {
                url: String::new(),
                message: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| transport_error(url, e))
    }
}

// Converts a reqwest error into a short, human-readable transport error
fn transport_error(url: &Url, error: reqwest::Error) -> CrawlError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    CrawlError::Transport {
        url: url.to_string(),
        message,
    }
}
