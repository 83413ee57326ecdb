// src/crawl/testing.rs
// =============================================================================
// An in-memory encyclopedia for tests.
//
// Pages are addressed by slug ("Foo" lives at https://en.wikipedia.org/wiki/Foo)
// and rendered as minimal Wikipedia-shaped HTML. Individual pages can be made
// to fail or to answer slowly, and the fake records how often each page was
// fetched, the order in which fetches finished, and the peak number of
// fetches running at the same time.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::error::CrawlError;
use crate::wiki::Fetcher;

#[derive(Default)]
pub struct FakeWiki {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delays: HashMap<String, u64>,
    fetches: Mutex<HashMap<String, usize>>,
    completed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(slug: &str) -> Url {
        Url::parse("https://en.wikipedia.org/wiki/")
            .and_then(|base| base.join(slug))
            .unwrap()
    }

    // A well-formed article titled `title` linking to `links` (slugs)
    pub fn page(mut self, slug: &str, title: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|link| format!(r#"<a href="/wiki/{}">{}</a>"#, link, link))
            .collect();
        let html = format!(
            r#"<html><body><h1 id="firstHeading">{}</h1><div id="mw-content-text">{}</div></body></html>"#,
            title, anchors
        );
        self.pages.insert(slug.to_string(), html);
        self
    }

    pub fn raw(mut self, slug: &str, html: &str) -> Self {
        self.pages.insert(slug.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, slug: &str) -> Self {
        self.failing.insert(slug.to_string());
        self
    }

    pub fn delay(mut self, slug: &str, millis: u64) -> Self {
        self.delays.insert(slug.to_string(), millis);
        self
    }

    pub fn fetch_count(&self, slug: &str) -> usize {
        self.fetches.lock().unwrap().get(slug).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn slug(url: &Url) -> String {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string()
    }
}

impl Fetcher for FakeWiki {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let slug = Self::slug(url);
        *self.fetches.lock().unwrap().entry(slug.clone()).or_default() += 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(millis) = self.delays.get(&slug) {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(slug.clone());

        if self.failing.contains(&slug) {
            return Err(CrawlError::Transport {
                url: url.to_string(),
                message: "connection reset by peer".to_string(),
            });
        }

        self.pages
            .get(&slug)
            .cloned()
            .ok_or_else(|| CrawlError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}
