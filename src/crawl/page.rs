// src/crawl/page.rs
// =============================================================================
// One article in the crawl.
//
// A Page is created the first time its URL is seen (see registry.rs) and is
// shared as Arc<Page> between the driver and the fetch workers. All of its
// mutable state is write-once:
//
//   outcome  - tokio OnceCell: Unfetched until the single fetch finishes,
//              then Fetched{title, children} or Failed, never changes again
//   route    - OnceLock: the titles from the start page to this page's parent,
//              assigned at first discovery and never overwritten
//   visited  - AtomicBool: flipped once when the driver processes the page
//
// Because nothing is ever rewritten, readers need no lock at all.
// =============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

use super::CrawlContext;
use crate::wiki::{extract_article, placeholder_title, Fetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Unfetched,
    Fetched,
    Failed,
}

enum FetchOutcome {
    Fetched { title: String, children: Vec<Arc<Page>> },
    Failed,
}

pub struct Page {
    url: Url,
    placeholder: String,
    outcome: OnceCell<FetchOutcome>,
    route: OnceLock<Vec<String>>,
    visited: AtomicBool,
}

impl Page {
    // Only the registry creates pages, so there is one per canonical URL
    pub(super) fn new(url: Url) -> Self {
        let placeholder = placeholder_title(&url);
        Self {
            url,
            placeholder,
            outcome: OnceCell::new(),
            route: OnceLock::new(),
            visited: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The real title once fetched, the `?Segment` placeholder otherwise.
    pub fn title(&self) -> &str {
        match self.outcome.get() {
            Some(FetchOutcome::Fetched { title, .. }) => title,
            _ => &self.placeholder,
        }
    }

    /// Outgoing article links; empty before the fetch and after a failure.
    pub fn children(&self) -> &[Arc<Page>] {
        match self.outcome.get() {
            Some(FetchOutcome::Fetched { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn fetch_state(&self) -> FetchState {
        match self.outcome.get() {
            None => FetchState::Unfetched,
            Some(FetchOutcome::Fetched { .. }) => FetchState::Fetched,
            Some(FetchOutcome::Failed) => FetchState::Failed,
        }
    }

    /// Route from the start page to this page's parent, if discovered.
    pub fn route(&self) -> Option<&[String]> {
        self.route.get().map(Vec::as_slice)
    }

    /// Records the discovery route. Returns true only for the first call;
    /// later discoveries are longer (or equal) and are ignored.
    pub fn discover(&self, route: Vec<String>) -> bool {
        self.route.set(route).is_ok()
    }

    pub fn is_visited(&self) -> bool {
        self.visited.load(Ordering::Acquire)
    }

    /// Marks the page visited. Returns false if it already was.
    pub fn mark_visited(&self) -> bool {
        !self.visited.swap(true, Ordering::AcqRel)
    }

    /// Downloads and parses the page, at most once.
    ///
    /// Concurrent callers wait for the same in-flight fetch; later callers
    /// return immediately. Transport and parse errors are logged and leave
    /// the page `Failed` with no children; they never reach the caller.
    pub async fn fetch<F: Fetcher>(&self, ctx: &CrawlContext<F>) -> FetchState {
        self.outcome
            .get_or_init(|| self.load(ctx))
            .await;
        self.fetch_state()
    }

    async fn load<F: Fetcher>(&self, ctx: &CrawlContext<F>) -> FetchOutcome {
        let fetched = ctx.fetcher.fetch(&self.url).await;
        let extracted = match fetched.and_then(|html| extract_article(&html, &self.url)) {
            Ok(extracted) => extracted,
            Err(e) => {
                let kind = if e.is_transport() { "unreachable" } else { "unusable" };
                warn!(url = %self.url, error = %e, "{} page, treating it as a dead end", kind);
                return FetchOutcome::Failed;
            }
        };

        let children: Vec<Arc<Page>> = extracted
            .links
            .into_iter()
            .map(|link| ctx.registry.get_or_create(&link))
            .collect();

        debug!(url = %self.url, title = %extracted.title, children = children.len(), "fetched");

        FetchOutcome::Fetched {
            title: extracted.title,
            children,
        }
    }
}

// Children are printed as a count: the link graph has cycles
impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url.as_str())
            .field("title", &self.title())
            .field("state", &self.fetch_state())
            .field("children", &self.children().len())
            .field("visited", &self.is_visited())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::testing::FakeWiki;
    use crate::crawl::PageRegistry;

    fn context(wiki: FakeWiki) -> CrawlContext<FakeWiki> {
        CrawlContext::new(wiki, PageRegistry::new())
    }

    #[tokio::test]
    async fn test_fetch_fills_title_and_children() {
        let wiki = FakeWiki::new().page("Start", "Start page", &["A", "B", "A"]);
        let ctx = context(wiki);
        let page = ctx.registry.get_or_create(&FakeWiki::url("Start"));

        assert_eq!(page.fetch_state(), FetchState::Unfetched);
        assert_eq!(page.title(), "?Start");
        assert!(page.children().is_empty());

        assert_eq!(page.fetch(&ctx).await, FetchState::Fetched);
        assert_eq!(page.title(), "Start page");

        let children: Vec<&str> = page.children().iter().map(|c| c.title()).collect();
        assert_eq!(children, vec!["?A", "?B", "?A"]);
        // Both "A" links point at the same registry entry
        assert!(Arc::ptr_eq(&page.children()[0], &page.children()[2]));
    }

    #[tokio::test]
    async fn test_idempotent_fetch() {
        let wiki = FakeWiki::new().page("Start", "Start", &["A"]);
        let ctx = context(wiki);
        let page = ctx.registry.get_or_create(&FakeWiki::url("Start"));

        page.fetch(&ctx).await;
        let first_children = page.children().len();
        assert_eq!(page.fetch(&ctx).await, FetchState::Fetched);

        assert_eq!(ctx.fetcher.fetch_count("Start"), 1);
        assert_eq!(page.children().len(), first_children);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fetch_hits_network_once() {
        let wiki = FakeWiki::new()
            .page("Start", "Start", &["A"])
            .delay("Start", 30);
        let ctx = Arc::new(context(wiki));
        let page = ctx.registry.get_or_create(&FakeWiki::url("Start"));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                let page = Arc::clone(&page);
                tokio::spawn(async move { page.fetch(&ctx).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), FetchState::Fetched);
        }

        assert_eq!(ctx.fetcher.fetch_count("Start"), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let wiki = FakeWiki::new().page("Start", "Start", &["A"]).failing("Start");
        let ctx = context(wiki);
        let page = ctx.registry.get_or_create(&FakeWiki::url("Start"));

        assert_eq!(page.fetch(&ctx).await, FetchState::Failed);
        assert!(page.children().is_empty());
        assert_eq!(page.title(), "?Start");

        // Failed is final: no retry
        assert_eq!(page.fetch(&ctx).await, FetchState::Failed);
        assert_eq!(ctx.fetcher.fetch_count("Start"), 1);
    }

    #[tokio::test]
    async fn test_malformed_page_is_failed() {
        let wiki = FakeWiki::new().raw("Broken", "<p>no heading here</p>");
        let ctx = context(wiki);
        let page = ctx.registry.get_or_create(&FakeWiki::url("Broken"));

        assert_eq!(page.fetch(&ctx).await, FetchState::Failed);
        assert!(page.children().is_empty());
    }

    #[test]
    fn test_route_is_assigned_once() {
        let registry = PageRegistry::new();
        let page = registry.get_or_create(&FakeWiki::url("A"));

        assert_eq!(page.route(), None);
        assert!(page.discover(vec!["Start".to_string()]));
        assert!(!page.discover(vec!["Start".to_string(), "Other".to_string()]));
        assert_eq!(page.route(), Some(&["Start".to_string()][..]));
    }

    #[test]
    fn test_mark_visited_once() {
        let registry = PageRegistry::new();
        let page = registry.get_or_create(&FakeWiki::url("A"));

        assert!(!page.is_visited());
        assert!(page.mark_visited());
        assert!(!page.mark_visited());
        assert!(page.is_visited());
    }
}
