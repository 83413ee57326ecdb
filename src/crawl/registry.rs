// src/crawl/registry.rs
// =============================================================================
// The page registry: canonical URL -> the one Page for that URL.
//
// Fetch workers insert pages while resolving the links of the page they just
// downloaded, and the driver looks pages up at the same time. The
// check-then-insert happens under a single lock, so two racing lookups of the
// same URL always get the same Arc<Page>.
//
// Pages are never evicted. A registry lives for exactly one crawl and is
// handed to every component that needs it (it is not a global).
// =============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use super::Page;
use crate::wiki::canonical_url;

#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Arc<Mutex<HashMap<Url, Arc<Page>>>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns the page for `url`, creating an unfetched one on first sight
    //
    // The URL is canonicalized first, so "/wiki/Foo#History" and "/wiki/Foo"
    // share one page.
    pub fn get_or_create(&self, url: &Url) -> Arc<Page> {
        let key = canonical_url(url);
        let mut pages = self.lock();
        Arc::clone(
            pages
                .entry(key)
                .or_insert_with_key(|key| Arc::new(Page::new(key.clone()))),
        )
    }

    #[cfg(test)]
    pub fn get(&self, url: &Url) -> Option<Arc<Page>> {
        self.lock().get(&canonical_url(url)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock can't leave the map half-written
    // (entry().or_insert is a single step), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Url, Arc<Page>>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://en.wikipedia.org{}", path)).unwrap()
    }

    #[test]
    fn test_same_url_same_page() {
        let registry = PageRegistry::new();
        let a = registry.get_or_create(&url("/wiki/Foo"));
        let b = registry.get_or_create(&url("/wiki/Foo"));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_fragment_is_ignored() {
        let registry = PageRegistry::new();
        let a = registry.get_or_create(&url("/wiki/Foo"));
        let b = registry.get_or_create(&url("/wiki/Foo#History"));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.url().as_str(), "https://en.wikipedia.org/wiki/Foo");
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = PageRegistry::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.get(&url("/wiki/Foo")).is_none());
        assert_eq!(registry.len(), 0);

        let created = registry.get_or_create(&url("/wiki/Foo"));
        let found = registry.get(&url("/wiki/Foo")).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[test]
    fn test_new_page_is_unfetched_placeholder() {
        let registry = PageRegistry::new();
        let page = registry.get_or_create(&url("/wiki/Albert_Einstein"));

        assert_eq!(page.title(), "?Albert_Einstein");
        assert_eq!(page.fetch_state(), crate::crawl::FetchState::Unfetched);
        assert!(page.route().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_get_or_create_yields_one_page() {
        let registry = PageRegistry::new();

        let tasks = (0..64).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.get_or_create(&url("/wiki/Contended")) })
        });
        let pages: Vec<Arc<Page>> = join_all(tasks)
            .await
            .into_iter()
            .map(|result| result.unwrap())
            .collect();

        let first = &pages[0];
        assert!(pages.iter().all(|page| Arc::ptr_eq(first, page)));
        assert_eq!(registry.len(), 1);
    }
}
