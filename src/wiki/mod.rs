// src/wiki/mod.rs
// =============================================================================
// Everything that knows what Wikipedia looks like.
//
// Submodules:
// - article: title <-> URL helpers (base URL per locale, placeholders)
// - links: pulls the title and article links out of a page's HTML
// - http: the Fetcher capability and its reqwest implementation
//
// The crawl engine (src/crawl/) only sees Urls, titles and the Fetcher trait.
// =============================================================================

mod article;
mod http;
mod links;

pub use article::{article_url, canonical_url, placeholder_title, wiki_base};
pub use http::{Fetcher, HttpConfig, HttpFetcher};
pub use links::extract_article;
