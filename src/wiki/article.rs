// src/wiki/article.rs
// =============================================================================
// Helpers for turning article titles into URLs and back.
//
// - article_url: "Rust (programming language)" -> .../wiki/Rust_(programming_language)
// - canonical_url: drops the #fragment so every anchor of a page maps to one key
// - placeholder_title: "?Rust_(programming_language)" until the page is fetched
// =============================================================================

use url::Url;

use crate::error::CrawlError;

// Base URL of a locale's article namespace, e.g. "https://de.wikipedia.org/wiki/"
pub fn wiki_base(cc: &str) -> Result<Url, CrawlError> {
    Ok(Url::parse(&format!("https://{}.wikipedia.org/wiki/", cc))?)
}

// Builds the URL of an article from its human-readable title
//
// Spaces become underscores (the site's word separator). Every part between
// slashes is pushed as its own path segment, which percent-encodes characters
// like '?', '#' and non-ASCII letters while keeping titles such as "AC/DC"
// readable.
//
// Example:
//   base  = "https://en.wikipedia.org/wiki/"
//   title = "Zürich Hbf"
//   result = "https://en.wikipedia.org/wiki/Z%C3%BCrich_Hbf"
pub fn article_url(base: &Url, title: &str) -> Result<Url, CrawlError> {
    let name = title.trim().replace(' ', "_");
    if name.is_empty() {
        return Err(CrawlError::InvalidArticle(title.to_string()));
    }

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| CrawlError::InvalidArticle(title.to_string()))?
        .pop_if_empty()
        .extend(name.split('/'));

    Ok(url)
}

// Strips the fragment; the result is the identity key of a Page
pub fn canonical_url(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical
}

// Provisional title used before a page has been fetched
//
// The leading '?' marks it as a guess in progress output.
pub fn placeholder_title(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");
    format!("?{}", last)
}
