// src/wiki/links.rs
// =============================================================================
// This module extracts the title and the article links from a Wikipedia page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What counts as an article link:
// - an <a> with an href inside the content region (#mw-content-text)
// - the href starts with "/wiki/"
// - the href contains no ':' (that would be Talk:, Category:, File:, Special:...)
//
// The #fragment is cut off before resolving, so "/wiki/Bar#History" and
// "/wiki/Bar" become the same child. Duplicates are kept: deduplication is
// the page registry's job, not ours.
// =============================================================================

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::CrawlError;

const ARTICLE_PREFIX: &str = "/wiki/";

// The selectors are constants and known to be valid; a parse failure here is
// a programmer error, not a property of the page being parsed.
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#firstHeading").expect("valid heading selector"));
static CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mw-content-text").expect("valid content selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

// What the extractor found on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub links: Vec<Url>,
}

// Extracts the page title and its outgoing article links
//
// Parameters:
//   html: the HTML content of the page
//   base_url: the canonical URL of the page (for resolving relative links)
//
// Returns: ExtractedPage, or MalformedDocument if the heading or the content
// region is missing (or not unique)
pub fn extract_article(html: &str, base_url: &Url) -> Result<ExtractedPage, CrawlError> {
    let document = Html::parse_document(html);

    let heading = single_element(&document, &HEADING, "#firstHeading", base_url)?;
    let title = heading.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        return Err(malformed(base_url, "#firstHeading is empty".to_string()));
    }

    let content = single_element(&document, &CONTENT, "#mw-content-text", base_url)?;

    let links = content
        .select(&ANCHORS)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_article_link(base_url, href))
        .collect();

    Ok(ExtractedPage { title, links })
}

// Exactly one element must match; zero or several makes the page unusable
fn single_element<'a>(
    document: &'a Html,
    selector: &Selector,
    name: &str,
    base_url: &Url,
) -> Result<ElementRef<'a>, CrawlError> {
    let mut matches = document.select(selector);
    match (matches.next(), matches.next()) {
        (Some(element), None) => Ok(element),
        (None, _) => Err(malformed(base_url, format!("{} is missing", name))),
        (Some(_), Some(_)) => Err(malformed(base_url, format!("{} is not unique", name))),
    }
}

// Turns an href into an absolute article URL, or None if it isn't one
//
// Examples (base = "https://en.wikipedia.org/wiki/Page"):
//   "/wiki/Foo"          -> Some("https://en.wikipedia.org/wiki/Foo")
//   "/wiki/Bar#section"  -> Some("https://en.wikipedia.org/wiki/Bar")
//   "/wiki/Talk:Foo"     -> None (namespace)
//   "/other/Foo"         -> None (not an article path)
fn resolve_article_link(base: &Url, href: &str) -> Option<Url> {
    if !href.starts_with(ARTICLE_PREFIX) || href.contains(':') {
        return None;
    }

    let article = href.split('#').next().unwrap_or(href);
    if article.len() == ARTICLE_PREFIX.len() {
        // "/wiki/" or "/wiki/#top" names no article
        return None;
    }

    base.join(article).ok()
}

fn malformed(url: &Url, reason: String) -> CrawlError {
    CrawlError::MalformedDocument {
        url: url.to_string(),
        reason,
    }
}
