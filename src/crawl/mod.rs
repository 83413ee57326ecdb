// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine: a breadth-first search over article links.
//
// Submodules:
// - page: one article, with write-once fetch result and discovery route
// - registry: the shared URL -> Page map (one Page per URL)
// - pipeline: bounded worker pool, results handed back in submission order
// - driver: the BFS loop (frontier, hit detection, route reconstruction)
// - progress: the per-step status line
//
// Features:
// - Parallel fetching with a configurable number of workers
// - Shortest route guaranteed despite fetches finishing out of order
// - Unreachable or broken pages become dead ends instead of errors
// =============================================================================

mod driver;
mod page;
mod pipeline;
mod progress;
mod registry;

#[cfg(test)]
mod testing;

pub use driver::{CrawlOutcome, Crawler};
pub use page::{FetchState, Page};
pub use progress::{format_route, ProgressReporter, StepRecord};
pub use registry::PageRegistry;

use std::thread;

// What every fetch needs: the way to download pages and the registry that
// turns their links into Pages. Shared by the driver and all workers.
pub struct CrawlContext<F> {
    pub fetcher: F,
    pub registry: PageRegistry,
}

impl<F> CrawlContext<F> {
    pub fn new(fetcher: F, registry: PageRegistry) -> Self {
        Self { fetcher, registry }
    }
}

// Configuration of the crawl engine
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum number of fetches running at the same time.
    pub workers: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

// One worker per available CPU, or 1 if that can't be determined
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
