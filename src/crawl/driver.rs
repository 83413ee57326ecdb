// src/crawl/driver.rs
// =============================================================================
// The breadth-first driver.
//
// How it works:
// 1. The target page is fetched up front so we know its real title
// 2. The start page is seeded into the frontier (a queue of FetchHandles)
// 3. Pop the OLDEST handle, wait for its fetch, mark the page visited
// 4. Page itself is the target?          -> done (direct hit)
// 5. One of its children is the target?  -> fetch it to confirm, done (early hit)
// 6. Otherwise every child seen for the first time gets route = route + [title]
//    and is submitted to the pipeline, its handle going to the back of the queue
// 7. Repeat until a hit or the frontier runs dry (no route)
//
// Fetches run ahead of the driver in parallel, but pages are processed in
// submission order, so the first route found is a shortest one.
// =============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use super::pipeline::{FetchHandle, FetchPipeline};
use super::progress::StepRecord;
use super::{CrawlConfig, CrawlContext, FetchState, Page, PageRegistry};
use crate::error::CrawlError;
use crate::wiki::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Running,
    HitFound(Vec<String>),
    Exhausted,
}

// How a crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Titles from start to target, both included.
    Found { route: Vec<String>, steps: usize },
    NoRoute { steps: usize },
}

impl CrawlOutcome {
    pub fn route(&self) -> Option<&[String]> {
        match self {
            CrawlOutcome::Found { route, .. } => Some(route),
            CrawlOutcome::NoRoute { .. } => None,
        }
    }

    pub fn steps(&self) -> usize {
        match self {
            CrawlOutcome::Found { steps, .. } | CrawlOutcome::NoRoute { steps } => *steps,
        }
    }
}

pub struct BfsDriver<F> {
    ctx: Arc<CrawlContext<F>>,
    pipeline: FetchPipeline<F>,
    frontier: VecDeque<FetchHandle>,
    target: Arc<Page>,
    target_title: String,
    steps: usize,
    state: DriverState,
}

impl<F: Fetcher> BfsDriver<F> {
    // `target` should already be fetched; its title at this point is the one
    // every hit is compared against.
    pub fn new(
        ctx: Arc<CrawlContext<F>>,
        config: &CrawlConfig,
        start: Arc<Page>,
        target: Arc<Page>,
    ) -> Self {
        let pipeline = FetchPipeline::new(Arc::clone(&ctx), config.workers);
        debug!(workers = pipeline.workers(), "fetch pipeline ready");

        start.discover(Vec::new());
        let mut frontier = VecDeque::new();
        frontier.push_back(pipeline.submit(start));

        let target_title = target.title().to_string();
        Self {
            ctx,
            pipeline,
            frontier,
            target,
            target_title,
            steps: 0,
            state: DriverState::Running,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Steps until the state leaves `Running`, reporting each processed page.
    pub async fn run<P>(&mut self, mut progress: P) -> Result<CrawlOutcome, CrawlError>
    where
        P: FnMut(&StepRecord),
    {
        while self.state == DriverState::Running {
            if let Some(record) = self.step().await? {
                progress(&record);
            }
        }

        Ok(match &self.state {
            DriverState::HitFound(route) => CrawlOutcome::Found {
                route: route.clone(),
                steps: self.steps,
            },
            _ => CrawlOutcome::NoRoute { steps: self.steps },
        })
    }

    // Processes the page at the head of the frontier
    //
    // Returns a progress record for pages that were expanded; hits, skipped
    // duplicates and the final empty pop produce none.
    pub async fn step(&mut self) -> Result<Option<StepRecord>, CrawlError> {
        let Some(handle) = self.frontier.pop_front() else {
            debug!(steps = self.steps, "frontier exhausted");
            self.state = DriverState::Exhausted;
            return Ok(None);
        };

        let page = self.pipeline.next(handle).await?;
        if !page.mark_visited() {
            return Ok(None);
        }
        self.steps += 1;

        let mut route = page.route().map(<[String]>::to_vec).unwrap_or_default();
        route.push(page.title().to_string());

        if page.title() == self.target_title {
            self.finish(route);
            return Ok(None);
        }

        if let Some(title) = self.confirm_early_hit(&page).await {
            route.push(title);
            self.finish(route);
            return Ok(None);
        }

        let children = page.children();
        let child_titles = children.iter().map(|c| c.title().to_string()).collect();
        let mut new_children = 0;
        for child in children {
            if child.discover(route.clone()) {
                self.frontier.push_back(self.pipeline.submit(Arc::clone(child)));
                new_children += 1;
            }
        }

        Ok(Some(StepRecord {
            step: self.steps,
            frontier: self.frontier.len(),
            new_children,
            total_children: children.len(),
            route,
            child_titles,
        }))
    }

    // Looks for the target among the children before they are queued
    //
    // A candidate is the target page itself or a child already known under the
    // target's title (e.g. a redirect alias). Each candidate is fetched right
    // here, outside the pool, and only a fetched title counts as a hit.
    async fn confirm_early_hit(&self, page: &Page) -> Option<String> {
        for child in page.children() {
            if !Arc::ptr_eq(child, &self.target) && child.title() != self.target_title {
                continue;
            }

            info!(candidate = %child.url(), "possible hit");
            if child.fetch(&self.ctx).await == FetchState::Fetched
                && child.title() == self.target_title
            {
                return Some(child.title().to_string());
            }
        }
        None
    }

    // Outstanding fetches are no longer needed; dropping the handles aborts them
    fn finish(&mut self, route: Vec<String>) {
        debug!(steps = self.steps, abandoned = self.frontier_len(), "route found");
        self.frontier.clear();
        self.state = DriverState::HitFound(route);
    }
}

// Entry point for one crawl run
//
// Owns the context (fetcher + a fresh registry) so nothing outlives the run.
pub struct Crawler<F> {
    ctx: Arc<CrawlContext<F>>,
    config: CrawlConfig,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Self {
        Self {
            ctx: Arc::new(CrawlContext::new(fetcher, PageRegistry::new())),
            config,
        }
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.ctx.registry
    }

    /// Fetches the target to learn its real title, then searches from `start`.
    pub async fn find_route<P>(
        &self,
        start: &Url,
        target: &Url,
        progress: P,
    ) -> Result<CrawlOutcome, CrawlError>
    where
        P: FnMut(&StepRecord),
    {
        let target = self.ctx.registry.get_or_create(target);
        if target.fetch(&self.ctx).await != FetchState::Fetched {
            return Err(CrawlError::TargetUnavailable(target.url().to_string()));
        }
        info!(title = %target.title(), "target resolved");

        let start = self.ctx.registry.get_or_create(start);
        info!(url = %start.url(), workers = self.config.workers, "starting crawl");

        let mut driver = BfsDriver::new(Arc::clone(&self.ctx), &self.config, start, target);
        let outcome = driver.run(progress).await?;
        debug!(state = ?driver.state(), pages = self.ctx.registry.len(), "driver stopped");
        Ok(outcome)
    }
}
