// src/crawl/pipeline.rs
// =============================================================================
// The fetch pipeline: a bounded pool of fetch workers.
//
// submit(page) starts fetching a page in the background and hands back a
// FetchHandle for *that* submission. next(handle) waits for exactly that
// fetch to finish and returns the page.
//
// Fetches race each other and may finish in any order. The driver keeps its
// handles in a FIFO queue and always calls next() on the oldest one, so the
// order in which pages are *processed* is the order in which they were
// submitted. That is what keeps the search breadth-first.
//
// At most `workers` fetches run at once (tokio Semaphore). Dropping a
// FetchHandle aborts its task, so when the driver stops and drops its
// frontier, every queued or in-flight fetch is cancelled.
// =============================================================================

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{CrawlContext, Page};
use crate::error::CrawlError;
use crate::wiki::Fetcher;

pub struct FetchPipeline<F> {
    ctx: Arc<CrawlContext<F>>,
    permits: Arc<Semaphore>,
    workers: usize,
}

// One submission to the pipeline
//
// Owning the JoinHandle means owning the task: if the handle is dropped
// without being passed to next(), the fetch is aborted.
pub struct FetchHandle {
    page: Arc<Page>,
    task: Option<JoinHandle<Arc<Page>>>,
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<F: Fetcher> FetchPipeline<F> {
    // `workers` is clamped to at least 1 so the pool can always make progress
    pub fn new(ctx: Arc<CrawlContext<F>>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            ctx,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a fetch of `page` and returns immediately.
    pub fn submit(&self, page: Arc<Page>) -> FetchHandle {
        let ctx = Arc::clone(&self.ctx);
        let permits = Arc::clone(&self.permits);
        let worker_page = Arc::clone(&page);

        let task = tokio::spawn(async move {
            // The semaphore is never closed, so acquiring only fails if the
            // pipeline is gone; the page is handed back unfetched in that case.
            if let Ok(_permit) = permits.acquire_owned().await {
                worker_page.fetch(&ctx).await;
            }
            worker_page
        });

        debug!(url = %page.url(), "submitted");
        FetchHandle {
            page,
            task: Some(task),
        }
    }

    /// Waits for this submission's fetch to complete and returns its page.
    ///
    /// Fetch failures are already folded into the page state; the only error
    /// here is a worker task that panicked or was cancelled.
    pub async fn next(&self, mut handle: FetchHandle) -> Result<Arc<Page>, CrawlError> {
        match handle.task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(Arc::clone(&handle.page)),
        }
    }
}
