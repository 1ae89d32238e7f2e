//! # Bounded Dispatcher
//!
//! Runs a `WorkItemProcessor` over a list of work items with at most
//! `concurrency` invocations in flight.
//!
//! Each item becomes one spawned tokio task; `buffer_unordered` keeps the
//! number of live tasks at the bound and starts the next pending item as
//! soon as one finishes. Results come out in completion order, not input
//! order.
//!
//! Every item produces exactly one result, even when its task panics or
//! hits the per-item timeout. Dropping a timed-out future drops the child
//! process handle, which kills it (`kill_on_drop`).

use crate::processor::{ProcessingResult, WorkItemProcessor};
use crate::walker::WorkItem;
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Fixed-size worker pool over work items
#[derive(Debug, Clone, Copy)]
pub struct BoundedDispatcher {
    concurrency: usize,
    item_timeout: Option<Duration>,
}

impl BoundedDispatcher {
    /// `concurrency` is clamped to at least 1
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            item_timeout: None,
        }
    }

    /// Turn items that run longer than `timeout` into failed results
    pub fn with_item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every item, yielding results as they complete
    pub fn run<P>(
        &self,
        items: Vec<WorkItem>,
        worker: Arc<P>,
    ) -> impl Stream<Item = ProcessingResult> + Send + 'static
    where
        P: WorkItemProcessor,
    {
        let item_timeout = self.item_timeout;
        debug!(
            "Dispatching {} items on {} workers",
            items.len(),
            self.concurrency
        );

        stream::iter(items)
            .map(move |item| {
                let worker = Arc::clone(&worker);
                async move {
                    let task_item = item.clone();
                    let handle =
                        tokio::spawn(async move { process_one(worker, task_item, item_timeout).await });

                    match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            error!("Worker task for {} failed: {}", item.input_path.display(), e);
                            ProcessingResult::failed(item, format!("worker task failed: {}", e))
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
    }

    /// Process every item and collect the results (completion order)
    pub async fn run_to_completion<P>(&self, items: Vec<WorkItem>, worker: Arc<P>) -> Vec<ProcessingResult>
    where
        P: WorkItemProcessor,
    {
        self.run(items, worker).collect().await
    }
}

async fn process_one<P>(worker: Arc<P>, item: WorkItem, item_timeout: Option<Duration>) -> ProcessingResult
where
    P: WorkItemProcessor,
{
    let Some(limit) = item_timeout else {
        return worker.process(&item).await;
    };

    match tokio::time::timeout(limit, worker.process(&item)).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                "Processing timed out after {:?}: {}",
                limit,
                item.input_path.display()
            );
            ProcessingResult::failed(item, format!("timed out after {:?}", limit))
        }
    }
}
