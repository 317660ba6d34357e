// crates/taometer-chain/src/fetcher.rs
//
// Order-preserving batched execution of independent remote lookups.
//
// Tasks run in consecutive chunks of `concurrency_limit`; a chunk runs
// fully concurrently and the next chunk starts only after every task in the
// prior chunk has settled. Failures are isolated per task, never per chunk.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;

use taometer_core::{Fetched, TaometerError};

/// Monotonic progress counter safe to increment from concurrently resolving
/// tasks.
#[derive(Debug)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one completed task and return the new completed count.
    pub fn tick(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Execute `tasks` with at most `concurrency_limit` in flight, preserving
/// input order in the output.
///
/// Each task that fails resolves to `Fetched::Failed` instead of aborting
/// the batch. `on_complete` fires once per settled task, success or failure.
/// A zero limit is normalized to 1. Limits much above 100 mostly add
/// scheduler pressure rather than throughput; choosing a sane limit is the
/// caller's responsibility.
pub async fn fetch_all<T, F, Fut>(
    tasks: Vec<F>,
    concurrency_limit: usize,
    on_complete: impl Fn() + Sync,
) -> Vec<Fetched<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, TaometerError>>,
{
    let limit = concurrency_limit.max(1);
    let mut results = Vec::with_capacity(tasks.len());

    let mut remaining = tasks.into_iter().peekable();
    while remaining.peek().is_some() {
        let chunk: Vec<F> = remaining.by_ref().take(limit).collect();
        let settled = join_all(chunk.into_iter().map(|task| {
            let on_complete = &on_complete;
            async move {
                let result = task().await;
                if let Err(e) = &result {
                    tracing::debug!("lookup failed: {}", e);
                }
                on_complete();
                Fetched::from(result)
            }
        }))
        .await;
        results.extend(settled);
    }

    results
}
