//! Bounded concurrent fan-out over scrape targets
//!
//! Every target runs as its own tokio task. A semaphore with `max_parallel`
//! permits brackets the fetch+extract body of each task, so no more than
//! `max_parallel` requests are ever in flight. Tasks report their outcome
//! over a channel to a single collector, which owns the result map and the
//! last-error slot; there is no shared mutable state between tasks.

use crate::scrape::fetcher::PageSource;
use crate::scrape::target::Target;
use crate::state::{TaskState, TaskTracker};
use crate::{Result, ScrapeError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Everything one engine run produced
#[derive(Debug)]
pub struct EngineOutcome<V> {
    /// Merged results of the successful tasks
    pub results: HashMap<String, V>,

    /// Error of the last failed task to report, if any failed
    pub last_error: Option<ScrapeError>,

    /// Number of targets launched
    pub attempted: usize,

    /// Number of targets that fetched and extracted successfully
    pub succeeded: usize,
}

impl<V> EngineOutcome<V> {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded == self.attempted
    }

    /// Applies the partial-failure policy for one phase
    ///
    /// * Some results: partial failures are logged and the results returned
    /// * No results and an error recorded: the error is returned
    /// * No results and no error: an empty map is returned
    pub fn into_result(self, phase: &str) -> Result<HashMap<String, V>> {
        if !self.results.is_empty() {
            if let Some(err) = &self.last_error {
                tracing::error!(
                    "{}: processed {}/{} targets, last error: {}",
                    phase,
                    self.succeeded,
                    self.attempted,
                    err
                );
            }
            return Ok(self.results);
        }

        match self.last_error {
            Some(err) => {
                tracing::error!("{}: could not process any target", phase);
                Err(err)
            }
            None => Ok(self.results),
        }
    }
}

/// Runs fetch+extract tasks against a page source with bounded parallelism
pub struct ScrapeEngine<S> {
    source: Arc<S>,
    max_parallel: usize,
}

impl<S: PageSource> ScrapeEngine<S> {
    /// Creates an engine; `max_parallel` below 1 is clamped to 1
    pub fn new(source: Arc<S>, max_parallel: usize) -> Self {
        if max_parallel == 0 {
            tracing::warn!("max_parallel of 0 is not usable, clamping to 1");
        }
        Self {
            source,
            max_parallel: max_parallel.max(1),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Fetches and extracts every target, merging successes with `merge`
    ///
    /// Returns once every task has finished. A failing task records its
    /// error and contributes nothing; the others carry on.
    ///
    /// # Arguments
    ///
    /// * `targets` - Work items, one task each
    /// * `extract` - Turns a page body into a value
    /// * `merge` - Folds one task's value into the result map under its key
    pub async fn run<T, V, F, M>(
        &self,
        targets: Vec<Target>,
        extract: F,
        mut merge: M,
    ) -> EngineOutcome<V>
    where
        T: Send + 'static,
        F: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
        M: FnMut(&mut HashMap<String, V>, String, T),
    {
        let attempted = targets.len();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let extract = Arc::new(extract);
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, Result<T>)>();

        tracing::debug!(
            "Launching {} tasks with at most {} in flight",
            attempted,
            self.max_parallel
        );

        for target in targets {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let extract = Arc::clone(&extract);
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = run_task(source.as_ref(), &semaphore, &target, extract.as_ref()).await;
                // The collector outlives every sender
                let _ = tx.send((target.key().to_string(), outcome));
            });
        }
        // Collector loop ends once the last task drops its sender
        drop(tx);

        let mut results = HashMap::new();
        let mut last_error = None;
        let mut succeeded = 0;

        while let Some((key, outcome)) = rx.recv().await {
            match outcome {
                Ok(value) => {
                    succeeded += 1;
                    merge(&mut results, key, value);
                }
                Err(err) => {
                    tracing::error!("Target {} failed, skipping: {}", key, err);
                    last_error = Some(err);
                }
            }
        }

        tracing::debug!("Finished {}/{} tasks successfully", succeeded, attempted);

        EngineOutcome {
            results,
            last_error,
            attempted,
            succeeded,
        }
    }
}

/// One task: wait for a slot, fetch, extract
///
/// The permit lives exactly as long as the fetch+extract body.
async fn run_task<S, T, F>(
    source: &S,
    semaphore: &Semaphore,
    target: &Target,
    extract: &F,
) -> Result<T>
where
    S: PageSource,
    F: Fn(&[u8]) -> Result<T>,
{
    let mut tracker = TaskTracker::new(target.key());

    let _permit = match semaphore.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            tracker.advance(TaskState::Failed);
            return Err(ScrapeError::GateClosed);
        }
    };
    tracker.advance(TaskState::SlotAcquired);

    tracker.advance(TaskState::Fetching);
    let body = match source.fetch(target.url()).await {
        Ok(body) => body,
        Err(err) => {
            tracker.advance(TaskState::Failed);
            return Err(err);
        }
    };

    tracker.advance(TaskState::Extracting);
    let outcome = extract(&body);
    tracker.advance(if outcome.is_ok() {
        TaskState::Succeeded
    } else {
        TaskState::Failed
    });

    outcome
}

/// Merge that stores each task's value under its own key
pub fn insert_merge<V>(results: &mut HashMap<String, V>, key: String, value: V) {
    results.insert(key, value);
}

/// Merge that counts every item a task produced, ignoring the task key
pub fn count_merge(results: &mut HashMap<String, u32>, _key: String, items: Vec<String>) {
    for item in items {
        *results.entry(item).or_insert(0) += 1;
    }
}
