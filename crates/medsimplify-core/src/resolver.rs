//! Concurrent batch resolution of drug-name candidates.
//!
//! Fan-out is bounded because the external registry is rate-sensitive and
//! candidate lists are capped upstream, so unbounded concurrency buys
//! nothing. Each lookup gets an independent timeout; one stalled name
//! cannot hold its siblings hostage.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::TieredCache;
use crate::models::DrugRecord;
use crate::registry::DrugLookup;

/// Most lookups in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// How long one lookup may run before it is abandoned.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(40);

/// Batch resolution errors. Per-name failures never surface here; only a
/// broken lookup worker does.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("lookup worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type BatchResult<T> = Result<T, BatchError>;

/// Outcome of resolving one batch of candidate names.
#[derive(Debug)]
pub struct BatchOutcome {
    /// One record per completed lookup, in completion order.
    pub records: Vec<DrugRecord>,
    /// Normalized names that resolved with high confidence.
    pub confirmed: HashSet<String>,
}

/// Orchestrates bounded concurrent lookups through the tiered cache.
pub struct BatchResolver<L> {
    cache: Arc<TieredCache<L>>,
    max_concurrency: usize,
    lookup_timeout: Duration,
}

impl<L: DrugLookup + 'static> BatchResolver<L> {
    /// Resolver with default bounds.
    pub fn new(cache: Arc<TieredCache<L>>) -> Self {
        Self {
            cache,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Override the concurrency bound (minimum 1).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Override the per-lookup timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Resolve every name in the batch.
    ///
    /// Results arrive in completion order, not input order; callers that
    /// need correlation should match on the record's name field. A lookup
    /// that exceeds its timeout is dropped from the output with a logged
    /// warning; its siblings are unaffected, and the call still waits for
    /// every dispatched lookup before returning.
    pub async fn resolve_batch(&self, names: &[String]) -> BatchResult<BatchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut workers = JoinSet::new();

        for name in names {
            let name = name.clone();
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.lookup_timeout;

            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                match tokio::time::timeout(timeout, cache.get_or_resolve(&name)).await {
                    Ok(record) => Some((name, record)),
                    Err(_) => {
                        tracing::warn!(
                            name = %name,
                            timeout_secs = timeout.as_secs(),
                            "drug lookup timed out"
                        );
                        None
                    }
                }
            });
        }

        let mut records = Vec::new();
        let mut confirmed = HashSet::new();

        while let Some(joined) = workers.join_next().await {
            let Some((name, record)) = joined? else {
                continue;
            };
            if record.is_confident() {
                confirmed.insert(name.trim().to_lowercase());
            }
            records.push(record);
        }

        tracing::info!(
            submitted = names.len(),
            resolved = records.len(),
            confirmed = confirmed.len(),
            "batch resolution complete"
        );

        Ok(BatchOutcome { records, confirmed })
    }
}
