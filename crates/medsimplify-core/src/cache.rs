//! Two-tier drug record cache with write-through persistence.
//!
//! The session tier is an in-memory map alive for the process lifetime. The
//! durable tier is a single JSON file loaded wholesale at construction and
//! rewritten on every new resolution. A name resolved once is never queried
//! against the registry again in the same process; unresolved names are
//! never cached, so they are retried on every later request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;

use crate::models::{DrugRecord, RecordSource};
use crate::registry::{DrugLookup, LookupOutcome};

/// Entry counts for the two cache tiers.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries in the durable tier.
    pub durable_entries: usize,
    /// Entries in the session tier.
    pub session_entries: usize,
}

/// Two-tier cache in front of a [`DrugLookup`].
///
/// The maps are the only process-wide mutable state in the pipeline;
/// mutation happens exclusively inside `get_or_resolve` and `clear`.
pub struct TieredCache<L> {
    lookup: L,
    cache_path: PathBuf,
    session: Mutex<HashMap<String, DrugRecord>>,
    durable: Mutex<HashMap<String, DrugRecord>>,
}

impl<L: DrugLookup> TieredCache<L> {
    /// Build a cache over `lookup`, loading the durable tier at `path`.
    ///
    /// A missing file is an empty cache; an unreadable one is logged and
    /// treated as empty.
    pub fn new(lookup: L, path: impl Into<PathBuf>) -> Self {
        let cache_path = path.into();
        let durable = load_durable(&cache_path);
        if !durable.is_empty() {
            tracing::info!(
                entries = durable.len(),
                path = %cache_path.display(),
                "loaded drug cache"
            );
        }

        Self {
            lookup,
            cache_path,
            session: Mutex::new(HashMap::new()),
            durable: Mutex::new(durable),
        }
    }

    /// Resolve a drug name, consulting the session tier, the durable tier,
    /// then the external lookup, in that order.
    ///
    /// Resolved records are stamped and written through to both tiers.
    /// Unresolved names come back as the not-found placeholder and are not
    /// cached. A persistence failure is logged and swallowed; the record is
    /// still returned and both in-memory tiers keep it.
    pub async fn get_or_resolve(&self, name: &str) -> DrugRecord {
        let key = normalize(name);

        if let Some(record) = lock(&self.session).get(&key).cloned() {
            tracing::debug!(name = %key, "session cache hit");
            return record;
        }

        if let Some(record) = lock(&self.durable).get(&key).cloned() {
            tracing::debug!(name = %key, "durable cache hit");
            lock(&self.session).insert(key, record.clone());
            return record;
        }

        tracing::info!(name = %key, "cache miss; querying registry");
        match self.lookup.resolve(&key).await {
            LookupOutcome::Resolved(mut record) => {
                record.cached_at = Some(Utc::now().to_rfc3339());
                lock(&self.session).insert(key.clone(), record.clone());
                let snapshot = {
                    let mut durable = lock(&self.durable);
                    durable.insert(key, record.clone());
                    serde_json::to_string_pretty(&*durable)
                };
                self.persist(snapshot).await;
                record
            }
            LookupOutcome::NotFound => {
                tracing::info!(name = %key, "drug not found in registry");
                DrugRecord::not_found(&key)
            }
            LookupOutcome::TransientFailure(reason) => {
                tracing::warn!(name = %key, %reason, "registry unavailable; returning not-found");
                DrugRecord::not_found(&key)
            }
        }
    }

    /// Empty both tiers and delete the durable file.
    ///
    /// Administrative action only; the cache never clears itself.
    pub fn clear(&self) {
        lock(&self.session).clear();
        lock(&self.durable).clear();

        match std::fs::remove_file(&self.cache_path) {
            Ok(()) => tracing::info!(path = %self.cache_path.display(), "drug cache cleared"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.cache_path.display(), error = %err, "could not remove cache file");
            }
        }
    }

    /// Current tier sizes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            durable_entries: lock(&self.durable).len(),
            session_entries: lock(&self.session).len(),
        }
    }

    /// Rewrite the durable tier to disk.
    ///
    /// The whole map is rewritten each time. Two lookups for different
    /// names may race on this rewrite; the last writer wins on disk, which
    /// is acceptable because each writer's snapshot contains its own entry
    /// and the in-memory tiers stay authoritative.
    async fn persist(&self, snapshot: Result<String, serde_json::Error>) {
        let json = match snapshot {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "drug cache serialization failed");
                return;
            }
        };

        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = tokio::fs::create_dir_all(parent).await {
                    tracing::warn!(error = %err, "could not create cache directory");
                    return;
                }
            }
        }

        match tokio::fs::write(&self.cache_path, json).await {
            Ok(()) => tracing::debug!(path = %self.cache_path.display(), "drug cache persisted"),
            Err(err) => {
                tracing::warn!(path = %self.cache_path.display(), error = %err, "drug cache write failed");
            }
        }
    }
}

/// Lower-cased, trimmed cache key.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Acquire a tier lock. A poisoned tier still holds valid records, so the
/// guard is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read the durable tier from disk. Records written by a previous run are
/// re-tagged as cache-sourced.
fn load_durable(path: &Path) -> HashMap<String, DrugRecord> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read drug cache");
            return HashMap::new();
        }
    };

    match serde_json::from_str::<HashMap<String, DrugRecord>>(&raw) {
        Ok(mut map) => {
            for record in map.values_mut() {
                if record.source == RecordSource::Registry {
                    record.source = RecordSource::Cache;
                }
            }
            map
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "drug cache unreadable; starting empty");
            HashMap::new()
        }
    }
}
