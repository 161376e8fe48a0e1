//! Integration tests for the resolution pipeline: tiered caching, batch
//! orchestration and failure semantics, with stub registries standing in
//! for the network.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use medsimplify_core::models::{Confidence, DrugRecord, RecordSource};
use medsimplify_core::registry::{DrugLookup, LookupOutcome};
use medsimplify_core::{BatchResolver, CacheStats, TieredCache};

/// Stub lookup with canned answers, a call counter, and an optional
/// per-name stall for timeout tests.
struct StubRegistry {
    answers: HashMap<String, DrugRecord>,
    miss_behavior: MissBehavior,
    stall: Option<(String, Duration)>,
    calls: AtomicUsize,
}

enum MissBehavior {
    NotFound,
    Transient,
}

impl StubRegistry {
    fn with_answers(names: &[&str]) -> Self {
        let answers = names
            .iter()
            .map(|name| (name.to_string(), registry_record(name)))
            .collect();
        Self {
            answers,
            miss_behavior: MissBehavior::NotFound,
            stall: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            answers: HashMap::new(),
            miss_behavior: MissBehavior::Transient,
            stall: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn stalling_on(mut self, name: &str, stall: Duration) -> Self {
        self.stall = Some((name.to_string(), stall));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DrugLookup for StubRegistry {
    async fn resolve(&self, name: &str) -> LookupOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((slow_name, stall)) = &self.stall {
            if slow_name == name {
                tokio::time::sleep(*stall).await;
            }
        }

        match self.answers.get(name) {
            Some(record) => LookupOutcome::Resolved(record.clone()),
            None => match self.miss_behavior {
                MissBehavior::NotFound => LookupOutcome::NotFound,
                MissBehavior::Transient => {
                    LookupOutcome::TransientFailure("connection refused".into())
                }
            },
        }
    }
}

fn registry_record(name: &str) -> DrugRecord {
    DrugRecord {
        name: name.to_string(),
        category: "Antihypertensive".into(),
        treats: "High blood pressure".into(),
        explanation: "Relaxes blood vessels".into(),
        dosage: "50 mg".into(),
        frequency: "Once daily".into(),
        side_effects: vec!["Dizziness".into()],
        warnings: "Do not stop abruptly".into(),
        source: RecordSource::Registry,
        confidence: Confidence::High,
        cached_at: None,
    }
}

fn cache_file(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("drug_cache.json")
}

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
    let cache = TieredCache::new(Arc::clone(&stub), cache_file(&dir));

    let first = cache.get_or_resolve("betaloc").await;
    assert!(first.is_confident());
    assert!(first.cached_at.is_some());

    // Case and whitespace variations hit the same entry
    let second = cache.get_or_resolve("  BETALOC ").await;
    assert_eq!(first, second);
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn not_found_is_retried_on_every_call() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubRegistry::with_answers(&[]));
    let cache = TieredCache::new(Arc::clone(&stub), cache_file(&dir));

    let first = cache.get_or_resolve("nosuchdrug").await;
    let second = cache.get_or_resolve("nosuchdrug").await;

    assert_eq!(first.confidence, Confidence::None);
    assert_eq!(second.confidence, Confidence::None);
    // The miss was not cached, so the registry was asked twice
    assert_eq!(stub.calls(), 2);
    // And nothing was persisted
    assert!(!cache_file(&dir).exists());
}

#[tokio::test]
async fn transient_failure_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubRegistry::failing());
    let cache = TieredCache::new(Arc::clone(&stub), cache_file(&dir));

    let record = cache.get_or_resolve("betaloc").await;
    assert_eq!(record, DrugRecord::not_found("betaloc"));

    cache.get_or_resolve("betaloc").await;
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn durable_tier_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(&dir);

    {
        let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
        let cache = TieredCache::new(Arc::clone(&stub), path.clone());
        cache.get_or_resolve("betaloc").await;
        assert_eq!(stub.calls(), 1);
    }

    // A fresh process loads the durable tier and never touches the registry
    let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
    let cache = TieredCache::new(Arc::clone(&stub), path);

    let record = cache.get_or_resolve("betaloc").await;
    assert_eq!(stub.calls(), 0);
    assert!(record.is_confident());
    assert_eq!(record.source, RecordSource::Cache);
    assert!(record.cached_at.is_some());
}

#[tokio::test]
async fn durable_file_is_a_json_map_keyed_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(&dir);
    let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
    let cache = TieredCache::new(Arc::clone(&stub), path.clone());

    cache.get_or_resolve("Betaloc").await;

    let raw = std::fs::read_to_string(&path).unwrap();
    let map: HashMap<String, DrugRecord> = serde_json::from_str(&raw).unwrap();
    assert!(map.contains_key("betaloc"));
    assert!(map["betaloc"].cached_at.is_some());
}

#[tokio::test]
async fn persistence_failure_still_returns_the_record() {
    // The cache path's parent is a regular file, so every write fails
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let path = blocker.join("drug_cache.json");

    let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
    let cache = TieredCache::new(Arc::clone(&stub), path);

    let record = cache.get_or_resolve("betaloc").await;
    assert!(record.is_confident());

    // The session tier still holds the record despite the failed write
    let again = cache.get_or_resolve("betaloc").await;
    assert_eq!(record, again);
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn clear_empties_both_tiers_and_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(&dir);
    let stub = Arc::new(StubRegistry::with_answers(&["betaloc"]));
    let cache = TieredCache::new(Arc::clone(&stub), path.clone());

    cache.get_or_resolve("betaloc").await;
    assert!(path.exists());
    assert_eq!(
        cache.stats(),
        CacheStats {
            durable_entries: 1,
            session_entries: 1,
        }
    );

    cache.clear();
    assert!(!path.exists());
    assert_eq!(
        cache.stats(),
        CacheStats {
            durable_entries: 0,
            session_entries: 0,
        }
    );

    // The next lookup goes back to the registry
    cache.get_or_resolve("betaloc").await;
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn batch_partitions_confident_and_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubRegistry::with_answers(&["amlodipine", "metformin", "atorvastatin"]);
    let cache = Arc::new(TieredCache::new(stub, cache_file(&dir)));
    let resolver = BatchResolver::new(cache);

    let names: Vec<String> = [
        "amlodipine", "metformin", "atorvastatin", "unknowna",
        "unknownb", "unknownc", "unknownd", "unknowne",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let outcome = resolver.resolve_batch(&names).await.unwrap();

    assert_eq!(outcome.records.len(), 8);
    assert_eq!(outcome.confirmed.len(), 3);
    for name in ["amlodipine", "metformin", "atorvastatin"] {
        assert!(outcome.confirmed.contains(name));
    }
    let unresolved = outcome.records.iter().filter(|r| !r.is_confident()).count();
    assert_eq!(unresolved, 5);
}

#[tokio::test]
async fn stalled_lookup_is_dropped_and_siblings_survive() {
    let names: Vec<String> = [
        "amlodipine", "metformin", "atorvastatin", "lisinopril",
        "omeprazole", "cefixime", "ranitidine", "telmisartan",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let stub =
        StubRegistry::with_answers(&name_refs).stalling_on("metformin", Duration::from_secs(30));

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(TieredCache::new(stub, cache_file(&dir)));
    let resolver =
        BatchResolver::new(cache).with_lookup_timeout(Duration::from_millis(100));

    let outcome = resolver.resolve_batch(&names).await.unwrap();

    assert_eq!(outcome.records.len(), 7);
    assert!(!outcome.records.iter().any(|r| r.name == "metformin"));
    assert!(!outcome.confirmed.contains("metformin"));
    assert_eq!(outcome.confirmed.len(), 7);
}

#[tokio::test]
async fn repeated_batches_query_each_name_once() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubRegistry::with_answers(&[
        "amlodipine",
        "metformin",
        "atorvastatin",
    ]));
    let cache = Arc::new(TieredCache::new(Arc::clone(&stub), cache_file(&dir)));
    let resolver = BatchResolver::new(cache);

    let names: Vec<String> = ["amlodipine", "metformin", "atorvastatin"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    resolver.resolve_batch(&names).await.unwrap();
    resolver.resolve_batch(&names).await.unwrap();

    assert_eq!(stub.calls(), 3);
}
