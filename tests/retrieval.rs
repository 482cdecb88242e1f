//! Orchestrator behavior against a scripted remote source: cache
//! reconciliation, in-flight deduplication, retry policy, ordering and
//! cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lane_report::cache::MatchCache;
use lane_report::config::RetrievalSettings;
use lane_report::domain::{MatchDescriptor, MatchRecord};
use lane_report::errors::FetchError;
use lane_report::retrieval::{MatchRetriever, MatchSource};

#[derive(Default, Clone, Copy)]
struct Behavior {
    not_found: bool,
    failures_before_success: u32,
    delay_ms: u64,
}

/// Remote source stand-in driven by per-id behaviors.
struct ScriptedSource {
    behaviors: HashMap<i64, Behavior>,
    attempts: Mutex<HashMap<i64, u32>>,
    total_fetches: AtomicUsize,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
            total_fetches: AtomicUsize::new(0),
        }
    }

    fn with_behavior(mut self, match_id: i64, behavior: Behavior) -> Self {
        self.behaviors.insert(match_id, behavior);
        self
    }

    fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

impl MatchSource for ScriptedSource {
    async fn fetch_match(&self, match_id: i64) -> Result<MatchRecord, FetchError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(match_id).or_insert(0);
            *entry += 1;
            *entry
        };

        let behavior = self.behaviors.get(&match_id).copied().unwrap_or_default();
        if behavior.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(behavior.delay_ms)).await;
        }
        if behavior.not_found {
            return Err(FetchError::NotFound(match_id));
        }
        if attempt <= behavior.failures_before_success {
            return Err(FetchError::unavailable(format!(
                "scripted failure {attempt} for match {match_id}"
            )));
        }
        Ok(record(match_id))
    }
}

fn record(match_id: i64) -> MatchRecord {
    MatchRecord {
        match_id,
        duration_secs: 1800,
        participants: Vec::new(),
        identities: Vec::new(),
    }
}

fn descriptors(ids: &[i64]) -> Vec<MatchDescriptor> {
    ids.iter().map(|&match_id| MatchDescriptor { match_id }).collect()
}

fn temp_cache(name: &str) -> MatchCache {
    let path = std::env::temp_dir().join(format!("lane_report_retrieval_{name}.sqlite"));
    let _ = std::fs::remove_file(&path);
    MatchCache::open(path.to_str().unwrap()).unwrap()
}

fn settings() -> RetrievalSettings {
    RetrievalSettings {
        max_concurrent: 4,
        max_attempts: 3,
        retry_delay_ms: 1,
    }
}

fn retriever(
    cache: MatchCache,
    source: Arc<ScriptedSource>,
) -> MatchRetriever<Arc<ScriptedSource>> {
    MatchRetriever::new(cache, source, &settings())
}

#[tokio::test]
async fn cache_hits_skip_the_remote_source() {
    let cache = temp_cache("cache_hits");
    cache.put(&record(1)).unwrap();
    cache.put(&record(2)).unwrap();
    let source = Arc::new(ScriptedSource::new());
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[1, 2, 3]), &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<i64> = outcomes
        .iter()
        .map(|o| o.as_ref().unwrap().match_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    // Only the uncached id went to the remote service.
    assert_eq!(source.total_fetches(), 1);
}

#[tokio::test]
async fn fetched_misses_are_written_back() {
    let cache = temp_cache("write_back");
    cache.put(&record(1)).unwrap();
    cache.put(&record(2)).unwrap();
    let source = Arc::new(ScriptedSource::new());
    let retriever = retriever(cache, Arc::clone(&source));

    retriever
        .retrieve_all(&descriptors(&[1, 2, 3]), &CancellationToken::new())
        .await
        .unwrap();

    // All three ids are rows now; a second run is fully cache-served.
    let outcomes = retriever
        .retrieve_all(&descriptors(&[1, 2, 3]), &CancellationToken::new())
        .await
        .unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(source.total_fetches(), 1);
}

#[tokio::test]
async fn duplicate_ids_share_one_in_flight_fetch() {
    let path = std::env::temp_dir().join("lane_report_retrieval_dedup_batch.sqlite");
    let _ = std::fs::remove_file(&path);
    let cache = MatchCache::open(path.to_str().unwrap()).unwrap();
    let source = Arc::new(ScriptedSource::new().with_behavior(
        7,
        Behavior {
            delay_ms: 50,
            ..Behavior::default()
        },
    ));
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[7, 7, 7]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(source.total_fetches(), 1);

    // Exactly one row landed despite three requests for the id.
    let inspection = MatchCache::open(path.to_str().unwrap()).unwrap();
    assert_eq!(inspection.count().unwrap(), 1);
}

#[tokio::test]
async fn concurrent_batches_share_one_in_flight_fetch() {
    let cache = temp_cache("dedup_concurrent");
    let source = Arc::new(ScriptedSource::new().with_behavior(
        9,
        Behavior {
            delay_ms: 50,
            ..Behavior::default()
        },
    ));
    let retriever = retriever(cache, Arc::clone(&source));
    let cancel = CancellationToken::new();

    let ids = descriptors(&[9]);
    let (first, second) = tokio::join!(
        retriever.retrieve_all(&ids, &cancel),
        retriever.retrieve_all(&ids, &cancel),
    );

    assert!(first.unwrap()[0].is_ok());
    assert!(second.unwrap()[0].is_ok());
    assert_eq!(source.total_fetches(), 1);
}

#[tokio::test]
async fn permanent_failure_does_not_abort_the_batch() {
    let cache = temp_cache("not_found");
    let source = Arc::new(ScriptedSource::new().with_behavior(
        2,
        Behavior {
            not_found: true,
            ..Behavior::default()
        },
    ));
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[1, 2, 3]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcomes[0].as_ref().unwrap().match_id, 1);
    assert_eq!(outcomes[1], Err(FetchError::NotFound(2)));
    assert_eq!(outcomes[2].as_ref().unwrap().match_id, 3);
    // NotFound is permanent: exactly one attempt, no retries.
    assert_eq!(source.total_fetches(), 3);
}

#[tokio::test]
async fn transient_failures_are_retried_to_success() {
    let cache = temp_cache("retry_success");
    let source = Arc::new(ScriptedSource::new().with_behavior(
        5,
        Behavior {
            failures_before_success: 2,
            ..Behavior::default()
        },
    ));
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[5]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcomes[0].as_ref().unwrap().match_id, 5);
    assert_eq!(source.total_fetches(), 3);
}

#[tokio::test]
async fn transient_exhaustion_surfaces_per_id() {
    let cache = temp_cache("retry_exhausted");
    let source = Arc::new(ScriptedSource::new().with_behavior(
        6,
        Behavior {
            failures_before_success: 99,
            ..Behavior::default()
        },
    ));
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[6]), &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        outcomes[0],
        Err(FetchError::RemoteUnavailable { .. })
    ));
    assert_eq!(source.total_fetches(), settings().max_attempts as usize);
}

#[tokio::test]
async fn output_order_is_input_order_despite_latency() {
    let cache = temp_cache("ordering");
    let source = Arc::new(
        ScriptedSource::new()
            .with_behavior(
                10,
                Behavior {
                    delay_ms: 80,
                    ..Behavior::default()
                },
            )
            .with_behavior(
                11,
                Behavior {
                    delay_ms: 5,
                    ..Behavior::default()
                },
            ),
    );
    let retriever = retriever(cache, Arc::clone(&source));

    let outcomes = retriever
        .retrieve_all(&descriptors(&[10, 11]), &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<i64> = outcomes
        .iter()
        .map(|o| o.as_ref().unwrap().match_id)
        .collect();
    assert_eq!(ids, vec![10, 11]);
}

#[tokio::test]
async fn cancellation_aborts_before_any_fetch() {
    let cache = temp_cache("cancelled");
    let source = Arc::new(ScriptedSource::new());
    let retriever = retriever(cache, Arc::clone(&source));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = retriever.retrieve_all(&descriptors(&[1, 2]), &cancel).await;

    assert!(result.is_err());
    assert_eq!(source.total_fetches(), 0);
}
