use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use tokio::sync::{Mutex, OnceCell, Semaphore};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::cache::MatchCache;
use crate::config::RetrievalSettings;
use crate::domain::{MatchDescriptor, MatchRecord};
use crate::errors::FetchError;

/// Outcome of retrieving a single match id.
pub type FetchOutcome = Result<MatchRecord, FetchError>;

/// Remote source of match records.
///
/// Implemented by the API client; tests plug in scripted sources.
pub trait MatchSource: Send + Sync {
    fn fetch_match(
        &self,
        match_id: i64,
    ) -> impl Future<Output = Result<MatchRecord, FetchError>> + Send;
}

impl<T: MatchSource> MatchSource for Arc<T> {
    fn fetch_match(
        &self,
        match_id: i64,
    ) -> impl Future<Output = Result<MatchRecord, FetchError>> + Send {
        (**self).fetch_match(match_id)
    }
}

type InFlightCell = Arc<OnceCell<FetchOutcome>>;

/// Reconciles cache hits with remote fetches.
///
/// Remote concurrency is bounded by a semaphore, and concurrent requests
/// for the same match id share one in-flight fetch instead of each going
/// to the remote service.
pub struct MatchRetriever<S> {
    inner: Arc<RetrieverInner<S>>,
}

struct RetrieverInner<S> {
    cache: MatchCache,
    source: S,
    max_attempts: u32,
    retry_delay: Duration,
    fetch_permits: Semaphore,
    in_flight: Mutex<HashMap<i64, InFlightCell>>,
}

impl<S> Clone for MatchRetriever<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MatchSource + 'static> MatchRetriever<S> {
    pub fn new(cache: MatchCache, source: S, settings: &RetrievalSettings) -> Self {
        Self {
            inner: Arc::new(RetrieverInner {
                cache,
                source,
                max_attempts: settings.max_attempts.max(1),
                retry_delay: Duration::from_millis(settings.retry_delay_ms),
                fetch_permits: Semaphore::new(settings.max_concurrent.max(1)),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Resolve every descriptor from the cache or the remote source.
    ///
    /// The output is index-aligned with the input regardless of the order
    /// in which the underlying fetches complete. A permanent failure for
    /// one id becomes an error entry at its index; it never aborts the
    /// batch. Cancellation aborts the whole batch, but records already
    /// written to the cache stay there.
    pub async fn retrieve_all(
        &self,
        ids: &[MatchDescriptor],
        cancel: &CancellationToken,
    ) -> Result<Vec<FetchOutcome>> {
        let mut handles = Vec::with_capacity(ids.len());
        for descriptor in ids {
            let retriever = self.clone();
            let cancel = cancel.clone();
            let match_id = descriptor.match_id;
            handles.push(tokio::spawn(async move {
                retriever.retrieve_one(match_id, cancel).await
            }));
        }

        // Join in spawn order so the output sequence mirrors the input.
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.context("retrieval task panicked")??);
        }
        Ok(outcomes)
    }

    async fn retrieve_one(
        &self,
        match_id: i64,
        cancel: CancellationToken,
    ) -> Result<FetchOutcome> {
        if cancel.is_cancelled() {
            return Err(anyhow!("retrieval cancelled"));
        }

        if let Some(record) = self.inner.cache.get(match_id)? {
            debug!("Loaded match {} from cache", match_id);
            return Ok(Ok(record));
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(anyhow!("retrieval cancelled")),
            outcome = self.fetch_deduplicated(match_id, &cancel) => Ok(outcome),
        }
    }

    /// Collapse concurrent requests for one id into a single remote fetch.
    ///
    /// The first caller initializes the cell; everyone else awaits the same
    /// cell and clones its outcome. The entry is dropped once settled so a
    /// later run can retry an id whose fetch failed.
    async fn fetch_deduplicated(&self, match_id: i64, cancel: &CancellationToken) -> FetchOutcome {
        let cell = {
            let mut in_flight = self.inner.in_flight.lock().await;
            in_flight
                .entry(match_id)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let outcome = cell
            .get_or_init(|| self.fetch_and_store(match_id, cancel))
            .await
            .clone();

        // Only the cell we actually waited on may be evicted; a later run
        // may already have parked a fresh cell under the same id.
        let mut in_flight = self.inner.in_flight.lock().await;
        if in_flight
            .get(&match_id)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            in_flight.remove(&match_id);
        }
        outcome
    }

    async fn fetch_and_store(&self, match_id: i64, cancel: &CancellationToken) -> FetchOutcome {
        let _permit = match self.inner.fetch_permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Err(FetchError::unavailable("fetch worker pool closed")),
        };

        let outcome = self.fetch_with_retry(match_id, cancel).await;
        if let Ok(record) = &outcome {
            // Write-through before returning so later requests hit the cache.
            if let Err(e) = self.inner.cache.put(record) {
                warn!("Failed to cache match {}: {:#}", match_id, e);
            } else {
                info!("Cached match {}", match_id);
            }
        }
        outcome
    }

    async fn fetch_with_retry(&self, match_id: i64, cancel: &CancellationToken) -> FetchOutcome {
        let mut attempt = 1;
        loop {
            match self.inner.source.fetch_match(match_id).await {
                Ok(record) => return Ok(record),
                Err(e)
                    if e.is_transient()
                        && attempt < self.inner.max_attempts
                        && !cancel.is_cancelled() =>
                {
                    warn!(
                        "Fetch attempt {}/{} for match {} failed: {}",
                        attempt, self.inner.max_attempts, match_id, e
                    );
                    sleep(self.inner.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("Giving up on match {}: {}", match_id, e);
                    return Err(e);
                }
            }
        }
    }
}
