//! Bounded-parallel neighborhood fetching for one record.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use evigraph_core::Triple;

use super::fetcher::NeighborFetcher;
use crate::error::FetchError;

/// What happened to one identifier's fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Neighborhood retrieved; `triples` were contributed.
    Fetched { triples: usize },
    /// Connection, timeout or HTTP status failure; contributed nothing.
    TransportError { message: String },
    /// Response could not be decoded; contributed nothing.
    MalformedData { message: String },
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, FetchOutcome::Fetched { .. })
    }
}

impl From<&FetchError> for FetchOutcome {
    fn from(err: &FetchError) -> Self {
        if err.is_malformed() {
            FetchOutcome::MalformedData {
                message: err.to_string(),
            }
        } else {
            FetchOutcome::TransportError {
                message: err.to_string(),
            }
        }
    }
}

/// Merged result of fetching every identifier of a record.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Concatenated triples, in completion order.
    pub triples: Vec<Triple>,
    /// Per-identifier outcome, in completion order.
    pub outcomes: Vec<(String, FetchOutcome)>,
}

impl FetchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Runs one fetch per identifier with at most `concurrency` in flight.
///
/// The shared semaphore additionally caps fetches across all records that
/// use the same orchestrator.
pub struct FetchOrchestrator {
    fetcher: Arc<NeighborFetcher>,
    concurrency: usize,
    permits: Arc<Semaphore>,
}

impl FetchOrchestrator {
    pub fn new(fetcher: Arc<NeighborFetcher>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            fetcher,
            concurrency,
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch all identifiers. Failures become empty contributions.
    pub async fn fetch_all(&self, ids: &[String]) -> FetchReport {
        let results: Vec<(String, Result<Vec<Triple>, FetchError>)> = stream::iter(ids.iter().cloned())
            .map(|id| {
                let fetcher = Arc::clone(&self.fetcher);
                let permits = Arc::clone(&self.permits);
                async move {
                    // The semaphore is never closed, so acquire cannot fail.
                    let _permit = permits.acquire_owned().await.ok();
                    let result = fetcher.fetch(&id).await;
                    (id, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = FetchReport::default();
        for (id, result) in results {
            match result {
                Ok(triples) => {
                    debug!(id = %id, triples = triples.len(), "Fetched neighborhood");
                    report.outcomes.push((
                        id,
                        FetchOutcome::Fetched {
                            triples: triples.len(),
                        },
                    ));
                    report.triples.extend(triples);
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Neighborhood fetch failed, continuing without it");
                    let outcome = FetchOutcome::from(&e);
                    report.outcomes.push((id, outcome));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GraphStore, MemoryGraphStore, NeighborFragment, NeighborhoodFuture};
    use evigraph_core::PredicateBlocklist;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails for ids starting with `bad`, garbles ids starting with `junk`,
    /// and tracks peak concurrency.
    #[derive(Default)]
    struct FlakyStore {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GraphStore for FlakyStore {
        fn neighborhood<'a>(
            &'a self,
            id: &'a str,
            _blocklist: &'a PredicateBlocklist,
            _limit: usize,
        ) -> NeighborhoodFuture<'a> {
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if id.starts_with("bad") {
                    return Err(FetchError::Status {
                        status: 500,
                        body: "boom".to_string(),
                    });
                }
                if id.starts_with("junk") {
                    return Err(FetchError::Malformed {
                        message: "not json".to_string(),
                    });
                }
                Ok(vec![NeighborFragment {
                    sub: None,
                    pred: Some("p".to_string()),
                    obj: Some(format!("{}-n", id)),
                }])
            })
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn orchestrator(store: Arc<dyn GraphStore>, concurrency: usize) -> FetchOrchestrator {
        let fetcher = NeighborFetcher::new(store, Arc::new(PredicateBlocklist::empty()), 100);
        FetchOrchestrator::new(Arc::new(fetcher), concurrency)
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failures_isolated() {
        let store = Arc::new(FlakyStore::default());
        let report = orchestrator(store, 5)
            .fetch_all(&ids(&["a", "bad1", "b", "junk1"]))
            .await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.failures(), 2);
        let mut triples = report.triples.clone();
        triples.sort();
        assert_eq!(
            triples,
            vec![Triple::new("a", "p", "a-n"), Triple::new("b", "p", "b-n")]
        );

        let outcome = |id: &str| {
            report
                .outcomes
                .iter()
                .find(|(i, _)| i == id)
                .map(|(_, o)| o.clone())
                .unwrap()
        };
        assert!(matches!(outcome("bad1"), FetchOutcome::TransportError { .. }));
        assert!(matches!(outcome("junk1"), FetchOutcome::MalformedData { .. }));
        assert_eq!(outcome("a"), FetchOutcome::Fetched { triples: 1 });
    }

    #[tokio::test]
    async fn test_concurrency_bounded() {
        let store = Arc::new(FlakyStore::default());
        let names: Vec<String> = (0..40).map(|i| format!("n{}", i)).collect();
        let report = orchestrator(store.clone(), 3).fetch_all(&names).await;

        assert_eq!(report.triples.len(), 40);
        let peak = store.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {}", peak);
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let report = orchestrator(Arc::new(MemoryGraphStore::default()), 5)
            .fetch_all(&[])
            .await;
        assert!(report.triples.is_empty());
        assert!(report.outcomes.is_empty());
    }
}
