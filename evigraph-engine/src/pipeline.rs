//! Per-record pipeline: resolve, fetch, filter, build, reduce, serialize.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use evigraph_core::{
    filter_triples, largest_component, steiner_subgraph, to_triples, EdgeMode, GraphBuilder,
    GraphError, PredicateBlocklist, Triple,
};

use crate::error::PipelineError;
use crate::fetch::FetchOrchestrator;
use crate::record::Record;
use crate::resolver::{IdentifierResolver, Resolution};

/// Subgraphs produced for one record.
///
/// Field names are the artifact keys downstream tooling reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    #[serde(rename = "subgraph_Steiner")]
    pub steiner: Vec<Triple>,
    #[serde(rename = "subgraph_Steiner_length")]
    pub steiner_len: usize,
    #[serde(rename = "subgraph_Steiner_largest_connected")]
    pub largest: Vec<Triple>,
    #[serde(rename = "subgraph_Steiner_largest_connected_length")]
    pub largest_len: usize,
}

impl RecordResult {
    pub fn new(steiner: Vec<Triple>, largest: Vec<Triple>) -> Self {
        Self {
            steiner_len: steiner.len(),
            largest_len: largest.len(),
            steiner,
            largest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steiner.is_empty() && self.largest.is_empty()
    }
}

/// Boxed future returned by [`RecordProcessor::process`].
pub type ProcessFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RecordResult, PipelineError>> + Send + 'a>>;

/// Anything the batch driver can run per record.
pub trait RecordProcessor: Send + Sync {
    fn process<'a>(&'a self, record: &'a Record) -> ProcessFuture<'a>;
}

/// Synchronous tail of the pipeline over already-fetched triples.
///
/// An empty Steiner result yields an empty largest component without calling
/// the reducer.
pub fn build_subgraphs(
    triples: &[Triple],
    terminals: &[String],
    blocklist: &PredicateBlocklist,
    mode: EdgeMode,
) -> Result<RecordResult, GraphError> {
    let filtered = filter_triples(triples, blocklist);
    let graph = GraphBuilder::new(mode).build(&filtered);
    let steiner = steiner_subgraph(&graph, terminals);

    if steiner.is_empty() {
        return Ok(RecordResult::default());
    }

    let largest = largest_component(&steiner)?;
    Ok(RecordResult::new(to_triples(&steiner), to_triples(&largest)))
}

/// Runs one record end to end.
pub struct RecordPipeline {
    resolver: Arc<dyn IdentifierResolver>,
    orchestrator: FetchOrchestrator,
    blocklist: Arc<PredicateBlocklist>,
    edge_mode: EdgeMode,
    resolve_concurrency: usize,
}

impl RecordPipeline {
    pub fn new(
        resolver: Arc<dyn IdentifierResolver>,
        orchestrator: FetchOrchestrator,
        blocklist: Arc<PredicateBlocklist>,
        edge_mode: EdgeMode,
        resolve_concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            orchestrator,
            blocklist,
            edge_mode,
            resolve_concurrency: resolve_concurrency.max(1),
        }
    }

    /// Resolve external IDs, dropping misses and failures. Order follows the
    /// input; duplicates after resolution are removed.
    pub async fn resolve_all(&self, external_ids: &[String]) -> Vec<String> {
        let resolved: Vec<Option<String>> = stream::iter(external_ids.iter().cloned())
            .map(|id: String| async move {
                match self.resolver.resolve(&id).await {
                    Ok(Resolution::Found(native)) => Some(native),
                    Ok(Resolution::NotFound) => {
                        debug!(id = %id, "Identifier not found, dropping");
                        None
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Identifier lookup failed, dropping");
                        None
                    }
                }
            })
            .buffered(self.resolve_concurrency)
            .collect()
            .await;

        let mut seen = HashSet::new();
        resolved
            .into_iter()
            .flatten()
            .filter(|native| seen.insert(native.clone()))
            .collect()
    }

    /// Run the full pipeline for one record.
    pub async fn run(&self, record: &Record) -> Result<RecordResult, PipelineError> {
        if let Some(reason) = &record.malformed {
            return Err(PipelineError::MalformedRecord {
                key: record.key.clone(),
                reason: reason.clone(),
            });
        }

        let start = Instant::now();
        let external_ids = record.interesting_ids();
        let terminals = self.resolve_all(&external_ids).await;

        if terminals.is_empty() {
            debug!(key = %record.key, "No identifiers resolved, empty result");
            return Ok(RecordResult::default());
        }

        let report = self.orchestrator.fetch_all(&terminals).await;
        let fetched = report.triples.len();
        let failures = report.failures();

        let blocklist = Arc::clone(&self.blocklist);
        let mode = self.edge_mode;
        let terminal_count = terminals.len();
        let result = tokio::task::spawn_blocking(move || {
            build_subgraphs(&report.triples, &terminals, &blocklist, mode)
        })
        .await??;

        debug!(
            key = %record.key,
            external = external_ids.len(),
            terminals = terminal_count,
            fetched,
            failures,
            steiner = result.steiner_len,
            largest = result.largest_len,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Record processed"
        );
        Ok(result)
    }
}

impl RecordProcessor for RecordPipeline {
    fn process<'a>(&'a self, record: &'a Record) -> ProcessFuture<'a> {
        Box::pin(self.run(record))
    }
}
