//! Assembling a record pipeline from configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use evigraph_core::PrefixMap;

use crate::config::{EngineConfig, PrefixConfig};
use crate::error::{EngineError, Result};
use crate::fetch::{FetchOrchestrator, NeighborFetcher};
use crate::pipeline::RecordPipeline;
use crate::resolver::{IdentifierResolver, MapResolver, SparqlResolver};
use crate::sparql::SparqlClient;
use crate::store::{GraphStore, MemoryGraphStore, SparqlGraphStore};

/// Built-in prefixes, with the configured prefix file merged on top.
pub fn load_prefixes(config: &PrefixConfig) -> Result<PrefixMap> {
    let mut prefixes = PrefixMap::default();
    if let Some(path) = &config.file {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        let applied = prefixes.merge_declarations(&text);
        debug!(path = %path.display(), applied, "Loaded prefix file");
    }
    Ok(prefixes)
}

/// The two remote collaborators a pipeline needs.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn GraphStore>,
    pub resolver: Arc<dyn IdentifierResolver>,
}

impl Backends {
    /// Store and resolver sharing one SPARQL client.
    pub fn sparql(client: Arc<SparqlClient>, prefixes: Arc<PrefixMap>) -> Self {
        Self {
            store: Arc::new(SparqlGraphStore::new(Arc::clone(&client), prefixes)),
            resolver: Arc::new(SparqlResolver::new(client)),
        }
    }

    /// Offline backends from a triples file and an optional id map.
    ///
    /// Without an id map every external id resolves to itself.
    pub fn offline(triples: &Path, id_map: Option<&Path>) -> Result<Self> {
        let store = MemoryGraphStore::load(triples)?;
        info!(path = %triples.display(), triples = store.len(), "Loaded offline triple store");
        let resolver = match id_map {
            Some(path) => MapResolver::load(path)?,
            None => MapResolver::identity(),
        };
        Ok(Self {
            store: Arc::new(store),
            resolver: Arc::new(resolver),
        })
    }
}

/// Validate `config` and wire fetcher, orchestrator and pipeline.
pub fn build_pipeline(config: &EngineConfig, backends: Backends) -> Result<RecordPipeline> {
    config.validate()?;
    let blocklist = Arc::new(config.blocklist()?);

    let fetcher = NeighborFetcher::new(backends.store, Arc::clone(&blocklist), config.fetch.max_results);
    let orchestrator = FetchOrchestrator::new(Arc::new(fetcher), config.fetch.concurrency);

    Ok(RecordPipeline::new(
        backends.resolver,
        orchestrator,
        blocklist,
        config.graph.edge_mode,
        config.fetch.resolve_concurrency,
    ))
}
