//! Command implementations for the evigraph CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod doctor;
pub mod generate;
pub mod inspect;
pub mod subgraph;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use evigraph_engine::{load_prefixes, Backends, EngineConfig, SparqlClient};

/// Where neighborhoods and identifier mappings come from.
#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// SPARQL endpoint URL (overrides `[endpoint].url`)
    #[arg(long, env = "EVIGRAPH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Run offline against a JSON file of [subject, predicate, object] triples
    #[arg(long, conflicts_with = "endpoint")]
    pub triples: Option<PathBuf>,

    /// JSON object mapping external ids to graph ids (offline mode only)
    #[arg(long, requires = "triples")]
    pub id_map: Option<PathBuf>,
}

impl BackendArgs {
    /// Apply command-line overrides to the loaded configuration.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(url) = &self.endpoint {
            config.endpoint.url = url.clone();
        }
    }

    /// Build the store and resolver: offline when `--triples` is given,
    /// otherwise the configured endpoint.
    pub fn backends(&self, config: &EngineConfig) -> anyhow::Result<Backends> {
        match &self.triples {
            Some(triples) => Ok(Backends::offline(triples, self.id_map.as_deref())?),
            None => {
                let client = Arc::new(SparqlClient::new(&config.endpoint)?);
                let prefixes = Arc::new(load_prefixes(&config.prefixes)?);
                tracing::info!(endpoint = client.endpoint(), "Using SPARQL endpoint");
                Ok(Backends::sparql(client, prefixes))
            }
        }
    }
}
