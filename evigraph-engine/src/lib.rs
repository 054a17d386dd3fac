//! evigraph engine - async subgraph generation over a remote knowledge graph.
//!
//! This library provides:
//! - Configuration with documented defaults and one-time validation
//! - SPARQL client, neighborhood store and QID resolver
//! - Bounded-concurrency neighborhood fetching with per-identifier isolation
//! - The per-record pipeline (resolve, fetch, filter, build, Steiner, reduce)
//! - The checkpointed batch driver

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod sparql;
pub mod store;

pub use batch::{read_artifact, BatchDriver, BatchEvent, BatchResults, BatchSummary, DriverState};
pub use config::EngineConfig;
pub use engine::{build_pipeline, load_prefixes, Backends};
pub use error::{
    CheckpointError, ConfigError, EngineError, FetchError, PipelineError, ResolveError, Result,
};
pub use fetch::{FetchOrchestrator, FetchOutcome, FetchReport, NeighborFetcher};
pub use pipeline::{build_subgraphs, RecordPipeline, RecordProcessor, RecordResult};
pub use record::{load_records, parse_records, Record};
pub use resolver::{IdentifierResolver, MapResolver, Resolution, SparqlResolver};
pub use sparql::SparqlClient;
pub use store::{GraphStore, MemoryGraphStore, NeighborFragment, SparqlGraphStore};
