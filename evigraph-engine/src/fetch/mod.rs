//! Neighborhood retrieval: single-entity fetcher and the bounded-concurrency
//! orchestrator that fans out over a record's entities.

mod fetcher;
mod orchestrator;

pub use fetcher::{triples_from_fragments, NeighborFetcher};
pub use orchestrator::{FetchOrchestrator, FetchOutcome, FetchReport};
