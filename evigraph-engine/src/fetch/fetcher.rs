//! One-hop neighborhood fetcher.

use std::sync::Arc;

use evigraph_core::{PredicateBlocklist, Triple};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::store::{GraphStore, NeighborFragment};

/// Rebuild triples around `id` from neighborhood fragments.
///
/// `sub` + `pred` means `id` was the object; otherwise `obj` + `pred` means
/// `id` was the subject. Anything else is skipped with a warning.
pub fn triples_from_fragments(id: &str, fragments: Vec<NeighborFragment>) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            NeighborFragment {
                sub: Some(sub),
                pred: Some(pred),
                ..
            } => triples.push(Triple::new(sub, pred, id)),
            NeighborFragment {
                obj: Some(obj),
                pred: Some(pred),
                ..
            } => triples.push(Triple::new(id, pred, obj)),
            other => warn!(id, fragment = ?other, "Skipping malformed neighborhood fragment"),
        }
    }
    triples
}

/// Fetches the neighborhood of one graph-native identifier.
pub struct NeighborFetcher {
    store: Arc<dyn GraphStore>,
    blocklist: Arc<PredicateBlocklist>,
    limit: usize,
}

impl NeighborFetcher {
    pub fn new(store: Arc<dyn GraphStore>, blocklist: Arc<PredicateBlocklist>, limit: usize) -> Self {
        Self {
            store,
            blocklist,
            limit,
        }
    }

    /// All triples with `id` as subject or object, minus blocked predicates.
    pub async fn fetch(&self, id: &str) -> Result<Vec<Triple>, FetchError> {
        let fragments = self.store.neighborhood(id, &self.blocklist, self.limit).await?;
        if fragments.len() >= self.limit {
            debug!(id, limit = self.limit, "Neighborhood hit the row cap");
        }
        Ok(triples_from_fragments(id, fragments))
    }
}
