//! Graph stores answering one-hop neighborhood queries.

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use evigraph_core::{PredicateBlocklist, PrefixMap, Triple};

use crate::error::{EngineError, FetchError};
use crate::sparql::response::value;
use crate::sparql::{neighborhood_query, SparqlClient};

/// One result row of a neighborhood query.
///
/// Exactly one of `sub` or `obj` is normally bound: `sub` when the queried
/// entity was the object, `obj` when it was the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NeighborFragment {
    pub sub: Option<String>,
    pub pred: Option<String>,
    pub obj: Option<String>,
}

/// Boxed future returned by [`GraphStore::neighborhood`].
pub type NeighborhoodFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<NeighborFragment>, FetchError>> + Send + 'a>>;

/// Source of neighborhood fragments for a graph-native identifier.
///
/// Implementations must be safe to call concurrently.
pub trait GraphStore: Send + Sync {
    /// Fragments for every triple with `id` as subject or object whose
    /// predicate is not blocked, capped at `limit` rows.
    fn neighborhood<'a>(
        &'a self,
        id: &'a str,
        blocklist: &'a PredicateBlocklist,
        limit: usize,
    ) -> NeighborhoodFuture<'a>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Neighborhoods from a remote SPARQL endpoint.
pub struct SparqlGraphStore {
    client: Arc<SparqlClient>,
    prefixes: Arc<PrefixMap>,
}

impl SparqlGraphStore {
    pub fn new(client: Arc<SparqlClient>, prefixes: Arc<PrefixMap>) -> Self {
        Self { client, prefixes }
    }
}

impl GraphStore for SparqlGraphStore {
    fn neighborhood<'a>(
        &'a self,
        id: &'a str,
        blocklist: &'a PredicateBlocklist,
        limit: usize,
    ) -> NeighborhoodFuture<'a> {
        Box::pin(async move {
            let query = neighborhood_query(&self.prefixes, id, blocklist, limit);
            let results = self.client.query(&query).await?;
            let fragments = results
                .bindings()?
                .iter()
                .map(|row| NeighborFragment {
                    sub: value(row, "sub").map(String::from),
                    pred: value(row, "pred").map(String::from),
                    obj: value(row, "obj").map(String::from),
                })
                .collect();
            Ok(fragments)
        })
    }

    fn name(&self) -> &str {
        self.client.endpoint()
    }
}

/// Neighborhoods answered from an in-memory triple list.
///
/// Applies the same blocklist, distinctness and row cap as the SPARQL store,
/// so offline runs are reproducible stand-ins for endpoint runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraphStore {
    triples: Vec<Triple>,
}

impl MemoryGraphStore {
    pub fn new(triples: Vec<Triple>) -> Self {
        Self { triples }
    }

    /// Load a JSON array of `[subject, predicate, object]` triples.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let triples: Vec<Triple> =
            serde_json::from_str(&text).map_err(|source| EngineError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(triples))
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    fn fragments(&self, id: &str, blocklist: &PredicateBlocklist, limit: usize) -> Vec<NeighborFragment> {
        let mut seen = HashSet::new();
        let mut fragments = Vec::new();

        for triple in &self.triples {
            if blocklist.is_blocked(&triple.predicate) {
                continue;
            }
            let mut rows = Vec::with_capacity(2);
            if triple.subject == id {
                rows.push(NeighborFragment {
                    sub: None,
                    pred: Some(triple.predicate.clone()),
                    obj: Some(triple.object.clone()),
                });
            }
            if triple.object == id {
                rows.push(NeighborFragment {
                    sub: Some(triple.subject.clone()),
                    pred: Some(triple.predicate.clone()),
                    obj: None,
                });
            }
            for row in rows {
                if fragments.len() == limit {
                    return fragments;
                }
                if seen.insert(row.clone()) {
                    fragments.push(row);
                }
            }
        }
        fragments
    }
}

impl GraphStore for MemoryGraphStore {
    fn neighborhood<'a>(
        &'a self,
        id: &'a str,
        blocklist: &'a PredicateBlocklist,
        limit: usize,
    ) -> NeighborhoodFuture<'a> {
        Box::pin(async move { Ok(self.fragments(id, blocklist, limit)) })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store() -> MemoryGraphStore {
        MemoryGraphStore::new(vec![
            Triple::new("A", "knows", "B"),
            Triple::new("C", "memberOf", "A"),
            Triple::new("A", "rdfs:label", "Alpha"),
            Triple::new("A", "knows", "B"),
            Triple::new("D", "knows", "E"),
        ])
    }

    #[tokio::test]
    async fn test_memory_neighborhood() {
        let blocklist = PredicateBlocklist::new(["label"]).unwrap();
        let fragments = store().neighborhood("A", &blocklist, 100).await.unwrap();
        assert_eq!(
            fragments,
            vec![
                NeighborFragment {
                    sub: None,
                    pred: Some("knows".to_string()),
                    obj: Some("B".to_string()),
                },
                NeighborFragment {
                    sub: Some("C".to_string()),
                    pred: Some("memberOf".to_string()),
                    obj: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_memory_neighborhood_limit() {
        let fragments = store()
            .neighborhood("A", &PredicateBlocklist::empty(), 2)
            .await
            .unwrap();
        assert_eq!(fragments.len(), 2);
    }

    #[tokio::test]
    async fn test_self_loop_yields_both_rows() {
        let store = MemoryGraphStore::new(vec![Triple::new("A", "sameKind", "A")]);
        let fragments = store
            .neighborhood("A", &PredicateBlocklist::empty(), 10)
            .await
            .unwrap();
        assert_eq!(fragments.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_empty() {
        let fragments = store()
            .neighborhood("Z", &PredicateBlocklist::empty(), 10)
            .await
            .unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_load_triples_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["A", "knows", "B"], ["B", "knows", "C"]]"#).unwrap();
        let store = MemoryGraphStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"[["A", "knows"]]"#).unwrap();
        assert!(matches!(
            MemoryGraphStore::load(bad.path()),
            Err(EngineError::Parse { .. })
        ));
    }
}
