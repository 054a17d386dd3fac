//! Graph edges back to triples.

use tracing::warn;

use crate::graph::TripleGraph;
use crate::triple::Triple;

/// Emit `(source, predicate, target)` for every edge, in edge insertion order.
///
/// Edges without a predicate label are skipped with a warning.
pub fn to_triples(graph: &TripleGraph) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(graph.edge_count());
    for (source, predicate, target) in graph.edges() {
        if predicate.is_empty() {
            warn!(source, target, "Edge has no predicate label, skipping");
            continue;
        }
        triples.push(Triple::new(source, predicate, target));
    }
    triples
}
