//! Connected components on the undirected projection.

use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

use crate::error::{GraphError, Result};
use crate::graph::TripleGraph;

/// Enumerate components in node insertion order; each component lists its
/// nodes in BFS order from its first-inserted node.
fn component_indices(graph: &TripleGraph) -> Vec<Vec<NodeIndex>> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut components = Vec::new();

    for start in graph.inner().node_indices() {
        if !visited.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in graph.undirected_neighbors(current) {
                if visited.insert(neighbor) {
                    component.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Undirected connected components as lists of node IDs.
pub fn connected_components(graph: &TripleGraph) -> Vec<Vec<String>> {
    component_indices(graph)
        .into_iter()
        .map(|c| c.into_iter().map(|idx| graph.id_of(idx).to_string()).collect())
        .collect()
}

/// Restrict `graph` to its largest undirected connected component.
///
/// Ties go to the component enumerated first. The induced subgraph keeps the
/// original directed edges among the retained nodes.
///
/// # Errors
///
/// [`GraphError::EmptyGraph`] when the graph has no nodes.
pub fn largest_component(graph: &TripleGraph) -> Result<TripleGraph> {
    let components = component_indices(graph);

    let mut largest: Option<&Vec<NodeIndex>> = None;
    for component in &components {
        if largest.map_or(true, |l| component.len() > l.len()) {
            largest = Some(component);
        }
    }

    let largest = largest.ok_or(GraphError::EmptyGraph)?;
    let keep: HashSet<NodeIndex> = largest.iter().copied().collect();
    Ok(graph.induced(&keep))
}
