//! Approximate Steiner subgraphs over the undirected projection.
//!
//! Uses the metric-closure construction (Kou, Markowsky and Berman):
//!
//! 1. BFS from every terminal over the undirected projection (hop distance).
//! 2. Minimum spanning tree of the complete terminal graph weighted by those
//!    distances (Kruskal).
//! 3. Each spanning-tree edge is replaced by the BFS shortest path it stands
//!    for; the subgraph is the union of all path edges.
//!
//! The result spans every terminal within a factor of 2 of the optimal tree
//! weight. Cost is O(t * (V + E)) for the searches plus O(t^2 log t) for the
//! spanning tree. Terminals in different undirected components cannot be
//! joined, so the spanning tree degrades into a spanning forest and the output
//! holds one tree per component; the largest-component reducer picks one.
//!
//! Direction and labels are re-attached afterwards: for every undirected edge
//! `{u, v}` in the result, all original `u -> v` and `v -> u` edges are copied.

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::graph::TripleGraph;

/// Shortest-path tree from one terminal, unweighted.
struct BfsTree {
    parent: Vec<Option<NodeIndex>>,
    dist: Vec<Option<usize>>,
}

impl BfsTree {
    fn search(adjacency: &[Vec<NodeIndex>], root: NodeIndex) -> Self {
        let n = adjacency.len();
        let mut parent = vec![None; n];
        let mut dist = vec![None; n];
        let mut queue = VecDeque::new();

        dist[root.index()] = Some(0);
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let d = dist[current.index()].unwrap_or(0);
            for &next in &adjacency[current.index()] {
                if dist[next.index()].is_none() {
                    dist[next.index()] = Some(d + 1);
                    parent[next.index()] = Some(current);
                    queue.push_back(next);
                }
            }
        }

        Self { parent, dist }
    }

    fn distance(&self, target: NodeIndex) -> Option<usize> {
        self.dist[target.index()]
    }

    /// Path from `target` back to the root, inclusive of both ends.
    fn path_to(&self, target: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![target];
        let mut current = target;
        while let Some(p) = self.parent[current.index()] {
            path.push(p);
            current = p;
        }
        path
    }
}

fn undirected_key(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Build an approximate minimal subgraph connecting `terminals` in `graph`.
///
/// Terminals absent from the graph (and repeats) are dropped first. No valid
/// terminal yields an empty graph; a single valid terminal yields that node
/// alone. Node order in the output follows the input graph.
pub fn steiner_subgraph(graph: &TripleGraph, terminals: &[String]) -> TripleGraph {
    let mut seen = HashSet::new();
    let valid: Vec<NodeIndex> = terminals
        .iter()
        .filter_map(|t| graph.index_of(t))
        .filter(|idx| seen.insert(*idx))
        .collect();

    let missing = terminals.iter().filter(|t| !graph.has_node(t)).count();
    if missing > 0 {
        debug!(
            missing,
            valid = valid.len(),
            "Dropping terminals absent from the graph"
        );
    }

    let mut result = TripleGraph::new(graph.mode());
    match valid.len() {
        0 => return result,
        1 => {
            result.add_node(graph.id_of(valid[0]));
            return result;
        }
        _ => {}
    }

    let inner = graph.inner();
    let adjacency: Vec<Vec<NodeIndex>> = inner
        .node_indices()
        .map(|idx| graph.undirected_neighbors(idx))
        .collect();

    let trees: Vec<BfsTree> = valid
        .par_iter()
        .map(|&terminal| BfsTree::search(&adjacency, terminal))
        .collect();

    // Metric closure restricted to terminal pairs that can reach each other.
    let mut closure: Vec<(usize, usize, usize)> = Vec::new();
    for i in 0..valid.len() {
        for j in (i + 1)..valid.len() {
            if let Some(d) = trees[i].distance(valid[j]) {
                closure.push((d, i, j));
            }
        }
    }
    closure.sort_unstable();

    let mut forest = UnionFind::<usize>::new(valid.len());
    let mut kept_nodes: HashSet<NodeIndex> = valid.iter().copied().collect();
    let mut kept_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

    for (_, i, j) in closure {
        if !forest.union(i, j) {
            continue;
        }
        let path = trees[i].path_to(valid[j]);
        kept_nodes.extend(path.iter().copied());
        for pair in path.windows(2) {
            kept_edges.insert(undirected_key(pair[0], pair[1]));
        }
    }

    for idx in inner.node_indices() {
        if kept_nodes.contains(&idx) {
            result.add_node(graph.id_of(idx));
        }
    }
    for edge in inner.edge_references() {
        if kept_edges.contains(&undirected_key(edge.source(), edge.target())) {
            result.push_edge(
                graph.id_of(edge.source()),
                graph.id_of(edge.target()),
                edge.weight(),
            );
        }
    }

    debug!(
        terminals = valid.len(),
        nodes = result.node_count(),
        edges = result.edge_count(),
        "Steiner subgraph built"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::connected_components;
    use crate::graph::{EdgeMode, GraphBuilder};
    use crate::triple::Triple;

    fn terms(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn build(triples: &[(&str, &str, &str)]) -> TripleGraph {
        let triples: Vec<Triple> = triples
            .iter()
            .map(|(s, p, o)| Triple::new(*s, *p, *o))
            .collect();
        GraphBuilder::default().build(&triples)
    }

    fn sorted_nodes(graph: &TripleGraph) -> Vec<String> {
        let mut nodes: Vec<String> = graph.nodes().map(String::from).collect();
        nodes.sort();
        nodes
    }

    #[test]
    fn test_path_through_intermediate() {
        let graph = build(&[("A", "p1", "B"), ("B", "p2", "C"), ("A", "p3", "D")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "C"]));

        assert_eq!(sorted_nodes(&steiner), vec!["A", "B", "C"]);
        assert_eq!(steiner.edge_count(), 2);
        assert_eq!(steiner.edge_labels("A", "B"), vec!["p1"]);
        assert_eq!(steiner.edge_labels("B", "C"), vec!["p2"]);
        assert!(!steiner.has_node("D"));
    }

    #[test]
    fn test_empty_terminals() {
        let graph = build(&[("A", "p", "B")]);
        let steiner = steiner_subgraph(&graph, &[]);
        assert_eq!(steiner.node_count(), 0);
        assert_eq!(steiner.edge_count(), 0);

        let steiner = steiner_subgraph(&graph, &terms(&["X", "Y"]));
        assert_eq!(steiner.node_count(), 0);
        assert_eq!(steiner.edge_count(), 0);
    }

    #[test]
    fn test_single_terminal() {
        let graph = build(&[("A", "p", "B"), ("B", "q", "C")]);
        let steiner = steiner_subgraph(&graph, &terms(&["B", "missing"]));
        assert_eq!(sorted_nodes(&steiner), vec!["B"]);
        assert_eq!(steiner.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_terminals_count_once() {
        let graph = build(&[("A", "p", "B")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "A"]));
        assert_eq!(steiner.node_count(), 1);
    }

    #[test]
    fn test_direction_ignored_for_connectivity() {
        // A <- B -> C: no directed path from A to C, but undirected one exists
        let graph = build(&[("B", "p", "A"), ("B", "q", "C")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "C"]));
        assert_eq!(sorted_nodes(&steiner), vec!["A", "B", "C"]);
        assert!(steiner.has_edge("B", "A"));
        assert!(steiner.has_edge("B", "C"));
        assert!(!steiner.has_edge("A", "B"));
    }

    #[test]
    fn test_both_directions_reattached() {
        let graph = build(&[("A", "knows", "B"), ("B", "knownBy", "A")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "B"]));
        assert_eq!(steiner.edge_labels("A", "B"), vec!["knows"]);
        assert_eq!(steiner.edge_labels("B", "A"), vec!["knownBy"]);
    }

    #[test]
    fn test_parallel_edges_reattached_in_multigraph() {
        let graph = build(&[("A", "p1", "B"), ("A", "p2", "B")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "B"]));
        assert_eq!(steiner.edge_labels("A", "B"), vec!["p1", "p2"]);

        let lww = GraphBuilder::new(EdgeMode::LastWriteWins)
            .build(&[Triple::new("A", "p1", "B"), Triple::new("A", "p2", "B")]);
        let steiner = steiner_subgraph(&lww, &terms(&["A", "B"]));
        assert_eq!(steiner.edge_labels("A", "B"), vec!["p2"]);
    }

    #[test]
    fn test_prefers_short_connection() {
        // Long way round A-X-Y-Z-C versus hub A-H-C
        let graph = build(&[
            ("A", "p", "X"),
            ("X", "p", "Y"),
            ("Y", "p", "Z"),
            ("Z", "p", "C"),
            ("A", "q", "H"),
            ("H", "q", "C"),
        ]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "C"]));
        assert_eq!(sorted_nodes(&steiner), vec!["A", "C", "H"]);
    }

    #[test]
    fn test_shared_hub_for_many_terminals() {
        let graph = build(&[
            ("T1", "p", "H"),
            ("T2", "p", "H"),
            ("T3", "p", "H"),
            ("T1", "q", "N1"),
            ("N1", "q", "N2"),
            ("N2", "q", "T2"),
        ]);
        let steiner = steiner_subgraph(&graph, &terms(&["T1", "T2", "T3"]));
        assert_eq!(sorted_nodes(&steiner), vec!["H", "T1", "T2", "T3"]);
        assert_eq!(steiner.edge_count(), 3);
    }

    #[test]
    fn test_disconnected_terminals_give_forest() {
        let graph = build(&[("A", "p", "B"), ("B", "p", "C"), ("X", "q", "Y")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "C", "X", "Y"]));
        assert_eq!(sorted_nodes(&steiner), vec!["A", "B", "C", "X", "Y"]);
        assert_eq!(connected_components(&steiner).len(), 2);
    }

    #[test]
    fn test_isolated_terminal_kept_in_forest() {
        let graph = build(&[("A", "p", "B"), ("X", "q", "Y")]);
        let steiner = steiner_subgraph(&graph, &terms(&["A", "B", "X"]));
        assert_eq!(sorted_nodes(&steiner), vec!["A", "B", "X"]);
        assert_eq!(steiner.edge_count(), 1);
    }

    #[test]
    fn test_connected_and_spans_terminals_on_grid() {
        // 4x4 grid, terminals on the corners
        let mut triples = Vec::new();
        for r in 0..4 {
            for c in 0..4 {
                let id = format!("n{}{}", r, c);
                if c + 1 < 4 {
                    triples.push(Triple::new(&id, "right", format!("n{}{}", r, c + 1)));
                }
                if r + 1 < 4 {
                    triples.push(Triple::new(&id, "down", format!("n{}{}", r + 1, c)));
                }
            }
        }
        let graph = GraphBuilder::default().build(&triples);
        let terminals = terms(&["n00", "n03", "n30", "n33"]);
        let steiner = steiner_subgraph(&graph, &terminals);

        for t in &terminals {
            assert!(steiner.has_node(t), "missing terminal {}", t);
        }
        assert_eq!(connected_components(&steiner).len(), 1);
        // Optimal tree has 9 edges; 2-approximation bound is 18
        assert!(steiner.edge_count() <= 18);
    }
}
