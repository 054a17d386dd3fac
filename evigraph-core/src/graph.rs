//! Directed, edge-labelled triple graph powered by petgraph.
//!
//! Nodes are opaque string identifiers (usually URIs) and every edge carries
//! the predicate of the triple it came from.
//!
//! # Edge modes
//!
//! - [`EdgeMode::Multigraph`] (default): two triples on the same ordered pair
//!   with different predicates become parallel edges. An exact duplicate
//!   triple is stored once, since neighborhoods of adjacent entities overlap.
//! - [`EdgeMode::LastWriteWins`]: one label per ordered pair; a later triple
//!   on the same pair overwrites the earlier predicate. This loses
//!   information and exists for parity with older artifacts.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::triple::Triple;

/// How repeated `(subject, object)` pairs are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    #[default]
    Multigraph,
    LastWriteWins,
}

impl std::str::FromStr for EdgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multigraph" => Ok(EdgeMode::Multigraph),
            "last_write_wins" | "lww" => Ok(EdgeMode::LastWriteWins),
            _ => Err(format!("Unknown edge mode: '{}'", s)),
        }
    }
}

/// In-memory directed graph of string nodes and predicate-labelled edges.
#[derive(Debug, Clone, Default)]
pub struct TripleGraph {
    graph: DiGraph<String, String>,
    node_map: HashMap<String, NodeIndex>,
    mode: EdgeMode,
}

impl TripleGraph {
    /// Create an empty graph with the given edge mode.
    pub fn new(mode: EdgeMode) -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            mode,
        }
    }

    /// Add a node if it is not present yet, returning its index.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    /// Add a directed, labelled edge according to the graph's edge mode.
    ///
    /// Both endpoints are added to the node set.
    pub fn add_edge(&mut self, subject: &str, object: &str, predicate: &str) {
        let s = self.add_node(subject);
        let o = self.add_node(object);

        match self.mode {
            EdgeMode::LastWriteWins => match self.graph.find_edge(s, o) {
                Some(edge) => self.graph[edge] = predicate.to_string(),
                None => {
                    self.graph.add_edge(s, o, predicate.to_string());
                }
            },
            EdgeMode::Multigraph => {
                let duplicate = self
                    .graph
                    .edges_connecting(s, o)
                    .any(|e| e.weight() == predicate);
                if !duplicate {
                    self.graph.add_edge(s, o, predicate.to_string());
                }
            }
        }
    }

    /// Add a triple as an edge. Malformed triples are skipped with a warning.
    ///
    /// Returns `false` when the triple was skipped.
    pub fn add_triple(&mut self, triple: &Triple) -> bool {
        if !triple.is_well_formed() {
            warn!(triple = %triple, "Skipping malformed triple during graph build");
            return false;
        }
        self.add_edge(&triple.subject, &triple.object, &triple.predicate);
        true
    }

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if a node exists in the graph.
    pub fn has_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Check if at least one `subject -> object` edge exists.
    pub fn has_edge(&self, subject: &str, object: &str) -> bool {
        match (self.node_map.get(subject), self.node_map.get(object)) {
            (Some(&s), Some(&o)) => self.graph.find_edge(s, o).is_some(),
            _ => false,
        }
    }

    /// All predicates on `subject -> object`, in insertion order.
    pub fn edge_labels(&self, subject: &str, object: &str) -> Vec<&str> {
        let (Some(&s), Some(&o)) = (self.node_map.get(subject), self.node_map.get(object)) else {
            return vec![];
        };
        let mut edges: Vec<(EdgeIndex, &str)> = self
            .graph
            .edges_connecting(s, o)
            .map(|e| (e.id(), e.weight().as_str()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, label)| label).collect()
    }

    /// Node identifiers in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|n| n.as_str())
    }

    /// Edges as `(source, predicate, target)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].as_str(),
                e.weight().as_str(),
                self.graph[e.target()].as_str(),
            )
        })
    }

    /// The edge mode this graph was built with.
    pub fn mode(&self) -> EdgeMode {
        self.mode
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub(crate) fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, String> {
        &self.graph
    }

    /// Neighbors ignoring direction, deduplicated and without self-loops.
    ///
    /// This is the adjacency of the undirected projection: `u - v` exists iff
    /// an edge runs in either direction.
    pub(crate) fn undirected_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self
            .graph
            .neighbors_undirected(idx)
            .filter(|&n| n != idx)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Induced subgraph on `keep`, copying every original directed edge whose
    /// endpoints are both kept. Nodes keep their relative insertion order.
    pub(crate) fn induced(&self, keep: &HashSet<NodeIndex>) -> TripleGraph {
        let mut sub = TripleGraph::new(self.mode);
        for idx in self.graph.node_indices() {
            if keep.contains(&idx) {
                sub.add_node(&self.graph[idx]);
            }
        }
        for edge in self.graph.edge_references() {
            if keep.contains(&edge.source()) && keep.contains(&edge.target()) {
                sub.push_edge(&self.graph[edge.source()], &self.graph[edge.target()], edge.weight());
            }
        }
        sub
    }

    /// Append an edge without applying edge-mode deduplication.
    ///
    /// Used when copying edges out of a graph that already satisfies its mode.
    pub(crate) fn push_edge(&mut self, subject: &str, object: &str, predicate: &str) {
        let s = self.add_node(subject);
        let o = self.add_node(object);
        self.graph.add_edge(s, o, predicate.to_string());
    }
}

/// Builds a [`TripleGraph`] from a triple list.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    mode: EdgeMode,
}

impl GraphBuilder {
    pub fn new(mode: EdgeMode) -> Self {
        Self { mode }
    }

    /// Add every triple as `subject -> object` labelled with its predicate.
    ///
    /// Malformed triples are skipped with a warning. With
    /// [`EdgeMode::LastWriteWins`] the last triple for a pair in input order
    /// decides the label.
    pub fn build(&self, triples: &[Triple]) -> TripleGraph {
        let mut graph = TripleGraph::new(self.mode);
        for triple in triples {
            graph.add_triple(triple);
        }
        graph
    }
}
