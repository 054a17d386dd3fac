//! evigraph core - in-memory graph algorithms for evidence subgraphs.
//!
//! This crate holds everything that runs synchronously once the neighborhoods
//! of a record's interesting entities have been fetched:
//!
//! - **Triples**: the `(subject, predicate, object)` interchange unit
//! - **Predicate filtering**: case-insensitive substring blocklist
//! - **Graph building**: directed, edge-labelled graph backed by petgraph
//! - **Steiner subgraphs**: metric-closure approximation over the undirected projection
//! - **Component reduction**: largest undirected connected component
//! - **Serialization**: edges back to triples
//! - **Prefixes**: compact/expand URIs for queries and display
//!
//! # Example
//!
//! ```
//! use evigraph_core::{largest_component, steiner_subgraph, to_triples, GraphBuilder, Triple};
//!
//! let triples = vec![
//!     Triple::new("A", "p1", "B"),
//!     Triple::new("B", "p2", "C"),
//!     Triple::new("A", "p3", "D"),
//! ];
//! let graph = GraphBuilder::default().build(&triples);
//! let steiner = steiner_subgraph(&graph, &["A".to_string(), "C".to_string()]);
//! assert_eq!(steiner.node_count(), 3);
//!
//! let largest = largest_component(&steiner).unwrap();
//! assert_eq!(to_triples(&largest).len(), 2);
//! ```

pub mod components;
pub mod error;
pub mod filter;
pub mod graph;
pub mod serialize;
pub mod steiner;
pub mod triple;
pub mod uri;

pub use components::{connected_components, largest_component};
pub use error::{GraphError, Result};
pub use filter::{filter_triples, PredicateBlocklist, DEFAULT_EXCLUDED_PREDICATES};
pub use graph::{EdgeMode, GraphBuilder, TripleGraph};
pub use serialize::to_triples;
pub use steiner::steiner_subgraph;
pub use triple::Triple;
pub use uri::{local_name, prune_triple, PrefixMap};

/// Get the version of evigraph-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
