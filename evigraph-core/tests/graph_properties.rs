//! Property-based tests for the graph algorithms.

use evigraph_core::{
    connected_components, filter_triples, largest_component, steiner_subgraph, to_triples,
    EdgeMode, GraphBuilder, PredicateBlocklist, Triple,
};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies
// ============================================================================

fn triple_strategy() -> impl Strategy<Value = Triple> {
    (0u8..12, 0u8..5, 0u8..12).prop_map(|(s, p, o)| {
        let predicate = match p {
            0 => "schema:knows",
            1 => "rdfs:label",
            2 => "schema:memberOf",
            3 => "schema:birthPlace",
            _ => "schema:url",
        };
        Triple::new(format!("n{}", s), predicate, format!("n{}", o))
    })
}

fn triples_strategy() -> impl Strategy<Value = Vec<Triple>> {
    prop::collection::vec(triple_strategy(), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn steiner_is_connected_and_spans_terminals(
        triples in triples_strategy(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
    ) {
        let graph = GraphBuilder::default().build(&triples);
        let connected = largest_component(&graph).unwrap();
        let nodes: Vec<String> = connected.nodes().map(String::from).collect();
        let terminals: Vec<String> = picks.iter().map(|i| i.get(&nodes).clone()).collect();

        let steiner = steiner_subgraph(&connected, &terminals);
        for t in &terminals {
            prop_assert!(steiner.has_node(t));
        }
        prop_assert_eq!(connected_components(&steiner).len(), 1);
    }

    #[test]
    fn largest_component_dominates(triples in triples_strategy()) {
        let graph = GraphBuilder::default().build(&triples);
        let largest = largest_component(&graph).unwrap();
        for component in connected_components(&graph) {
            prop_assert!(largest.node_count() >= component.len());
        }
    }

    #[test]
    fn filter_is_idempotent(triples in triples_strategy()) {
        let blocklist = PredicateBlocklist::default();
        let once = filter_triples(&triples, &blocklist);
        let twice = filter_triples(&once, &blocklist);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn serialize_is_permutation_without_repeated_pairs(triples in triples_strategy()) {
        let mut seen = HashSet::new();
        let mut unique: Vec<Triple> = triples
            .into_iter()
            .filter(|t| seen.insert((t.subject.clone(), t.object.clone())))
            .collect();

        for mode in [EdgeMode::Multigraph, EdgeMode::LastWriteWins] {
            let mut out = to_triples(&GraphBuilder::new(mode).build(&unique));
            out.sort();
            unique.sort();
            prop_assert_eq!(&out, &unique);
        }
    }
}
