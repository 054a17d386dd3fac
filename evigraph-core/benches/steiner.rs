//! Benchmark for Steiner subgraph construction on record-sized graphs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evigraph_core::{largest_component, steiner_subgraph, GraphBuilder, Triple};

/// Star-of-chains graph: `hubs` hubs, each with `fanout` chains of length 3,
/// hubs linked in a ring. Roughly the shape of merged one-hop neighborhoods.
fn neighborhood_graph(hubs: usize, fanout: usize) -> Vec<Triple> {
    let mut triples = Vec::new();
    for h in 0..hubs {
        let hub = format!("hub{}", h);
        triples.push(Triple::new(&hub, "linksTo", format!("hub{}", (h + 1) % hubs)));
        for f in 0..fanout {
            let mut prev = hub.clone();
            for depth in 0..3 {
                let node = format!("n{}_{}_{}", h, f, depth);
                triples.push(Triple::new(&prev, "relatedTo", &node));
                prev = node;
            }
        }
    }
    triples
}

fn bench_steiner(c: &mut Criterion) {
    let graph = GraphBuilder::default().build(&neighborhood_graph(20, 100));
    let terminals: Vec<String> = (0..20).map(|h| format!("n{}_0_2", h)).collect();

    c.bench_function("steiner_20_terminals_6k_nodes", |b| {
        b.iter(|| black_box(steiner_subgraph(&graph, black_box(&terminals))))
    });
}

fn bench_largest_component(c: &mut Criterion) {
    let graph = GraphBuilder::default().build(&neighborhood_graph(20, 100));

    c.bench_function("largest_component_6k_nodes", |b| {
        b.iter(|| black_box(largest_component(&graph)))
    });
}

criterion_group!(benches, bench_steiner, bench_largest_component);
criterion_main!(benches);
