use betwixt_core::{
    Betweenness, BetweennessConfig, DirectionPolicy, Graph, GraphKind, sample_sources,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Tier {
    name: &'static str,
    vertices: usize,
    avg_degree: usize,
    sources: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        vertices: 1_000,
        avg_degree: 8,
        sources: 32,
    },
    Tier {
        name: "medium",
        vertices: 10_000,
        avg_degree: 8,
        sources: 64,
    },
    Tier {
        name: "large",
        vertices: 50_000,
        avg_degree: 16,
        sources: 64,
    },
];

/// Uniform random graph with `n * avg_degree / 2` undirected edges.
fn random_graph(n: usize, avg_degree: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let edges: Vec<(usize, usize)> = (0..n * avg_degree / 2)
        .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n)))
        .collect();
    Graph::from_edges(n, edges, GraphKind::Undirected).expect("build graph")
}

fn bench_centrality(c: &mut Criterion) {
    let mut group = c.benchmark_group("centrality.tiered");
    group.sample_size(10);

    for tier in &TIERS {
        let graph = random_graph(tier.vertices, tier.avg_degree, 0xBE7_u64 + tier.vertices as u64);
        let sources = sample_sources(tier.vertices, tier.sources, 42);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));

        for direction in [
            DirectionPolicy::Adaptive,
            DirectionPolicy::PushOnly,
            DirectionPolicy::PullOnly,
        ] {
            let engine = Betweenness::new(BetweennessConfig {
                direction,
                ..BetweennessConfig::default()
            });
            group.bench_with_input(
                BenchmarkId::new(direction.to_string(), tier.name),
                &sources,
                |b, sources| b.iter(|| black_box(engine.run(&graph, sources).expect("run"))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_centrality);
criterion_main!(benches);
