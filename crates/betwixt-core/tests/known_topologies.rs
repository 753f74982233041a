//! Known-topology regression tests for betweenness centrality.
//!
//! Expected values are worked out by hand. Every ordered (source, target)
//! pair is counted, so on undirected graphs the exact scores are twice the
//! textbook unordered-pair values.

use betwixt_core::{
    Betweenness, BetweennessConfig, DirectionPolicy, ErrorCode, Graph, GraphKind, all_sources,
    compute_betweenness_centrality,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn undirected(n: usize, edges: &[(usize, usize)]) -> Graph {
    Graph::from_edges(n, edges.iter().copied(), GraphKind::Undirected).expect("build graph")
}

fn directed(n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut g =
        Graph::from_edges(n, edges.iter().copied(), GraphKind::Directed).expect("build graph");
    g.cache_transpose().expect("cache transpose");
    g
}

fn exact(g: &Graph) -> Vec<f64> {
    compute_betweenness_centrality(&all_sources(g.vertex_count()), g).expect("centrality")
}

fn assert_scores(got: &[f64], expected: &[f64]) {
    assert_eq!(got.len(), expected.len(), "length mismatch: {got:?}");
    for (v, (g, e)) in got.iter().zip(expected).enumerate() {
        assert!(
            (g - e).abs() < 1e-10,
            "vertex {v}: expected {e}, got {g} (all: {got:?})"
        );
    }
}

// ---------------------------------------------------------------------------
// Undirected
// ---------------------------------------------------------------------------

#[test]
fn path_of_five() {
    // 0 - 1 - 2 - 3 - 4
    let g = undirected(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
    assert_scores(&exact(&g), &[0.0, 6.0, 8.0, 6.0, 0.0]);
}

#[test]
fn star_hub_carries_every_leaf_pair() {
    let leaves = 4;
    let edges: Vec<_> = (1..=leaves).map(|leaf| (0, leaf)).collect();
    let g = undirected(leaves + 1, &edges);
    let scores = exact(&g);

    assert_scores(&scores, &[12.0, 0.0, 0.0, 0.0, 0.0]);

    // Halved, the hub matches the textbook (n - 1)(n - 2) / 2.
    let n = (leaves + 1) as f64;
    assert!((scores[0] / 2.0 - (n - 1.0) * (n - 2.0) / 2.0).abs() < 1e-10);
}

#[test]
fn four_cycle_splits_opposite_pairs() {
    let g = undirected(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
    assert_scores(&exact(&g), &[1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn five_cycle_is_uniform() {
    let g = undirected(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
    assert_scores(&exact(&g), &[2.0; 5]);
}

#[test]
fn disconnected_components_do_not_interact() {
    // 0 - 1 - 2, 3 - 4, 5 isolated
    let g = undirected(6, &[(0, 1), (1, 2), (3, 4)]);
    assert_scores(&exact(&g), &[0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn self_loops_are_ignored() {
    let plain = undirected(3, &[(0, 1), (1, 2)]);
    let looped = undirected(3, &[(0, 0), (0, 1), (1, 1), (1, 2)]);
    assert_scores(&exact(&looped), &exact(&plain));
}

#[test]
fn isolated_sources_contribute_nothing() {
    let g = undirected(3, &[(1, 2)]);
    let scores = compute_betweenness_centrality(&[0], &g).expect("centrality");
    assert_scores(&scores, &[0.0, 0.0, 0.0]);
}

#[test]
fn single_vertex_without_edges() {
    let g = undirected(1, &[]);
    let scores = compute_betweenness_centrality(&[0], &g).expect("centrality");
    assert_scores(&scores, &[0.0]);
}

// ---------------------------------------------------------------------------
// Directed
// ---------------------------------------------------------------------------

#[test]
fn directed_chain() {
    let g = directed(3, &[(0, 1), (1, 2)]);
    assert_scores(&exact(&g), &[0.0, 1.0, 0.0]);
}

#[test]
fn directed_diamond_splits_paths() {
    let g = directed(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    assert_scores(&exact(&g), &[0.0, 0.5, 0.5, 0.0]);
}

#[test]
fn directed_funnel_counts_each_source() {
    // 0 -> 1 -> 2 and 3 -> 1
    let g = directed(4, &[(0, 1), (1, 2), (3, 1)]);
    assert_scores(&exact(&g), &[0.0, 2.0, 0.0, 0.0]);
}

#[test]
fn symmetric_directed_graph_needs_no_transpose() {
    let mut g = Graph::from_edges(
        3,
        [(0, 1), (1, 0), (1, 2), (2, 1)],
        GraphKind::Directed,
    )
    .expect("build graph");
    assert!(g.cache_symmetry().expect("symmetry"));
    assert_scores(&exact(&g), &[0.0, 2.0, 0.0]);
}

// ---------------------------------------------------------------------------
// Batches and configuration
// ---------------------------------------------------------------------------

#[test]
fn single_source_on_star() {
    let g = undirected(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
    let scores = compute_betweenness_centrality(&[1], &g).expect("centrality");
    assert_scores(&scores, &[3.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn batches_add_up_to_exact() {
    let g = undirected(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (1, 4)]);
    let first = compute_betweenness_centrality(&[0, 3, 5], &g).expect("first batch");
    let second = compute_betweenness_centrality(&[4, 1, 2], &g).expect("second batch");
    let summed: Vec<f64> = first.iter().zip(&second).map(|(a, b)| a + b).collect();
    assert_scores(&summed, &exact(&g));
}

#[test]
fn direction_policy_is_invisible_in_scores() {
    let g = undirected(
        7,
        &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (4, 5), (4, 6), (5, 6)],
    );
    let sources = all_sources(7);
    let run = |direction| {
        Betweenness::new(BetweennessConfig {
            direction,
            ..BetweennessConfig::default()
        })
        .run(&g, &sources)
        .expect("run")
    };
    let adaptive = run(DirectionPolicy::Adaptive);
    let push = run(DirectionPolicy::PushOnly);
    let pull = run(DirectionPolicy::PullOnly);
    assert_eq!(adaptive.scores, push.scores);
    assert_eq!(adaptive.scores, pull.scores);
    assert_eq!(adaptive.depth, 4);
    assert_eq!(adaptive.forward.len(), adaptive.depth);
    assert_eq!(adaptive.backward.len(), adaptive.depth - 1);
}

#[test]
fn repeated_runs_are_identical() {
    let g = undirected(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4), (1, 3)]);
    let first = exact(&g);
    for _ in 0..5 {
        assert_eq!(exact(&g), first);
    }
}

#[test]
fn errors_carry_stable_codes() {
    let g = directed(3, &[(0, 1)]);
    let err = compute_betweenness_centrality(&[0, 0], &g).expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.code().code(), "E1001");

    let bare = Graph::from_edges(3, [(0, 1)], GraphKind::Directed).expect("build graph");
    let err = compute_betweenness_centrality(&[0], &bare).expect_err("no transpose");
    assert_eq!(err.code().code(), "E2001");
}
