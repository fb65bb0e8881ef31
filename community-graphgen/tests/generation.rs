//! End-to-end properties of generated graphs.

use community_graphgen::io::json::{GraphDocument, read_json, write_json};
use community_graphgen::{
    CommunityGraphGenerator, GeneratedGraph, GeneratorConfig, GeneratorError, PopularityModel,
    generate, normalize, partition, run_ensemble,
};
use proptest::prelude::*;
use rstest::rstest;

fn flat(config: GeneratorConfig) -> GeneratorConfig {
    config.with_popularity(PopularityModel::default(), 0.0, false)
}

fn edge_pairs(graph: &GeneratedGraph) -> Vec<(u32, u32)> {
    graph.edges.to_pairs()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(42)]
#[case(9_001)]
fn saturated_communities_are_cliques(#[case] seed: u64) {
    let config = flat(GeneratorConfig::new(6, 2))
        .with_probabilities(1.0, 0.0)
        .with_seed(Some(seed));
    let graph = generate(config).expect("valid config");
    assert_eq!(
        edge_pairs(&graph),
        vec![(1, 2), (1, 3), (2, 3), (4, 5), (4, 6), (5, 6)]
    );
    assert_eq!(graph.stats.edges.intra, 6);
    assert_eq!(graph.stats.edges.inter, 0);
}

#[test]
fn zero_probabilities_yield_no_edges() {
    let config = GeneratorConfig::new(5, 2)
        .with_probabilities(0.0, 0.0)
        .with_seed(Some(3));
    let graph = generate(config).expect("valid config");
    assert!(graph.edges.is_empty());
    assert_eq!(graph.partition.member_lists(), vec![vec![1, 2, 3], vec![4, 5]]);
    assert_eq!(graph.popularity.len(), 5);
}

#[test]
fn single_community_has_no_inter_edges() {
    let config = GeneratorConfig::new(12, 1)
        .with_probabilities(0.5, 1.0)
        .with_seed(Some(8));
    let graph = generate(config).expect("valid config");
    assert_eq!(graph.stats.edges.inter, 0);
}

#[test]
fn more_communities_than_nodes_leaves_singletons() {
    let config = flat(GeneratorConfig::new(3, 5))
        .with_probabilities(1.0, 1.0)
        .with_seed(Some(5));
    let graph = generate(config).expect("valid config");
    assert_eq!(graph.partition.len(), 3);
    assert_eq!(graph.stats.edges.intra, 0);
    assert_eq!(edge_pairs(&graph), vec![(1, 2), (1, 3), (2, 3)]);
}

#[test]
fn fixed_seed_runs_are_bit_identical() {
    let config = GeneratorConfig::new(120, 4)
        .with_probabilities(0.2, 0.01)
        .with_popularity(PopularityModel::Pareto { alpha: 1.5 }, 0.8, true)
        .with_seed(Some(2024));
    let first = generate(config.clone()).expect("valid config");
    let second = generate(config).expect("valid config");

    assert_eq!(edge_pairs(&first), edge_pairs(&second));
    let bits = |graph: &GeneratedGraph| {
        graph
            .popularity
            .as_slice()
            .iter()
            .map(|score| score.to_bits())
            .collect::<Vec<_>>()
    };
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(first, second);
}

#[test]
fn different_seeds_usually_differ() {
    let base = GeneratorConfig::new(80, 4).with_probabilities(0.3, 0.05);
    let a = generate(base.clone().with_seed(Some(1))).expect("valid config");
    let b = generate(base.with_seed(Some(2))).expect("valid config");
    assert_ne!(edge_pairs(&a), edge_pairs(&b));
}

#[rstest]
#[case(PopularityModel::Exponential { rate: 1.0 })]
#[case(PopularityModel::Pareto { alpha: 2.0 })]
#[case(PopularityModel::Normal { mu: 1.0, sigma: 0.5 })]
#[case(PopularityModel::Uniform { a: 0.0, b: 1.0 })]
fn edges_are_canonical_and_within_range(#[case] model: PopularityModel) {
    let config = GeneratorConfig::new(90, 3)
        .with_probabilities(0.4, 0.05)
        .with_popularity(model, 1.0, true)
        .with_seed(Some(11));
    let graph = generate(config).expect("valid config");
    for edge in &graph.edges {
        assert!(edge.u() < edge.v(), "{edge:?} is not canonical");
        assert!(edge.u() >= 1 && edge.v() <= 90);
    }
    assert_eq!(graph.stats.edges.total(), graph.edge_count());
}

#[test]
fn intra_and_inter_counts_match_community_membership() {
    let config = GeneratorConfig::new(50, 5)
        .with_probabilities(0.5, 0.2)
        .with_seed(Some(99));
    let graph = generate(config).expect("valid config");
    let community = |node| {
        graph
            .partition
            .community_of(node)
            .map(|community| community.index())
            .expect("every node has a community")
    };
    let intra = graph
        .edges
        .iter()
        .filter(|edge| community(edge.u()) == community(edge.v()))
        .count();
    assert_eq!(intra, graph.stats.edges.intra);
    assert_eq!(graph.edge_count() - intra, graph.stats.edges.inter);
}

#[test]
fn higher_intra_probability_produces_more_intra_edges() {
    let sparse = flat(GeneratorConfig::new(60, 3)).with_probabilities(0.05, 0.0);
    let dense = flat(GeneratorConfig::new(60, 3)).with_probabilities(0.2, 0.0);
    let sparse = run_ensemble(&sparse, 0..32).expect("valid config");
    let dense = run_ensemble(&dense, 0..32).expect("valid config");

    // 3 communities of 20 nodes give 570 intra-community pairs.
    assert!(sparse.mean_intra_edges > 15.0 && sparse.mean_intra_edges < 45.0);
    assert!(dense.mean_intra_edges > 90.0 && dense.mean_intra_edges < 140.0);
    assert!(dense.mean_intra_edges > sparse.mean_intra_edges);
    assert_eq!(dense.mean_inter_edges, 0.0);
}

#[rstest]
#[case(PopularityModel::Uniform { a: 0.0, b: 1.0 }, PopularityModel::Uniform { a: 2.0, b: 5.0 })]
#[case(PopularityModel::Pareto { alpha: 2.0 }, PopularityModel::Pareto { alpha: 3.0 })]
fn zero_influence_ignores_popularity(
    #[case] left: PopularityModel,
    #[case] right: PopularityModel,
) {
    let run = |model| {
        let config = GeneratorConfig::new(40, 4)
            .with_probabilities(0.3, 0.05)
            .with_popularity(model, 0.0, true)
            .with_seed(Some(77));
        generate(config).expect("valid config")
    };
    assert_eq!(edge_pairs(&run(left)), edge_pairs(&run(right)));
}

#[rstest]
#[case(PopularityModel::Pareto { alpha: 0.001 })]
#[case(PopularityModel::Exponential { rate: 1e-300 })]
fn heavy_tailed_popularity_stays_finite_and_neutral(#[case] model: PopularityModel) {
    let config = GeneratorConfig::new(6, 2)
        .with_probabilities(1.0, 0.0)
        .with_popularity(model, 0.0, false)
        .with_seed(Some(42));
    let graph = generate(config).expect("valid config");

    assert_eq!(graph.edge_count(), 6);
    assert!(
        graph
            .popularity
            .as_slice()
            .iter()
            .all(|score| score.is_finite() && *score > 0.0),
        "popularity {:?}",
        graph.popularity.as_slice()
    );

    let mut buffer = Vec::new();
    write_json(&graph, &mut buffer).expect("json written");
    let document = read_json(buffer.as_slice()).expect("json read back");
    assert_eq!(document, GraphDocument::from_graph(&graph));
}

#[rstest]
#[case(GeneratorConfig::new(0, 2), "INVALID_NODE_COUNT")]
#[case(GeneratorConfig::new(10, 0), "INVALID_COMMUNITY_COUNT")]
#[case(
    GeneratorConfig::new(10, 2).with_popularity(PopularityModel::Normal { mu: 1.0, sigma: -1.0 }, 0.5, false),
    "INVALID_DISTRIBUTION_PARAMETER"
)]
#[case(
    GeneratorConfig::new(10, 2).with_popularity(PopularityModel::Uniform { a: 3.0, b: 1.0 }, 0.5, false),
    "INVALID_DISTRIBUTION_PARAMETER"
)]
fn invalid_configs_are_rejected(#[case] config: GeneratorConfig, #[case] code: &str) {
    let err = CommunityGraphGenerator::new(config).expect_err("config must be rejected");
    assert_eq!(err.code(), code);
}

#[test]
fn zero_communities_are_not_clamped_up() {
    assert_eq!(
        generate(GeneratorConfig::new(10, 0)).map(|graph| graph.edge_count()),
        Err(GeneratorError::InvalidCommunityCount { got: 0 })
    );
}

proptest! {
    #[test]
    fn partitions_cover_nodes_evenly(n in 1_u32..500, k in 1_u32..60) {
        let parts = partition(n, k).expect("positive inputs");
        let lists = parts.member_lists();
        prop_assert_eq!(lists.len() as u32, k);

        let flattened: Vec<u32> = lists.iter().flatten().copied().collect();
        let expected: Vec<u32> = (1..=n).collect();
        prop_assert_eq!(flattened, expected);

        let sizes: Vec<usize> = lists.iter().map(Vec::len).collect();
        let largest = sizes.iter().copied().max().unwrap_or(0);
        let smallest = sizes.iter().copied().min().unwrap_or(0);
        prop_assert!(largest - smallest <= 1);
        prop_assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn normalised_popularity_has_unit_community_mean(
        raw in prop::collection::vec(0.01_f64..100.0, 1..200),
        k in 1_u32..12,
    ) {
        let parts = partition(raw.len() as u32, k).expect("positive inputs");
        let popularity = normalize(&raw, &parts);
        for community in parts.communities().iter().filter(|community| !community.is_empty()) {
            let total: f64 = community
                .members()
                .map(|node| popularity.get(node).expect("node has a score"))
                .sum();
            let mean = total / community.len() as f64;
            prop_assert!((mean - 1.0).abs() < 1e-9, "mean {mean}");
        }
    }
}
