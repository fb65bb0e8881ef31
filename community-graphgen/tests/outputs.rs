//! Every output format describes the same graph.

use community_graphgen::io::{csr, json, text};
use community_graphgen::{GeneratorConfig, generate};
use tempfile::TempDir;

#[test]
fn formats_agree_on_adjacency() {
    let graph = generate(
        GeneratorConfig::new(40, 4)
            .with_probabilities(0.4, 0.05)
            .with_seed(Some(13)),
    )
    .expect("valid config");
    let dir = TempDir::new().expect("temp dir");
    let nested = dir.path().join("out").join("nested");

    let text_path = nested.join("graph.txt");
    let json_path = nested.join("graph.json");
    let csr_path = nested.join("graph.csr");
    text::save_edge_list(&graph.edges, &text_path).expect("text saved");
    json::save_json(&graph, &json_path).expect("json saved");
    csr::save_csr(&graph, &csr_path).expect("csr saved");

    let edges = text::load_edge_list(&text_path).expect("text loads");
    assert_eq!(edges, graph.edges);

    let document = json::load_json(&json_path).expect("json loads");
    let json_edges: Vec<(u32, u32)> = document.edges.iter().map(|[u, v]| (*u, *v)).collect();
    assert_eq!(json_edges, graph.edges.to_pairs());
    assert_eq!(document.communities, graph.partition.member_lists());

    let loaded = csr::load_csr(&csr_path).expect("csr loads");
    assert_eq!(loaded.node_count(), 41);
    assert_eq!(loaded.edge_count(), graph.edge_count() * 2);
    assert_eq!(loaded.neighbours(0), Some(&[][..]));
    for node in &document.nodes {
        let slot = loaded
            .neighbours(node.id as usize)
            .expect("every node has a slot");
        let expected: Vec<i32> = node.neighbours.iter().map(|&id| id as i32).collect();
        assert_eq!(slot, expected.as_slice(), "node {}", node.id);
    }
}

#[test]
fn edge_list_lines_are_space_separated_pairs() {
    let graph = generate(
        GeneratorConfig::new(6, 2)
            .with_probabilities(1.0, 0.0)
            .with_popularity(Default::default(), 0.0, false),
    )
    .expect("valid config");
    let mut buffer = Vec::new();
    text::write_edge_list(&graph.edges, &mut buffer).expect("written");
    assert_eq!(
        String::from_utf8(buffer).expect("utf-8"),
        "1 2\n1 3\n2 3\n4 5\n4 6\n5 6\n"
    );
}
