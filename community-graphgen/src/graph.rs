//! Derived views of a [`GeneratedGraph`]: adjacency, `petgraph`, DOT.

use std::io::{self, Write};

use petgraph::algo::connected_components;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;

use crate::generator::GeneratedGraph;
use crate::partition::NodeId;

/// Degree statistics over all nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegreeSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Nodes without any edge.
    pub isolated: usize,
}

impl GeneratedGraph {
    /// Sorted neighbour lists; entry `i` belongs to node `i + 1`.
    #[must_use]
    pub fn neighbours(&self) -> Vec<Vec<NodeId>> {
        let mut adjacency = vec![Vec::new(); self.node_count() as usize];
        for edge in &self.edges {
            let (u, v) = edge.endpoints();
            if let Some(list) = adjacency.get_mut((u - 1) as usize) {
                list.push(v);
            }
            if let Some(list) = adjacency.get_mut((v - 1) as usize) {
                list.push(u);
            }
        }
        adjacency.par_iter_mut().for_each(|list| list.sort_unstable());
        adjacency
    }

    /// Degree of every node, indexed like [`Self::neighbours`].
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count() as usize];
        for edge in &self.edges {
            let (u, v) = edge.endpoints();
            for node in [u, v] {
                if let Some(degree) = degrees.get_mut((node - 1) as usize) {
                    *degree += 1;
                }
            }
        }
        degrees
    }

    /// Minimum, maximum and mean degree.
    #[must_use]
    pub fn degree_summary(&self) -> DegreeSummary {
        let degrees = self.degrees();
        let total: usize = degrees.iter().sum();
        DegreeSummary {
            min: degrees.iter().copied().min().unwrap_or(0),
            max: degrees.iter().copied().max().unwrap_or(0),
            mean: if degrees.is_empty() {
                0.0
            } else {
                total as f64 / degrees.len() as f64
            },
            isolated: degrees.iter().filter(|&&degree| degree == 0).count(),
        }
    }

    /// Undirected `petgraph` graph whose node weights are the node ids;
    /// node `id` sits at index `id - 1`.
    #[must_use]
    pub fn to_petgraph(&self) -> UnGraph<NodeId, ()> {
        let nodes = self.node_count() as usize;
        let mut graph = UnGraph::with_capacity(nodes, self.edge_count());
        for id in 1..=self.node_count() {
            graph.add_node(id);
        }
        for edge in &self.edges {
            let (u, v) = edge.endpoints();
            graph.add_edge(
                NodeIndex::new((u - 1) as usize),
                NodeIndex::new((v - 1) as usize),
                (),
            );
        }
        graph
    }

    /// Number of connected components, isolated nodes included.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.to_petgraph())
    }

    /// Write Graphviz DOT with nodes filled by community hue.
    ///
    /// # Errors
    /// Propagates failures of `writer`.
    pub fn write_dot<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let graph = self.to_petgraph();
        let node_attributes = |_: &UnGraph<NodeId, ()>, (_, id): (NodeIndex, &NodeId)| {
            let community = self
                .partition
                .community_of(*id)
                .map_or(0, |community| community.index());
            let hue = (community * 60) % 360;
            format!(
                "label=\"{id}\", style=filled, fillcolor=\"{:.3} 0.5 0.7\"",
                hue as f64 / 360.0
            )
        };
        let dot = Dot::with_attr_getters(
            &graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &node_attributes,
        );
        write!(writer, "{dot:?}")
    }
}
