//! Random undirected graphs with planted communities and popularity hubs.
//!
//! Nodes `1..=n` are split into `k` contiguous communities. Every node draws a
//! popularity score, normalised to mean 1.0 within its community, and every
//! candidate pair gets one Bernoulli trial whose probability blends a baseline
//! (`p_in` inside communities, `p_out` across them) with the pair's mean
//! popularity. The whole run is a pure function of the configuration and the
//! seed.
//!
//! ```
//! use community_graphgen::{GeneratorConfig, generate};
//!
//! let graph = generate(GeneratorConfig::new(60, 3).with_seed(Some(7)))?;
//! assert_eq!(graph.partition.len(), 3);
//! assert!(graph.edges.iter().all(|edge| edge.u() < edge.v()));
//! # Ok::<(), community_graphgen::GeneratorError>(())
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod edges;
pub mod ensemble;
pub mod error;
pub mod generator;
pub mod graph;
pub mod io;
pub mod logging;
pub mod params;
pub mod partition;
pub mod popularity;

pub use config::{CommunityRange, GeneratorConfig};
pub use detect::{
    DEFAULT_PROPAGATION_STEPS, DetectedCommunities, label_propagation, rank_neighbourhood,
};
pub use edges::{
    Edge, EdgeCounts, EdgeProbabilities, EdgeSet, bernoulli_trial, clamp_probability,
    edge_probability, sample_edges,
};
pub use ensemble::{EnsembleSummary, run_ensemble};
pub use error::GeneratorError;
pub use generator::{CommunityGraphGenerator, GeneratedGraph, GenerationStats, generate};
pub use graph::DegreeSummary;
pub use io::GraphIoError;
pub use params::{ParamMap, parse_params};
pub use partition::{Community, MAX_NODE_COUNT, NodeId, Partition, partition};
pub use popularity::{
    Distribution, POPULARITY_EPSILON, Popularity, PopularityModel, PopularitySampler, normalize,
};
