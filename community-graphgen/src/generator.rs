//! End-to-end generation: partition, popularity, edges.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use crate::config::GeneratorConfig;
use crate::edges::{EdgeCounts, EdgeProbabilities, EdgeSet, sample_edges};
use crate::error::Result;
use crate::partition::{Partition, partition};
use crate::popularity::{Popularity, PopularitySampler, normalize};

/// Summary numbers of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GenerationStats {
    /// Seed the run used, when it was reproducible.
    pub seed: Option<u64>,
    pub edges: EdgeCounts,
}

/// The output of a generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedGraph {
    pub partition: Partition,
    /// Normalised popularity per node.
    pub popularity: Popularity,
    pub edges: EdgeSet,
    pub stats: GenerationStats,
}

impl GeneratedGraph {
    /// Number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> u32 {
        self.partition.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A validated generator ready to produce graphs.
///
/// # Examples
/// ```
/// use community_graphgen::{CommunityGraphGenerator, GeneratorConfig};
///
/// let config = GeneratorConfig::new(6, 2)
///     .with_probabilities(1.0, 0.0)
///     .with_popularity(Default::default(), 0.0, false);
/// let graph = CommunityGraphGenerator::new(config)?.generate();
/// assert_eq!(graph.edge_count(), 6);
/// # Ok::<(), community_graphgen::GeneratorError>(())
/// ```
#[derive(Clone, Debug)]
pub struct CommunityGraphGenerator {
    config: GeneratorConfig,
    partition: Partition,
    sampler: PopularitySampler,
}

impl CommunityGraphGenerator {
    /// Validate `config` and precompute the partition.
    ///
    /// # Errors
    /// Returns a [`crate::GeneratorError`] when the node count, community
    /// count or popularity parameters are invalid.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let communities = config.effective_communities()?;
        let partition = partition(config.node_count, communities)?;
        let sampler = config.popularity.sampler()?;
        Ok(Self {
            config,
            partition,
            sampler,
        })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The partition every run of this generator uses.
    #[must_use]
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Run once with a generator seeded from the config, or from OS entropy
    /// when no seed is configured.
    #[must_use]
    pub fn generate(&self) -> GeneratedGraph {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut graph = self.generate_with_rng(&mut rng);
        graph.stats.seed = self.config.seed;
        graph
    }

    /// Run once, drawing from `rng`: one popularity draw per node in id
    /// order, then one trial per intra-community pair, then one per
    /// inter-community pair.
    #[instrument(
        name = "generate",
        skip_all,
        fields(
            nodes = self.config.node_count,
            communities = self.partition.len(),
            p_in = self.config.p_in,
            p_out = self.config.p_out,
        ),
    )]
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedGraph {
        let raw = self.sampler.sample_raw(self.config.node_count, rng);
        let popularity = normalize(&raw, &self.partition);

        let probabilities = EdgeProbabilities {
            p_in: self.config.p_in,
            p_out: self.config.p_out,
            pop_influence: self.config.pop_influence,
            inter_pop: self.config.inter_pop,
        };
        let (edges, counts) = sample_edges(&self.partition, &popularity, &probabilities, rng);

        info!(
            edges = edges.len(),
            intra_edges = counts.intra,
            inter_edges = counts.inter,
            "generated community graph"
        );

        GeneratedGraph {
            partition: self.partition.clone(),
            popularity,
            edges,
            stats: GenerationStats {
                seed: None,
                edges: counts,
            },
        }
    }
}

/// Validate `config` and run it once.
///
/// # Errors
/// Returns a [`crate::GeneratorError`] when the configuration is invalid;
/// nothing is sampled in that case.
pub fn generate(config: GeneratorConfig) -> Result<GeneratedGraph> {
    Ok(CommunityGraphGenerator::new(config)?.generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::CommunityRange;
    use crate::error::GeneratorError;
    use crate::popularity::PopularityModel;

    #[test]
    fn rejects_invalid_configs_before_sampling() {
        assert_eq!(
            generate(GeneratorConfig::new(10, 0)).map(|graph| graph.edge_count()),
            Err(GeneratorError::InvalidCommunityCount { got: 0 })
        );
        let bad_model = GeneratorConfig::new(10, 2).with_popularity(
            PopularityModel::Exponential { rate: -1.0 },
            0.5,
            false,
        );
        assert!(matches!(
            CommunityGraphGenerator::new(bad_model),
            Err(GeneratorError::InvalidDistributionParameter { parameter: "rate", .. })
        ));
    }

    #[test]
    fn clamps_community_count_before_partitioning() {
        let config =
            GeneratorConfig::new(40, 9).with_community_range(CommunityRange::DISPLAY);
        let generator = CommunityGraphGenerator::new(config).expect("valid config");
        assert_eq!(generator.partition().len(), 5);
    }

    #[test]
    fn seeded_runs_record_their_seed() {
        let config = GeneratorConfig::new(20, 2).with_seed(Some(17));
        let graph = generate(config).expect("valid config");
        assert_eq!(graph.stats.seed, Some(17));
        assert_eq!(graph.stats.edges.total(), graph.edge_count());
    }

    #[test]
    fn entropy_runs_still_satisfy_invariants() {
        let config = GeneratorConfig::new(30, 3).with_seed(None);
        let graph = generate(config).expect("valid config");
        assert_eq!(graph.stats.seed, None);
        assert_eq!(graph.popularity.len(), 30);
        assert!(graph.edges.iter().all(|edge| edge.u() < edge.v()));
    }
}
