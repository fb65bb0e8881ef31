//! Generator configuration.
//!
//! A [`GeneratorConfig`] is built once and handed to
//! [`crate::CommunityGraphGenerator::new`], which validates it before any
//! sampling starts.

use crate::error::{GeneratorError, Result};
use crate::popularity::PopularityModel;

/// Default number of nodes.
pub const DEFAULT_NODES: u32 = 600;
/// Default number of communities.
pub const DEFAULT_COMMUNITIES: u32 = 6;
/// Default probability of an edge inside a community.
pub const DEFAULT_P_IN: f64 = 0.15;
/// Default probability of an edge between communities.
pub const DEFAULT_P_OUT: f64 = 0.002;
/// Default seed.
pub const DEFAULT_SEED: u64 = 42;
/// Default blend between baseline and popularity-weighted probability.
pub const DEFAULT_POP_INFLUENCE: f64 = 0.5;

/// Inclusive bounds a requested community count is clamped into.
///
/// The upper bound is further limited by the node count, so no community is
/// ever forced to be empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommunityRange {
    min: u32,
    max: u32,
}

impl CommunityRange {
    /// Any count from 1 up to the node count.
    pub const UNBOUNDED: Self = Self { min: 1, max: u32::MAX };

    /// Between two and five communities, the range used for drawings.
    pub const DISPLAY: Self = Self { min: 2, max: 5 };

    /// Create a range `min..=max`.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidCommunityRange`] when `min` is zero or
    /// exceeds `max`.
    pub const fn new(min: u32, max: u32) -> Result<Self> {
        if min == 0 || min > max {
            return Err(GeneratorError::InvalidCommunityRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound before the node-count limit applies.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Clamp `requested` into this range, capped at `node_count`.
    ///
    /// When the node count is smaller than `min`, the node count wins.
    #[must_use]
    pub fn clamp(&self, requested: u32, node_count: u32) -> u32 {
        let upper = self.max.min(node_count).max(1);
        let lower = self.min.min(upper);
        requested.clamp(lower, upper)
    }
}

impl Default for CommunityRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Everything that determines a generation run.
///
/// Two runs with equal configs and a fixed seed produce identical graphs.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Number of nodes `n`; ids are `1..=n`.
    pub node_count: u32,
    /// Requested number of communities `k`, clamped by `community_range`.
    pub community_count: u32,
    /// Clamp policy for `community_count`.
    pub community_range: CommunityRange,
    /// Baseline probability of an intra-community edge.
    pub p_in: f64,
    /// Baseline probability of an inter-community edge.
    pub p_out: f64,
    /// Seed for the random generator; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Distribution of raw popularity scores.
    pub popularity: PopularityModel,
    /// Blend factor in `[0, 1]` between baseline and popularity-weighted
    /// probabilities.
    pub pop_influence: f64,
    /// Whether popularity also weights inter-community edges.
    pub inter_pop: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODES,
            community_count: DEFAULT_COMMUNITIES,
            community_range: CommunityRange::UNBOUNDED,
            p_in: DEFAULT_P_IN,
            p_out: DEFAULT_P_OUT,
            seed: Some(DEFAULT_SEED),
            popularity: PopularityModel::default(),
            pop_influence: DEFAULT_POP_INFLUENCE,
            inter_pop: false,
        }
    }
}

impl GeneratorConfig {
    /// Config for `n` nodes in `k` communities, defaults elsewhere.
    #[must_use]
    pub fn new(node_count: u32, community_count: u32) -> Self {
        Self {
            node_count,
            community_count,
            ..Self::default()
        }
    }

    /// Replace both baseline probabilities.
    #[must_use]
    pub const fn with_probabilities(mut self, p_in: f64, p_out: f64) -> Self {
        self.p_in = p_in;
        self.p_out = p_out;
        self
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the popularity model and how strongly it weights edges.
    #[must_use]
    pub const fn with_popularity(
        mut self,
        popularity: PopularityModel,
        pop_influence: f64,
        inter_pop: bool,
    ) -> Self {
        self.popularity = popularity;
        self.pop_influence = pop_influence;
        self.inter_pop = inter_pop;
        self
    }

    /// Replace the community clamp policy.
    #[must_use]
    pub const fn with_community_range(mut self, community_range: CommunityRange) -> Self {
        self.community_range = community_range;
        self
    }

    /// Community count actually used after clamping.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidNodeCount`] for an empty graph and
    /// [`GeneratorError::InvalidCommunityCount`] when `k == 0`; zero is never
    /// silently clamped up.
    pub fn effective_communities(&self) -> Result<u32> {
        if self.node_count == 0 || self.node_count > crate::partition::MAX_NODE_COUNT {
            return Err(GeneratorError::InvalidNodeCount {
                got: self.node_count,
            });
        }
        if self.community_count == 0 {
            return Err(GeneratorError::InvalidCommunityCount {
                got: self.community_count,
            });
        }
        Ok(self
            .community_range
            .clamp(self.community_count, self.node_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(CommunityRange::UNBOUNDED, 6, 600, 6)]
    #[case(CommunityRange::UNBOUNDED, 10, 4, 4)]
    #[case(CommunityRange::DISPLAY, 6, 600, 5)]
    #[case(CommunityRange::DISPLAY, 1, 600, 2)]
    #[case(CommunityRange::DISPLAY, 3, 1, 1)]
    fn clamps_into_range(
        #[case] range: CommunityRange,
        #[case] requested: u32,
        #[case] nodes: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(range.clamp(requested, nodes), expected);
    }

    #[rstest]
    #[case(0, 3)]
    #[case(4, 3)]
    fn rejects_invalid_ranges(#[case] min: u32, #[case] max: u32) {
        assert_eq!(
            CommunityRange::new(min, max),
            Err(GeneratorError::InvalidCommunityRange { min, max })
        );
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.node_count, 600);
        assert_eq!(config.community_count, 6);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.popularity, PopularityModel::Exponential { rate: 1.0 });
        assert!(!config.inter_pop);
    }

    #[test]
    fn zero_communities_are_rejected_not_clamped() {
        let config = GeneratorConfig::new(10, 0);
        assert_eq!(
            config.effective_communities(),
            Err(GeneratorError::InvalidCommunityCount { got: 0 })
        );
    }

    #[test]
    fn zero_nodes_are_rejected() {
        let config = GeneratorConfig::new(0, 2);
        assert_eq!(
            config.effective_communities(),
            Err(GeneratorError::InvalidNodeCount { got: 0 })
        );
    }

    #[test]
    fn builder_methods_replace_fields() {
        let config = GeneratorConfig::new(30, 3)
            .with_probabilities(0.4, 0.01)
            .with_seed(None)
            .with_popularity(PopularityModel::Pareto { alpha: 3.0 }, 0.2, true)
            .with_community_range(CommunityRange::DISPLAY);
        assert_eq!(config.p_in, 0.4);
        assert_eq!(config.p_out, 0.01);
        assert_eq!(config.seed, None);
        assert_eq!(config.pop_influence, 0.2);
        assert!(config.inter_pop);
        assert_eq!(config.community_range, CommunityRange::DISPLAY);
    }
}
