//! Bernoulli edge sampling over community pairs.

use std::collections::BTreeSet;

use rand::Rng;
use rand::distributions::Standard;
use tracing::debug;

use crate::partition::{NodeId, Partition};
use crate::popularity::Popularity;

/// An undirected edge stored with the smaller id first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Edge {
    u: NodeId,
    v: NodeId,
}

impl Edge {
    /// Canonical edge between `a` and `b`, or `None` for a self-loop.
    #[must_use]
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { u: a, v: b }),
            std::cmp::Ordering::Greater => Some(Self { u: b, v: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Smaller endpoint.
    #[must_use]
    pub const fn u(&self) -> NodeId {
        self.u
    }

    /// Larger endpoint.
    #[must_use]
    pub const fn v(&self) -> NodeId {
        self.v
    }

    /// Both endpoints as `(u, v)` with `u < v`.
    #[must_use]
    pub const fn endpoints(&self) -> (NodeId, NodeId) {
        (self.u, self.v)
    }
}

/// Deduplicated set of undirected edges, iterated in `(u, v)` order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeSet {
    edges: BTreeSet<Edge>,
}

impl EdgeSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge; returns `false` when it was already present.
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    /// Whether `a` and `b` are joined, in either orientation.
    #[must_use]
    pub fn contains(&self, a: NodeId, b: NodeId) -> bool {
        Edge::new(a, b).is_some_and(|edge| self.edges.contains(&edge))
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the set holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges in ascending `(u, v)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Endpoint pairs in ascending order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.edges.iter().map(Edge::endpoints).collect()
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::collections::btree_set::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Probability parameters of a sampling run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeProbabilities {
    pub p_in: f64,
    pub p_out: f64,
    /// Blend factor between baseline and popularity-weighted probability.
    pub pop_influence: f64,
    /// Whether inter-community pairs are popularity-weighted as well.
    pub inter_pop: bool,
}

impl EdgeProbabilities {
    fn intra(&self, pop_u: f64, pop_v: f64) -> f64 {
        edge_probability(self.p_in, self.pop_influence, pop_u, pop_v)
    }

    fn inter(&self, pop_u: f64, pop_v: f64) -> f64 {
        if self.inter_pop {
            edge_probability(self.p_out, self.pop_influence, pop_u, pop_v)
        } else {
            self.p_out
        }
    }
}

/// Edge counts split by pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeCounts {
    pub intra: usize,
    pub inter: usize,
}

impl EdgeCounts {
    /// Sum of both passes.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.intra + self.inter
    }
}

/// Baseline probability blended with the mean popularity of the two
/// endpoints: `base * ((1 - influence) + influence * (pop_u + pop_v) / 2)`.
///
/// An influence of zero returns `base` exactly, whatever the popularity.
/// The result is not clamped; see [`bernoulli_trial`].
#[must_use]
pub fn edge_probability(base: f64, influence: f64, pop_u: f64, pop_v: f64) -> f64 {
    if influence == 0.0 {
        return base;
    }
    base * ((1.0 - influence) + influence * (pop_u / 2.0 + pop_v / 2.0))
}

/// Clamp into `[0, 1]`, mapping `NaN` to zero.
#[must_use]
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

/// One Bernoulli trial with the clamped `probability`.
///
/// Always consumes exactly one `f64` draw, even for probabilities of 0 or 1,
/// so the random stream stays aligned across parameter changes.
pub fn bernoulli_trial<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    let draw: f64 = rng.sample(Standard);
    draw < clamp_probability(probability)
}

/// Sample every candidate pair once: all intra-community pairs in community
/// order, then all inter-community pairs in community-pair order.
///
/// Nodes missing from `popularity` count as popularity 1.0.
pub fn sample_edges<R: Rng + ?Sized>(
    partition: &Partition,
    popularity: &Popularity,
    probabilities: &EdgeProbabilities,
    rng: &mut R,
) -> (EdgeSet, EdgeCounts) {
    let pop = |node: NodeId| popularity.get(node).unwrap_or(1.0);
    let mut edges = EdgeSet::new();
    let mut counts = EdgeCounts::default();
    let communities = partition.communities();

    for community in communities {
        for u in community.members() {
            for v in (u + 1)..community.members().end {
                if bernoulli_trial(rng, probabilities.intra(pop(u), pop(v)))
                    && record(&mut edges, u, v)
                {
                    counts.intra += 1;
                }
            }
        }
    }
    debug!(intra_edges = counts.intra, "intra-community pass complete");

    for (position, first) in communities.iter().enumerate() {
        for second in communities.iter().skip(position + 1) {
            for u in first.members() {
                for v in second.members() {
                    if bernoulli_trial(rng, probabilities.inter(pop(u), pop(v)))
                        && record(&mut edges, u, v)
                    {
                        counts.inter += 1;
                    }
                }
            }
        }
    }
    debug!(inter_edges = counts.inter, "inter-community pass complete");

    (edges, counts)
}

fn record(edges: &mut EdgeSet, u: NodeId, v: NodeId) -> bool {
    Edge::new(u, v).is_some_and(|edge| edges.insert(edge))
}
