//! Per-node popularity scores.
//!
//! Raw scores are drawn one per node, in increasing id order, from a
//! [`PopularityModel`]. They are then rescaled so each community averages
//! exactly 1.0, which keeps the expected edge density of a community equal to
//! its baseline probability whatever the distribution.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distributions::Uniform;
use rand_distr::{Distribution as _, Exp, Normal, Pareto};
use tracing::warn;

use crate::error::{GeneratorError, Result};
use crate::params::ParamMap;
use crate::partition::{NodeId, Partition};

/// Floor applied to normal and uniform draws so every score stays positive.
pub const POPULARITY_EPSILON: f64 = 1e-6;

/// Popularity distribution families.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Distribution {
    /// Exponential law with parameter `rate`.
    Exponential,
    /// Pareto law with scale 1 and shape `alpha`.
    Pareto,
    /// Normal law with `mu` and `sigma`, floored at [`POPULARITY_EPSILON`].
    Normal,
    /// Uniform law on `[a, b]`, floored at [`POPULARITY_EPSILON`].
    Uniform,
}

impl Distribution {
    /// Short name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exponential => "exp",
            Self::Pareto => "pareto",
            Self::Normal => "normal",
            Self::Uniform => "uniform",
        }
    }

    const fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Self::Exponential => &["rate"],
            Self::Pareto => &["alpha"],
            Self::Normal => &["mu", "sigma"],
            Self::Uniform => &["a", "b"],
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = GeneratorError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exp" | "exponential" => Ok(Self::Exponential),
            "pareto" => Ok(Self::Pareto),
            "normal" | "gaussian" => Ok(Self::Normal),
            "uniform" => Ok(Self::Uniform),
            _ => Err(GeneratorError::UnsupportedDistribution {
                name: raw.to_owned(),
            }),
        }
    }
}

/// A fully parameterised popularity distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PopularityModel {
    /// Exponential law.
    Exponential {
        /// Rate parameter, default 1.0.
        rate: f64,
    },
    /// Pareto law with unit scale.
    Pareto {
        /// Shape parameter, default 2.0.
        alpha: f64,
    },
    /// Normal law.
    Normal {
        /// Mean, default 1.0.
        mu: f64,
        /// Standard deviation, default 0.5.
        sigma: f64,
    },
    /// Uniform law.
    Uniform {
        /// Lower bound, default 0.0.
        a: f64,
        /// Upper bound, default 1.0.
        b: f64,
    },
}

impl Default for PopularityModel {
    fn default() -> Self {
        Self::Exponential { rate: 1.0 }
    }
}

impl PopularityModel {
    /// Build a model from a distribution and named parameters, falling back
    /// to the documented defaults for missing ones.
    ///
    /// Keys the distribution does not use are ignored with a warning.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidDistributionParameter`] when a value
    /// lies outside what the distribution accepts.
    pub fn from_params(distribution: Distribution, params: &ParamMap) -> Result<Self> {
        let known = distribution.parameter_names();
        for key in params.keys() {
            if !known.contains(&key.as_str()) {
                warn!(%distribution, parameter = %key, "ignoring unused distribution parameter");
            }
        }
        let get = |name: &str, default: f64| params.get(name).copied().unwrap_or(default);

        let model = match distribution {
            Distribution::Exponential => Self::Exponential {
                rate: get("rate", 1.0),
            },
            Distribution::Pareto => Self::Pareto {
                alpha: get("alpha", 2.0),
            },
            Distribution::Normal => Self::Normal {
                mu: get("mu", 1.0),
                sigma: get("sigma", 0.5),
            },
            Distribution::Uniform => Self::Uniform {
                a: get("a", 0.0),
                b: get("b", 1.0),
            },
        };
        model.validate()?;
        Ok(model)
    }

    /// The distribution family of this model.
    #[must_use]
    pub const fn distribution(&self) -> Distribution {
        match self {
            Self::Exponential { .. } => Distribution::Exponential,
            Self::Pareto { .. } => Distribution::Pareto,
            Self::Normal { .. } => Distribution::Normal,
            Self::Uniform { .. } => Distribution::Uniform,
        }
    }

    /// Check every parameter against the distribution's domain.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidDistributionParameter`] naming the
    /// first offending parameter.
    pub fn validate(&self) -> Result<()> {
        let distribution = self.distribution();
        let reject = |parameter: &'static str, value: f64, reason: &str| -> Result<()> {
            Err(GeneratorError::InvalidDistributionParameter {
                distribution,
                parameter,
                value,
                reason: reason.to_owned(),
            })
        };
        match *self {
            Self::Exponential { rate } if !(rate.is_finite() && rate > 0.0) => {
                reject("rate", rate, "must be finite and positive")
            }
            Self::Pareto { alpha } if !(alpha.is_finite() && alpha > 0.0) => {
                reject("alpha", alpha, "must be finite and positive")
            }
            Self::Normal { mu, .. } if !mu.is_finite() => reject("mu", mu, "must be finite"),
            Self::Normal { sigma, .. } if !(sigma.is_finite() && sigma >= 0.0) => {
                reject("sigma", sigma, "must be finite and non-negative")
            }
            Self::Uniform { a, .. } if !a.is_finite() => reject("a", a, "must be finite"),
            Self::Uniform { b, .. } if !b.is_finite() => reject("b", b, "must be finite"),
            Self::Uniform { a, b } if a > b => reject("b", b, "must not be below `a`"),
            Self::Uniform { a, b } if !(b - a).is_finite() => {
                reject("b", b, "range width must be finite")
            }
            _ => Ok(()),
        }
    }

    /// Construct the sampler for this model.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidDistributionParameter`] when the
    /// parameters fail [`Self::validate`] or the underlying distribution
    /// rejects them.
    pub fn sampler(&self) -> Result<PopularitySampler> {
        self.validate()?;
        let distribution = self.distribution();
        let inner = match *self {
            Self::Exponential { rate } => SamplerKind::Exponential(
                Exp::new(rate).map_err(rejected(distribution, "rate", rate))?,
            ),
            Self::Pareto { alpha } => SamplerKind::Pareto(
                Pareto::new(1.0, alpha).map_err(rejected(distribution, "alpha", alpha))?,
            ),
            Self::Normal { mu, sigma } => SamplerKind::Normal(
                Normal::new(mu, sigma).map_err(rejected(distribution, "sigma", sigma))?,
            ),
            Self::Uniform { a, b } => SamplerKind::Uniform(Uniform::new_inclusive(a, b)),
        };
        Ok(PopularitySampler { inner })
    }
}

fn rejected<E: fmt::Display>(
    distribution: Distribution,
    parameter: &'static str,
    value: f64,
) -> impl FnOnce(E) -> GeneratorError {
    move |err| GeneratorError::InvalidDistributionParameter {
        distribution,
        parameter,
        value,
        reason: err.to_string(),
    }
}

#[derive(Clone, Copy, Debug)]
enum SamplerKind {
    Exponential(Exp<f64>),
    Pareto(Pareto<f64>),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

/// Draws raw popularity scores from a validated [`PopularityModel`].
#[derive(Clone, Copy, Debug)]
pub struct PopularitySampler {
    inner: SamplerKind,
}

impl PopularitySampler {
    /// Draw a single positive, finite score.
    ///
    /// Heavy tails can overflow to infinity; such draws are capped at
    /// `f64::MAX`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let draw = match &self.inner {
            SamplerKind::Exponential(dist) => dist.sample(rng),
            SamplerKind::Pareto(dist) => dist.sample(rng),
            SamplerKind::Normal(dist) => dist.sample(rng).max(POPULARITY_EPSILON),
            SamplerKind::Uniform(dist) => dist.sample(rng).max(POPULARITY_EPSILON),
        };
        draw.min(f64::MAX)
    }

    /// Draw one score per node for nodes `1..=node_count`, in id order.
    pub fn sample_raw<R: Rng + ?Sized>(&self, node_count: u32, rng: &mut R) -> Vec<f64> {
        (0..node_count).map(|_| self.sample(rng)).collect()
    }
}

/// Normalised popularity of every node, indexed by node id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Popularity {
    scores: Vec<f64>,
}

impl Popularity {
    /// Score of `node`, or `None` when the id is out of range.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<f64> {
        let index = usize::try_from(node).ok()?.checked_sub(1)?;
        self.scores.get(index).copied()
    }

    /// Scores ordered by node id, starting at node 1.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.scores
    }

    /// `(node, score)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        (1..).zip(self.scores.iter().copied())
    }

    /// Number of scored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no node is scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Rescale raw scores so each community's mean becomes 1.0.
///
/// `raw[i]` is the score of node `i + 1`. A community whose raw mean is
/// non-positive or non-finite keeps its raw scores unchanged. Nodes missing
/// from `raw` are ignored.
#[must_use]
pub fn normalize(raw: &[f64], partition: &Partition) -> Popularity {
    let mut scores = raw.to_vec();
    for community in partition.communities() {
        let start = (community.members().start - 1) as usize;
        let end = (community.members().end - 1) as usize;
        let Some(members) = scores.get_mut(start..end.min(raw.len())) else {
            continue;
        };
        if members.is_empty() {
            continue;
        }
        let len = members.len() as f64;
        let mut mean = members.iter().sum::<f64>() / len;
        if mean.is_infinite() {
            // Scale first so a community of huge finite scores cannot overflow.
            mean = members.iter().map(|score| score / len).sum();
        }
        let divisor = if mean.is_finite() && mean > 0.0 {
            mean
        } else {
            1.0
        };
        for score in members.iter_mut() {
            *score /= divisor;
        }
    }
    Popularity { scores }
}
