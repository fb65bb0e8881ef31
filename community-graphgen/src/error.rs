//! Error types for graph generation.
//!
//! Every failure is detected while validating a [`crate::GeneratorConfig`],
//! before a single random draw is made. Degenerate numeric conditions met
//! during sampling are absorbed and never reported here.

use thiserror::Error;

use crate::popularity::Distribution;

/// Errors raised while validating generator input.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The graph must contain between 1 and [`crate::MAX_NODE_COUNT`] nodes.
    #[error("node count {got} is out of range; expected 1..=4294967294")]
    InvalidNodeCount {
        /// Node count supplied by the caller.
        got: u32,
    },
    /// The graph must be split into at least one community.
    #[error("community count must be at least 1 (got {got})")]
    InvalidCommunityCount {
        /// Community count supplied by the caller.
        got: u32,
    },
    /// A community clamp range was empty or started at zero.
    #[error("community range {min}..={max} is invalid; expected 1 <= min <= max")]
    InvalidCommunityRange {
        /// Lower bound of the rejected range.
        min: u32,
        /// Upper bound of the rejected range.
        max: u32,
    },
    /// The popularity distribution name is not recognised.
    #[error("unsupported popularity distribution `{name}`; expected exp, pareto, normal or uniform")]
    UnsupportedDistribution {
        /// Name supplied by the caller.
        name: String,
    },
    /// A distribution parameter token was not of the form `key=value`.
    #[error("malformed distribution parameter `{token}`: {reason}")]
    MalformedParameterString {
        /// Offending token.
        token: String,
        /// Why the token was rejected.
        reason: &'static str,
    },
    /// A distribution parameter was outside the range the distribution accepts.
    #[error("invalid {distribution} parameter `{parameter}` = {value}: {reason}")]
    InvalidDistributionParameter {
        /// Distribution being configured.
        distribution: Distribution,
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
        /// Constraint that was violated.
        reason: String,
    },
}

impl GeneratorError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidNodeCount { .. } => "INVALID_NODE_COUNT",
            Self::InvalidCommunityCount { .. } => "INVALID_COMMUNITY_COUNT",
            Self::InvalidCommunityRange { .. } => "INVALID_COMMUNITY_RANGE",
            Self::UnsupportedDistribution { .. } => "UNSUPPORTED_DISTRIBUTION",
            Self::MalformedParameterString { .. } => "MALFORMED_PARAMETER_STRING",
            Self::InvalidDistributionParameter { .. } => "INVALID_DISTRIBUTION_PARAMETER",
        }
    }
}

/// Convenient result alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;
