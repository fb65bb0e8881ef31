//! Edge-count statistics over many seeds.
//!
//! Each seed gets its own generator state, so runs are independent and the
//! work spreads across the rayon pool without sharing an RNG.

use std::ops::Range;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::config::GeneratorConfig;
use crate::edges::EdgeCounts;
use crate::error::Result;
use crate::generator::CommunityGraphGenerator;

/// Aggregate edge counts of an ensemble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnsembleSummary {
    pub runs: usize,
    pub mean_intra_edges: f64,
    pub mean_inter_edges: f64,
    pub mean_edges: f64,
    pub min_edges: usize,
    pub max_edges: usize,
}

impl EnsembleSummary {
    fn from_counts(counts: &[EdgeCounts]) -> Self {
        let runs = counts.len();
        let mean = |pick: fn(&EdgeCounts) -> usize| {
            if runs == 0 {
                0.0
            } else {
                counts.iter().map(pick).sum::<usize>() as f64 / runs as f64
            }
        };
        Self {
            runs,
            mean_intra_edges: mean(|c| c.intra),
            mean_inter_edges: mean(|c| c.inter),
            mean_edges: mean(EdgeCounts::total),
            min_edges: counts.iter().map(EdgeCounts::total).min().unwrap_or(0),
            max_edges: counts.iter().map(EdgeCounts::total).max().unwrap_or(0),
        }
    }
}

/// Generate one graph per seed in `seeds` and summarise the edge counts.
///
/// The seed in `config` is ignored.
///
/// # Errors
/// Returns a [`crate::GeneratorError`] when `config` is invalid.
#[instrument(skip(config), fields(nodes = config.node_count))]
pub fn run_ensemble(config: &GeneratorConfig, seeds: Range<u64>) -> Result<EnsembleSummary> {
    let generator = CommunityGraphGenerator::new(config.clone())?;
    let counts: Vec<EdgeCounts> = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generator.generate_with_rng(&mut rng).stats.edges
        })
        .collect();
    let summary = EnsembleSummary::from_counts(&counts);
    info!(
        runs = summary.runs,
        mean_edges = summary.mean_edges,
        "ensemble complete"
    );
    Ok(summary)
}
