//! Community detection by label propagation, and neighbourhood ranking.
//!
//! Both work on the [`CsrGraph`] layout, so they apply equally to generated
//! graphs and to CSR files read back from disk.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::generator::GeneratedGraph;
use crate::io::GraphIoError;
use crate::io::csr::CsrGraph;

/// Sweeps used when the caller does not choose.
pub const DEFAULT_PROPAGATION_STEPS: u32 = 5;

/// Labels found by [`label_propagation`], one per CSR slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DetectedCommunities {
    labels: Vec<usize>,
}

impl DetectedCommunities {
    /// Label of every slot; slot 0 included.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Label of `slot`, or `None` when out of range.
    #[must_use]
    pub fn label_of(&self, slot: usize) -> Option<usize> {
        self.labels.get(slot).copied()
    }

    /// Members of each label, in slot order. Slot 0 holds no node and is left
    /// out.
    #[must_use]
    pub fn groups(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (slot, &label) in self.labels.iter().enumerate().skip(1) {
            groups.entry(label).or_default().push(slot);
        }
        groups
    }

    /// Member lists ordered by their smallest member.
    #[must_use]
    pub fn member_lists(&self) -> Vec<Vec<usize>> {
        let mut lists: Vec<Vec<usize>> = self.groups().into_values().collect();
        lists.sort_unstable();
        lists
    }
}

/// Run up to `steps` sweeps of asynchronous label propagation.
///
/// Every slot starts with its own index as label. A sweep visits slots in
/// order and moves each one to the label most frequent among its neighbours.
/// A slot whose current label is among the most frequent keeps it; other ties
/// are broken uniformly with `rng`, which is drawn from only on such ties.
/// Slots without neighbours never change. Sweeping stops early once a whole
/// sweep changes nothing.
#[instrument(skip_all, fields(slots = csr.node_count(), steps = steps))]
pub fn label_propagation<R: Rng + ?Sized>(
    csr: &CsrGraph,
    steps: u32,
    rng: &mut R,
) -> DetectedCommunities {
    let mut labels: Vec<usize> = (0..csr.node_count()).collect();
    let mut counts = BTreeMap::new();
    for step in 0..steps {
        let mut changed = 0_usize;
        for slot in 0..labels.len() {
            if propagate(csr, &mut labels, slot, &mut counts, rng) {
                changed += 1;
            }
        }
        debug!(step, changed, "label propagation sweep");
        if changed == 0 {
            break;
        }
    }
    DetectedCommunities { labels }
}

fn propagate<R: Rng + ?Sized>(
    csr: &CsrGraph,
    labels: &mut [usize],
    slot: usize,
    counts: &mut BTreeMap<usize, usize>,
    rng: &mut R,
) -> bool {
    let Some(neighbours) = csr.neighbours(slot) else {
        return false;
    };
    counts.clear();
    for &target in neighbours {
        let label = usize::try_from(target)
            .ok()
            .and_then(|target| labels.get(target));
        if let Some(&label) = label {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    let Some(&best) = counts.values().max() else {
        return false;
    };
    let current = labels[slot];
    if counts.get(&current) == Some(&best) {
        return false;
    }

    let winners: Vec<usize> = counts
        .iter()
        .filter(|&(_, &count)| count == best)
        .map(|(&label, _)| label)
        .collect();
    let next = match winners.as_slice() {
        [only] => *only,
        tied => tied.choose(rng).copied().unwrap_or(current),
    };
    labels[slot] = next;
    true
}

/// Neighbourhood size of every slot, the simplest centrality ranking.
#[must_use]
pub fn rank_neighbourhood(csr: &CsrGraph) -> Vec<usize> {
    (0..csr.node_count())
        .map(|slot| csr.neighbours(slot).map_or(0, |targets| targets.len()))
        .collect()
}

impl GeneratedGraph {
    /// Encode as CSR and run [`label_propagation`] on it.
    ///
    /// # Errors
    /// Returns [`GraphIoError::CsrOverflow`] when the graph does not fit the
    /// CSR encoding.
    pub fn detect_communities<R: Rng + ?Sized>(
        &self,
        steps: u32,
        rng: &mut R,
    ) -> Result<DetectedCommunities, GraphIoError> {
        let csr = CsrGraph::from_graph(self)?;
        Ok(label_propagation(&csr, steps, rng))
    }
}
