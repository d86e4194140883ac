//! Sparse 1D Distribution.

use super::{DiscreteDistribution, DiscreteSample, Distribution1D};
use crate::base::*;
use itertools::Itertools;
use std::collections::HashMap;

/// A discrete distribution over `n_all` indices of which only a few carry
/// explicit contributions, plus a uniform probability floor over all
/// indices. The dense tables only cover the nonzero entries, so memory and
/// construction cost scale with the number of contributing lights rather
/// than the scene's light count.
#[derive(Clone)]
pub struct SparseDistribution1D {
    /// Distribution over the nonzero contributions only.
    pub inner: Distribution1D,

    /// Maps a position in `inner` to the index it represents in [0, n_all).
    pub sample_map: Vec<usize>,

    /// Maps a represented index back to its position in `inner`.
    pub back_map: HashMap<usize, usize>,

    /// Probability mass assigned to the uniform floor.
    pub uni_prob: Float,

    /// Uniform floor probability of a single index: `uni_prob / n_all`.
    pub uni_prob_single: Float,

    /// Total number of indices the distribution ranges over.
    pub n_all: usize,
}

impl SparseDistribution1D {
    /// Builds a sparse distribution from a map of index to contribution.
    /// Entries with non-positive contributions are dropped. If no entry
    /// survives, the whole probability mass goes to the uniform floor.
    ///
    /// * `contrib_map` - Contribution per index.
    /// * `uni_prob`    - Probability mass of the uniform floor, in [0, 1].
    /// * `n_all`       - Total number of indices.
    pub fn from_contributions(
        contrib_map: &HashMap<usize, Float>,
        uni_prob: Float,
        n_all: usize,
    ) -> Self {
        assert!(n_all > 0);
        debug_assert!((0.0..=1.0).contains(&uni_prob));

        // Iterate the entries in index order so construction is
        // deterministic regardless of the map's internal layout.
        let entries: Vec<(usize, Float)> = contrib_map
            .iter()
            .filter(|(_, &contrib)| contrib > 0.0)
            .map(|(&index, &contrib)| (index, contrib))
            .sorted_by_key(|&(index, _)| index)
            .collect();

        let mut sample_map = Vec::with_capacity(entries.len());
        let mut back_map = HashMap::with_capacity(entries.len());
        let mut contrib = Vec::with_capacity(entries.len());
        for (i, &(index, c)) in entries.iter().enumerate() {
            debug_assert!(index < n_all);
            sample_map.push(index);
            back_map.insert(index, i);
            contrib.push(c);
        }

        let uni_prob = if contrib.is_empty() { 1.0 } else { uni_prob };
        Self {
            inner: Distribution1D::new(contrib),
            sample_map,
            back_map,
            uni_prob,
            uni_prob_single: uni_prob / n_all as Float,
            n_all,
        }
    }
}

impl DiscreteDistribution for SparseDistribution1D {
    /// Returns the total number of indices the distribution ranges over.
    fn count(&self) -> usize {
        self.n_all
    }

    /// Return a sample from the discrete distribution given a random sample.
    /// The random sample first decides between the uniform floor and the
    /// sparse part, then is rescaled and reused within the chosen part.
    ///
    /// * `u` - Uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> DiscreteSample {
        let index = if self.inner.count() == 0 || self.uni_prob >= 1.0 || u > 1.0 - self.uni_prob {
            // Sample from the uniform part. new_u lives in [0, 1) but can
            // reach 1.0 through floating point rounding.
            let new_u = (u - (1.0 - self.uni_prob)) / self.uni_prob;
            min((new_u * self.n_all as Float) as usize, self.n_all - 1)
        } else {
            // Sample from the sparse part.
            let new_u = u / (1.0 - self.uni_prob);
            self.sample_map[self.inner.sample_discrete(new_u).index]
        };

        DiscreteSample {
            index,
            pdf: self.discrete_pdf(index),
            u_remapped: None,
        }
    }

    /// Return the PDF for sampling a given index: its share of the uniform
    /// floor plus, for indices with explicit contributions, their share of
    /// the sparse part.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float {
        debug_assert!(index < self.count());
        let mut pdf = self.uni_prob_single;
        if let Some(&i) = self.back_map.get(&index) {
            pdf += self.inner.discrete_pdf(i) * (1.0 - self.uni_prob);
        }
        pdf
    }
}
