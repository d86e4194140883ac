//! Interpolated 1D Distribution.

use super::{ArcDistribution, DiscreteDistribution, DiscreteSample, Distribution1D};
use crate::base::*;

/// Samples a weighted mixture of several distributions without materialising
/// the blend. Construction takes O(m) and lookup O(m + log n) for m mixed
/// distributions over n elements each; merging the tables up front would
/// cost O(m * n).
///
/// All children must range over the same n indices with the same index
/// meaning: index `i` refers to the same light in every child.
pub struct InterpolatedDistribution1D {
    /// Distribution over the mixing weights.
    pub mix: Distribution1D,

    /// The mixed distributions.
    pub distributions: Vec<ArcDistribution>,
}

impl InterpolatedDistribution1D {
    /// Creates a new mixture of the given distributions.
    ///
    /// * `weights`       - Unnormalised mixing weight per distribution.
    /// * `distributions` - The distributions to mix.
    pub fn new(weights: Vec<Float>, distributions: Vec<ArcDistribution>) -> Self {
        assert!(!distributions.is_empty());
        debug_assert_eq!(weights.len(), distributions.len());
        debug_assert!(
            distributions
                .iter()
                .all(|d| d.count() == distributions[0].count()),
            "mixed distributions must range over the same indices"
        );

        Self {
            mix: Distribution1D::new(weights),
            distributions,
        }
    }
}

impl DiscreteDistribution for InterpolatedDistribution1D {
    /// Returns the common count of the mixed distributions.
    fn count(&self) -> usize {
        self.distributions[0].count()
    }

    /// Return a sample from the mixture given a random sample: pick a
    /// distribution by weight, then reuse the rescaled random remainder to
    /// sample within it.
    ///
    /// * `u` - Uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> DiscreteSample {
        // `offset` is the sampled distribution within which we sample further.
        let cdf = &self.mix.cdf;
        let offset = find_interval(cdf.len(), |index| cdf[index] <= u);

        // Rescale u to [0, 1) within the sampled segment. The division can
        // reach 1.0 through floating point rounding.
        let mut u_sub = u - cdf[offset];
        if cdf[offset + 1] - cdf[offset] > 0.0 {
            u_sub /= cdf[offset + 1] - cdf[offset];
        }
        if u_sub >= 1.0 {
            u_sub = ONE_MINUS_EPSILON;
        }

        let index = self.distributions[offset].sample_discrete(u_sub).index;

        DiscreteSample {
            index,
            pdf: self.discrete_pdf(index),
            u_remapped: None,
        }
    }

    /// Return the PDF for sampling a given index: the weighted sum of the
    /// children's PDFs for that index.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float {
        let cdf = &self.mix.cdf;
        let mut pdf = 0.0;
        for (i, distribution) in self.distributions.iter().enumerate() {
            pdf += distribution.discrete_pdf(index) * (cdf[i + 1] - cdf[i]);
        }
        pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use proptest::prelude::*;

    fn dense(f: Vec<Float>) -> ArcDistribution {
        Arc::new(Distribution1D::new(f))
    }

    #[test]
    fn pdf_is_weighted_sum_of_children() {
        let d = InterpolatedDistribution1D::new(
            vec![0.25, 0.75],
            vec![dense(vec![1.0, 0.0, 0.0]), dense(vec![0.0, 0.0, 1.0])],
        );
        assert!((d.discrete_pdf(0) - 0.25).abs() < 1e-6);
        assert!((d.discrete_pdf(1) - 0.0).abs() < 1e-6);
        assert!((d.discrete_pdf(2) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn count_is_the_common_child_count() {
        let d = InterpolatedDistribution1D::new(
            vec![1.0, 1.0],
            vec![dense(vec![1.0, 2.0, 3.0]), dense(vec![3.0, 2.0, 1.0])],
        );
        assert_eq!(d.count(), 3);
    }

    #[test]
    fn sampling_follows_the_mixing_weights() {
        let d = InterpolatedDistribution1D::new(
            vec![1.0, 3.0],
            vec![dense(vec![1.0, 0.0]), dense(vec![0.0, 1.0])],
        );
        // u = 0.1 lands in the first (weight 0.25) segment.
        let s = d.sample_discrete(0.1);
        assert_eq!(s.index, 0);
        assert!((s.pdf - 0.25).abs() < 1e-6);
        // u = 0.9 lands in the second segment.
        let s = d.sample_discrete(0.9);
        assert_eq!(s.index, 1);
        assert!((s.pdf - 0.75).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn pdf_sums_to_one(
            w in prop::collection::vec(0.01f32..10.0, 1..6),
            n in 1usize..8,
        ) {
            let children: Vec<ArcDistribution> = (0..w.len())
                .map(|i| dense((0..n).map(|j| ((i + j) % n) as Float + 0.5).collect()))
                .collect();
            let d = InterpolatedDistribution1D::new(w, children);
            let sum: Float = (0..n).map(|i| d.discrete_pdf(i)).sum();
            prop_assert!((sum - 1.0).abs() < 1e-4);
        }

        #[test]
        fn mixture_law_holds(
            w0 in 0.01f32..10.0,
            w1 in 0.01f32..10.0,
            index in 0usize..4,
        ) {
            let a = dense(vec![1.0, 2.0, 3.0, 4.0]);
            let b = dense(vec![4.0, 3.0, 2.0, 1.0]);
            let expected = (w0 * a.discrete_pdf(index) + w1 * b.discrete_pdf(index)) / (w0 + w1);
            let d = InterpolatedDistribution1D::new(vec![w0, w1], vec![a, b]);
            prop_assert!((d.discrete_pdf(index) - expected).abs() < 1e-4);
        }
    }
}
