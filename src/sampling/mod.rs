//! Sampling distributions.

mod distribution_1d;
mod interpolated;
mod sparse;

// Re-export
pub use distribution_1d::*;
pub use interpolated::*;
pub use sparse::*;

use crate::base::*;
use std::sync::Arc;

/// Return value for `DiscreteDistribution::sample_discrete()`.
#[derive(Copy, Clone, Debug)]
pub struct DiscreteSample {
    /// The sampled index.
    pub index: usize,

    /// The probability of sampling that index.
    pub pdf: Float,

    /// The random remainder of `u` within the sampled CDF segment, rescaled
    /// to [0, 1) so the caller can reuse it. Only dense distributions can
    /// compute this; it is `None` for sparse and interpolated ones.
    pub u_remapped: Option<Float>,
}

/// A discrete probability distribution over `count()` indices that supports
/// inverse-CDF sampling and exact PDF evaluation. Light selection only ever
/// needs these three operations; continuous sampling is an inherent method
/// of the dense `Distribution1D` alone.
pub trait DiscreteDistribution: Send + Sync {
    /// Returns the number of indices in the distribution's domain.
    fn count(&self) -> usize;

    /// Samples an index from the distribution given a random sample.
    ///
    /// * `u` - Uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> DiscreteSample;

    /// Returns the probability of sampling a given index.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float;
}

/// Atomic reference counted `DiscreteDistribution`. Variants that cache
/// their distributions hand out clones of a stored `Arc`; variants that
/// build one per query hand out a freshly allocated one which is freed when
/// the caller drops it.
pub type ArcDistribution = Arc<dyn DiscreteDistribution>;
