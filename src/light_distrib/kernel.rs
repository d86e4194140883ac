//! Interpolation Kernels.

use crate::base::*;

/// Distance weighting kernels applied to nearest-neighbour gathers over
/// photons or cluster centroids. Weights are computed from squared
/// neighbour distances; the adaptive kernels additionally normalise by the
/// farthest neighbour of the query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationKernel {
    /// Unweighted: every neighbour contributes equally.
    None,

    /// Inverse distance weighting: `1 / max(1e-3, d²ˢ)`.
    Shepard,

    /// Shepard's method modified to fall to zero at the query's farthest
    /// neighbour: `((Rˢ - d²ˢ) / (Rˢ · d²ˢ))²`.
    ModShepard,

    /// Gaussian kernel regression with fixed bandwidth `s`:
    /// `exp(-(d/s)²)`.
    KernelRegression,

    /// Gaussian kernel regression with the bandwidth adapted so the
    /// farthest neighbour's weight lands exactly on zero:
    /// `exp(-(d/p)²) - s` with `p = √R / √(-ln s)`.
    AdaptiveKernelRegression,
}

impl From<&str> for InterpolationKernel {
    /// Returns an `InterpolationKernel` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "none" => Self::None,
            "shepard" => Self::Shepard,
            "modshep" => Self::ModShepard,
            "kreg" => Self::KernelRegression,
            "adkreg" => Self::AdaptiveKernelRegression,
            _ => {
                error!("Interpolation kernel '{}' unknown. Using 'shepard'.", name);
                Self::Shepard
            }
        }
    }
}

impl InterpolationKernel {
    /// Returns the kernel's parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shepard => "shepard",
            Self::ModShepard => "modshep",
            Self::KernelRegression => "kreg",
            Self::AdaptiveKernelRegression => "adkreg",
        }
    }

    /// Returns the weight of a neighbour at squared distance `dist_squared`
    /// from the query point.
    ///
    /// * `dist_squared`     - Squared distance of the neighbour.
    /// * `max_dist_squared` - Squared distance of the query's farthest
    ///                        neighbour.
    /// * `smooth`           - Kernel smoothing parameter.
    pub fn weight(&self, dist_squared: Float, max_dist_squared: Float, smooth: Float) -> Float {
        match self {
            Self::None => 1.0,
            Self::Shepard => 1.0 / max(1e-3, dist_squared.powf(smooth)),
            Self::ModShepard => {
                let r = max_dist_squared.powf(smooth);
                let d = max(1e-3, dist_squared.powf(smooth));
                ((r - d) / (r * d)).powi(2)
            }
            Self::KernelRegression => {
                let d = dist_squared.sqrt();
                (-(d / smooth).powi(2)).exp()
            }
            Self::AdaptiveKernelRegression => {
                // The bandwidth is chosen so the weight is exactly zero at
                // the farthest neighbour; clamp keeps rounding from dipping
                // below.
                let r = max_dist_squared.sqrt();
                let p = r / (-smooth.ln()).sqrt();
                let d = dist_squared.sqrt();
                max(0.0, (-(d / p).powi(2)).exp() - smooth)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_ignores_distance() {
        let k = InterpolationKernel::None;
        assert_eq!(k.weight(0.0, 9.0, 1.0), 1.0);
        assert_eq!(k.weight(9.0, 9.0, 1.0), 1.0);
    }

    #[test]
    fn shepard_is_inverse_squared_distance() {
        let k = InterpolationKernel::Shepard;
        assert!((k.weight(4.0, 9.0, 1.0) - 0.25).abs() < 1e-6);
        // Distances below the clamp cannot blow up the weight.
        assert!((k.weight(0.0, 9.0, 1.0) - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn weights_decrease_with_distance() {
        for kernel in [
            InterpolationKernel::Shepard,
            InterpolationKernel::ModShepard,
            InterpolationKernel::KernelRegression,
            InterpolationKernel::AdaptiveKernelRegression,
        ] {
            let near = kernel.weight(0.25, 9.0, 0.5);
            let far = kernel.weight(4.0, 9.0, 0.5);
            assert!(near > far, "{:?}: {} !> {}", kernel, near, far);
            assert!(far >= 0.0);
        }
    }

    #[test]
    fn adaptive_regression_vanishes_at_the_farthest_neighbour() {
        let k = InterpolationKernel::AdaptiveKernelRegression;
        let w = k.weight(9.0, 9.0, 0.5);
        assert!(w.abs() < 1e-6);
    }

    #[test]
    fn unknown_name_falls_back_to_shepard() {
        assert_eq!(
            InterpolationKernel::from("nonsense"),
            InterpolationKernel::Shepard
        );
    }

    #[test]
    fn names_round_trip() {
        for kernel in [
            InterpolationKernel::None,
            InterpolationKernel::Shepard,
            InterpolationKernel::ModShepard,
            InterpolationKernel::KernelRegression,
            InterpolationKernel::AdaptiveKernelRegression,
        ] {
            assert_eq!(InterpolationKernel::from(kernel.name()), kernel);
        }
    }
}
