//! Light

use crate::base::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::spectrum::*;
use std::sync::Arc;

/// Return value for `Light::sample_li()`.
#[derive(Clone)]
pub struct Li {
    /// Incident direction from the interaction point towards the light.
    pub wi: Vector3f,

    /// PDF of the sampled direction.
    pub pdf: Float,

    /// Radiance arriving at the interaction point, ignoring visibility.
    pub value: Spectrum,
}

impl Li {
    /// Return a new `Li`.
    ///
    /// * `wi`    - Incident direction.
    /// * `pdf`   - PDF.
    /// * `value` - Radiance arriving at the interaction point.
    pub fn new(wi: Vector3f, pdf: Float, value: Spectrum) -> Self {
        Self { wi, pdf, value }
    }
}

/// Return value for `Light::sample_le()`.
#[derive(Clone)]
pub struct Le {
    /// Ray leaving the light source.
    pub ray: Ray,

    /// Surface normal at the point on the light source.
    pub n_light: Normal3f,

    /// The ray origin's probability density with respect to surface area on
    /// the light.
    pub pdf_pos: Float,

    /// The ray direction's probability density with respect to solid angle.
    pub pdf_dir: Float,

    /// Emitted radiance value.
    pub value: Spectrum,
}

impl Le {
    /// Return a new `Le`.
    ///
    /// * `ray`     - Ray leaving the light source.
    /// * `n_light` - Surface normal at the point on the light source.
    /// * `pdf_pos` - The ray origin's probability density with respect to
    ///               surface area on the light.
    /// * `pdf_dir` - The ray direction's probability density with respect to
    ///               solid angle.
    /// * `value`   - Emitted radiance value.
    pub fn new(ray: Ray, n_light: Normal3f, pdf_pos: Float, pdf_dir: Float, value: Spectrum) -> Self {
        Self {
            ray,
            n_light,
            pdf_pos,
            pdf_dir,
            value,
        }
    }
}

/// The slice of the light interface the sampling distributions consume:
/// incident-radiance sampling for the spatial preprocess, emission sampling
/// for photon tracing and total power for power-weighted selection.
pub trait Light {
    /// Samples the radiance arriving at an interaction point from this light.
    /// Returns `None` when the light cannot illuminate the point.
    ///
    /// * `hit` - The interaction point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Option<Li>;

    /// Samples a radiance-carrying ray leaving the light source.
    ///
    /// * `u1`   - Sample values for the ray origin.
    /// * `u2`   - Sample values for the ray direction.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Le;

    /// Returns the total emitted power.
    fn power(&self) -> Spectrum;
}

/// Atomic reference counted `Light`.
pub type ArcLight = Arc<dyn Light + Send + Sync>;
