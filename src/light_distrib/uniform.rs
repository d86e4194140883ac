//! Uniform Light Distribution.

use super::LightDistribution;
use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// The simplest possible implementation of `LightDistribution`: this returns
/// a uniform distribution over all light sources, ignoring the provided
/// point. This approach works well for very simple scenes, but is quite
/// ineffective for scenes with more than a handful of light sources.
pub struct UniformLightDistribution {
    distrib: Arc<Distribution1D>,
}

impl UniformLightDistribution {
    /// Create a new instance of `UniformLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        let prob = vec![1.0; scene.lights.len()];
        Self {
            distrib: Arc::new(Distribution1D::new(prob)),
        }
    }
}

impl LightDistribution for UniformLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, _p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        Arc::clone(&self.distrib) as ArcDistribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Float;
    use crate::spectrum::Spectrum;
    use crate::testutil::*;

    #[test]
    fn every_light_gets_equal_probability() {
        let scene = room_scene(
            (0..4)
                .map(|i| {
                    point_light(
                        Point3f::new(0.2 + 0.2 * i as Float, 0.5, 0.5),
                        Spectrum::splat(1.0 + i as Float),
                    )
                })
                .collect(),
        );
        let distribution = UniformLightDistribution::new(&scene);
        let d = distribution.lookup(&Point3f::new(0.9, 0.1, 0.4), &Normal3f::ZERO);
        assert_eq!(d.count(), 4);
        for i in 0..4 {
            assert!((d.discrete_pdf(i) - 0.25).abs() < 1e-6);
        }
    }
}
