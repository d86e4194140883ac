//! Power Light Distribution.

use super::LightDistribution;
use crate::base::*;
use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Returns a distribution over the scene's lights with weights proportional
/// to their total emitted power.
///
/// * `scene` - The scene.
pub fn compute_light_power_distribution(scene: &Scene) -> Distribution1D {
    let light_power: Vec<Float> = scene.lights.iter().map(|light| light.power().y()).collect();
    Distribution1D::new(light_power)
}

/// `PowerLightDistribution` returns a distribution with sampling probability
/// proportional to the total emitted power of each light. (It also ignores
/// the provided point `p`.) This approach works well for scenes where the
/// most powerful lights are also the most important contributors to
/// lighting in the scene, but doesn't do well if there are many lights and
/// different lights are relatively important in some areas of the scene and
/// unimportant in others.
pub struct PowerLightDistribution {
    distrib: Arc<Distribution1D>,
}

impl PowerLightDistribution {
    /// Create a new instance of `PowerLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        Self {
            distrib: Arc::new(compute_light_power_distribution(scene)),
        }
    }
}

impl LightDistribution for PowerLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, _p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        Arc::clone(&self.distrib) as ArcDistribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Spectrum;
    use crate::testutil::*;

    #[test]
    fn probabilities_are_proportional_to_emitted_power() {
        // Isotropic point lights with radiant powers in ratio 1 : 3 : 6.
        let scene = room_scene(vec![
            point_light(Point3f::new(0.2, 0.5, 0.5), Spectrum::splat(1.0)),
            point_light(Point3f::new(0.5, 0.5, 0.5), Spectrum::splat(3.0)),
            point_light(Point3f::new(0.8, 0.5, 0.5), Spectrum::splat(6.0)),
        ]);
        let distribution = PowerLightDistribution::new(&scene);
        let d = distribution.lookup(&Point3f::new(0.1, 0.1, 0.1), &Normal3f::ZERO);
        assert!((d.discrete_pdf(0) - 0.1).abs() < 1e-5);
        assert!((d.discrete_pdf(1) - 0.3).abs() < 1e-5);
        assert!((d.discrete_pdf(2) - 0.6).abs() < 1e-5);
    }
}
