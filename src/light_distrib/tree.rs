//! Photon KD Tree Light Distribution.

use super::{
    photon_emission_distribution, shoot_photons, InterpolationKernel, LightDistribution,
    LightSampleSettings, Photon,
};
use crate::base::*;
use crate::geometry::*;
use crate::kdtree::PointKdTree;
use crate::sampling::*;
use crate::scene::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of photons per kd-tree leaf for plain neighbour queries.
const MAX_LEAF_SIZE: usize = 10;

/// Estimates the light distribution at a point from the photons recorded
/// around it: a preprocess traces photons from the lights and indexes their
/// first hits in a kd-tree; each lookup gathers the nearest (or all
/// in-radius) photons and weights their flux by one of the distance
/// kernels. Every lookup allocates a fresh sparse distribution which is
/// freed when the caller drops it.
pub struct PhotonKdTreeLightDistribution {
    /// Photons that were stored on a surface.
    photons: Vec<Photon>,

    /// Kd-tree over the stored photon positions.
    kdtree: PointKdTree,

    /// Number of lights in the scene.
    n_lights: usize,

    /// Uniform floor mass of the per-query distributions.
    min_contribution_scale: Float,

    /// Number of photons fetched in k-NN mode.
    nearest_neighbours: usize,

    /// Gather radius in radius mode.
    photon_radius: Float,

    /// Use k-NN gathers; radius gathers otherwise.
    knn: bool,

    /// Distance weighting kernel.
    interpolation: InterpolationKernel,

    /// Kernel smoothing parameter.
    int_smooth: Float,
}

impl PhotonKdTreeLightDistribution {
    /// Create a new instance of `PhotonKdTreeLightDistribution`. Traces the
    /// configured number of photons and builds the photon kd-tree.
    ///
    /// * `settings` - The resolved light sample settings.
    /// * `scene`    - The scene.
    pub fn new(settings: &LightSampleSettings, scene: &Scene) -> Self {
        let photon_distrib = photon_emission_distribution(scene, settings.photon_sampling);
        let photons: Vec<Photon> = shoot_photons(scene, &photon_distrib, settings.photon_count)
            .into_iter()
            .filter(|ph| ph.light_num.is_some())
            .collect();
        let kdtree = PointKdTree::new(photons.iter().map(|ph| ph.p).collect(), MAX_LEAF_SIZE);

        Self {
            photons,
            kdtree,
            n_lights: scene.lights.len(),
            min_contribution_scale: settings.min_contribution_scale,
            nearest_neighbours: settings.nearest_neighbours,
            photon_radius: settings.photon_radius,
            knn: settings.knn,
            interpolation: settings.interpolation,
            int_smooth: settings.int_smooth,
        }
    }
}

impl LightDistribution for PhotonKdTreeLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        let matches = if self.knn {
            self.kdtree.nearest(p, self.nearest_neighbours)
        } else {
            self.kdtree.within_radius(p, self.photon_radius)
        };

        let light_contrib =
            gather_photon_contributions(&self.photons, &matches, self.interpolation, self.int_smooth);

        Arc::new(SparseDistribution1D::from_contributions(
            &light_contrib,
            self.min_contribution_scale,
            self.n_lights,
        ))
    }
}

/// Accumulates the kernel-weighted flux of the matched photons per source
/// light.
///
/// * `photons` - The photon cloud the matches index into.
/// * `matches` - `(photon index, squared distance)` pairs of the query.
/// * `kernel`  - Distance weighting kernel.
/// * `smooth`  - Kernel smoothing parameter.
pub(crate) fn gather_photon_contributions(
    photons: &[Photon],
    matches: &[(usize, Float)],
    kernel: InterpolationKernel,
    smooth: Float,
) -> HashMap<usize, Float> {
    let max_dist_squared = matches
        .iter()
        .fold(0.0, |acc, &(_, dist_squared)| max(acc, dist_squared));

    let mut light_contrib = HashMap::new();
    for &(index, dist_squared) in matches {
        let photon = &photons[index];
        if let Some(light_num) = photon.light_num {
            let weight = kernel.weight(dist_squared, max_dist_squared, smooth);
            *light_contrib.entry(light_num).or_insert(0.0) += weight * photon.beta;
        }
    }
    light_contrib
}
