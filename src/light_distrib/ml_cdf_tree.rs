//! K-Means Cluster KD Tree Light Distribution.

use super::{
    photon_emission_distribution, shoot_photons, InterpolationKernel, LightDistribution,
    LightSampleSettings, Photon,
};
use super::cdf_tree::Cluster;
use crate::base::*;
use crate::clustering::k_means_lloyd;
use crate::geometry::*;
use crate::kdtree::PointKdTree;
use crate::sampling::*;
use crate::scene::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of centroids per kd-tree leaf of the centroid tree.
const CENTROID_MAX_LEAF_SIZE: usize = 10;

/// Upper bound on Lloyd iterations during clustering.
const MAX_KMEANS_ITERATIONS: usize = 100;

/// Like `CdfKdTreeLightDistribution`, but the photon clusters come from
/// k-means over the photon positions instead of kd-tree leaves, and lookups
/// weight the nearest cluster distributions purely by inverse squared
/// distance.
pub struct MlCdfKdTreeLightDistribution {
    /// The photon clusters, one per k-means mean.
    clusters: Vec<Cluster>,

    /// Kd-tree over the cluster centroids.
    centroid_tree: PointKdTree,

    /// Fallback distribution when no photon hit geometry.
    default_distrib: Arc<Distribution1D>,

    /// Number of cluster centroids fetched per lookup.
    kn_cdf: usize,
}

impl MlCdfKdTreeLightDistribution {
    /// Create a new instance of `MlCdfKdTreeLightDistribution`. Traces the
    /// configured number of photons and clusters their positions with
    /// `cdf_count` means.
    ///
    /// * `settings` - The resolved light sample settings.
    /// * `scene`    - The scene.
    pub fn new(settings: &LightSampleSettings, scene: &Scene) -> Self {
        assert!(
            settings.knn,
            "mlcdftree supports only k-NN lookups over cluster centroids"
        );

        let n_lights = scene.lights.len();
        let photon_distrib = photon_emission_distribution(scene, settings.photon_sampling);
        let photons: Vec<Photon> = shoot_photons(scene, &photon_distrib, settings.photon_count)
            .into_iter()
            .filter(|ph| ph.light_num.is_some())
            .collect();

        let positions: Vec<Point3f> = photons.iter().map(|ph| ph.p).collect();
        let (means, labels) = k_means_lloyd(&positions, settings.cdf_count, MAX_KMEANS_ITERATIONS);

        // Pool each cluster's flux by source light.
        let mut light_contribs: Vec<HashMap<usize, Float>> = vec![HashMap::new(); means.len()];
        let mut weights = vec![0_usize; means.len()];
        for (photon, &label) in photons.iter().zip(labels.iter()) {
            if let Some(light_num) = photon.light_num {
                *light_contribs[label].entry(light_num).or_insert(0.0) += photon.beta;
                weights[label] += 1;
            }
        }

        let clusters: Vec<Cluster> = means
            .iter()
            .enumerate()
            .map(|(i, &mean)| Cluster {
                centroid: mean,
                distribution: Arc::new(SparseDistribution1D::from_contributions(
                    &light_contribs[i],
                    settings.min_contribution_scale,
                    n_lights,
                )),
                weight: weights[i],
            })
            .collect();
        info!(
            "MlCdfKdTreeLightDistribution: {} photons in {} clusters",
            photons.len(),
            clusters.len()
        );

        let centroid_tree = PointKdTree::new(
            clusters.iter().map(|c| c.centroid).collect(),
            CENTROID_MAX_LEAF_SIZE,
        );

        Self {
            clusters,
            centroid_tree,
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            kn_cdf: settings.kn_cdf,
        }
    }
}

impl LightDistribution for MlCdfKdTreeLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        let matches = self.centroid_tree.nearest(p, self.kn_cdf);
        if matches.is_empty() {
            return Arc::clone(&self.default_distrib) as ArcDistribution;
        }

        let mut distributions: Vec<ArcDistribution> = Vec::with_capacity(matches.len());
        let mut influence: Vec<Float> = Vec::with_capacity(matches.len());
        for &(index, dist_squared) in &matches {
            distributions.push(Arc::clone(&self.clusters[index].distribution) as ArcDistribution);
            influence.push(InterpolationKernel::Shepard.weight(dist_squared, dist_squared, 1.0));
        }

        Arc::new(InterpolatedDistribution1D::new(influence, distributions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Spectrum;
    use crate::testutil::*;

    fn corner_scene() -> Scene {
        room_scene(vec![
            point_light(Point3f::new(0.1, 0.1, 0.1), Spectrum::splat(4.0)),
            point_light(Point3f::new(0.9, 0.9, 0.9), Spectrum::splat(4.0)),
        ])
    }

    #[test]
    fn clusters_cover_every_stored_photon() {
        let scene = corner_scene();
        let settings = test_settings(|s| {
            s.photon_count = 2048;
            s.cdf_count = 16;
        });
        let distribution = MlCdfKdTreeLightDistribution::new(&settings, &scene);

        let clustered: usize = distribution.clusters.iter().map(|c| c.weight).sum();
        assert_eq!(clustered, 2048);
    }

    #[test]
    fn lookup_favours_the_nearby_light() {
        let scene = corner_scene();
        let settings = test_settings(|s| {
            s.photon_count = 8192;
            s.cdf_count = 32;
            s.kn_cdf = 4;
        });
        let distribution = MlCdfKdTreeLightDistribution::new(&settings, &scene);

        let d = distribution.lookup(&Point3f::new(0.05, 0.05, 0.05), &Normal3f::ZERO);
        assert_eq!(d.count(), 2);
        let sum: Float = (0..d.count()).map(|i| d.discrete_pdf(i)).sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(d.discrete_pdf(0) > d.discrete_pdf(1));
    }
}
