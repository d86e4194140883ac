//! Cluster KD Tree Light Distribution.

use super::{
    photon_emission_distribution, shoot_photons, InterpolationKernel, LightDistribution,
    LightSampleSettings, Photon,
};
use crate::base::*;
use crate::geometry::*;
use crate::kdtree::PointKdTree;
use crate::sampling::*;
use crate::scene::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of centroids per kd-tree leaf of the centroid tree.
const CENTROID_MAX_LEAF_SIZE: usize = 10;

/// A group of photons aggregated into one reusable distribution.
pub(crate) struct Cluster {
    /// Mean position of the clustered photons.
    pub centroid: Point3f,

    /// Distribution over the lights the clustered photons came from.
    pub distribution: Arc<SparseDistribution1D>,

    /// Number of photons in the cluster.
    pub weight: usize,
}

/// Aggregates the given photons into one cluster. Returns `None` when the
/// group is empty.
pub(crate) fn aggregate_cluster(
    photons: &[Photon],
    members: &[usize],
    min_contribution_scale: Float,
    n_lights: usize,
) -> Option<Cluster> {
    if members.is_empty() {
        return None;
    }

    let mut centroid_sum = Vector3f::ZERO;
    let mut light_contrib: HashMap<usize, Float> = HashMap::new();
    for &i in members {
        let photon = &photons[i];
        if let Some(light_num) = photon.light_num {
            centroid_sum = centroid_sum + (photon.p - Point3f::ZERO);
            *light_contrib.entry(light_num).or_insert(0.0) += photon.beta;
        }
    }

    Some(Cluster {
        centroid: Point3f::ZERO + centroid_sum / members.len() as Float,
        distribution: Arc::new(SparseDistribution1D::from_contributions(
            &light_contrib,
            min_contribution_scale,
            n_lights,
        )),
        weight: members.len(),
    })
}

/// Pre-clusters the traced photons using the leaves of a coarse photon
/// kd-tree, aggregates each cluster into one sparse distribution and
/// indexes the cluster centroids in a second kd-tree. Lookups fetch the
/// nearest centroids and mix their distributions, weighted by the distance
/// kernel and each cluster's photon count. Compared to gathering raw
/// photons per lookup, the per-cluster distributions are built once and
/// shared.
pub struct CdfKdTreeLightDistribution {
    /// The surviving photon clusters.
    clusters: Vec<Cluster>,

    /// Kd-tree over the cluster centroids.
    centroid_tree: PointKdTree,

    /// Fallback distribution when no cluster survived the photon threshold.
    default_distrib: Arc<Distribution1D>,

    /// Number of cluster centroids fetched per lookup.
    kn_cdf: usize,

    /// Distance weighting kernel.
    interpolation: InterpolationKernel,

    /// Kernel smoothing parameter.
    int_smooth: Float,
}

impl CdfKdTreeLightDistribution {
    /// Create a new instance of `CdfKdTreeLightDistribution`. Traces the
    /// configured number of photons, clusters them by kd-tree leaf and
    /// drops clusters with too few photons.
    ///
    /// * `settings` - The resolved light sample settings.
    /// * `scene`    - The scene.
    pub fn new(settings: &LightSampleSettings, scene: &Scene) -> Self {
        assert!(
            settings.knn,
            "cdftree supports only k-NN lookups over cluster centroids"
        );

        let n_lights = scene.lights.len();
        let photon_distrib = photon_emission_distribution(scene, settings.photon_sampling);
        let photons: Vec<Photon> = shoot_photons(scene, &photon_distrib, settings.photon_count)
            .into_iter()
            .filter(|ph| ph.light_num.is_some())
            .collect();

        // Build a coarse kd-tree whose leaves are the photon clusters.
        let max_leaf_size = max(1, settings.photon_count / max(1, settings.cdf_count));
        let photon_tree =
            PointKdTree::new(photons.iter().map(|ph| ph.p).collect(), max_leaf_size);

        let clusters: Vec<Cluster> = photon_tree
            .leaves()
            .par_iter()
            .filter_map(|leaf| {
                if leaf.len() <= settings.photon_threshold {
                    return None;
                }
                aggregate_cluster(
                    &photons,
                    leaf,
                    settings.min_contribution_scale,
                    n_lights,
                )
            })
            .collect();
        info!(
            "CdfKdTreeLightDistribution: {} photons in {} clusters",
            photons.len(),
            clusters.len()
        );
        if clusters.is_empty() {
            warn!("No photon cluster met the photon threshold; lookups fall back to uniform");
        }

        let centroid_tree = PointKdTree::new(
            clusters.iter().map(|c| c.centroid).collect(),
            CENTROID_MAX_LEAF_SIZE,
        );

        Self {
            clusters,
            centroid_tree,
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            kn_cdf: settings.kn_cdf,
            interpolation: settings.interpolation,
            int_smooth: settings.int_smooth,
        }
    }
}

impl LightDistribution for CdfKdTreeLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        let matches = self.centroid_tree.nearest(p, self.kn_cdf);
        if matches.is_empty() {
            return Arc::clone(&self.default_distrib) as ArcDistribution;
        }

        let max_dist_squared = matches
            .iter()
            .fold(0.0, |acc, &(_, dist_squared)| max(acc, dist_squared));

        let mut distributions: Vec<ArcDistribution> = Vec::with_capacity(matches.len());
        let mut influence: Vec<Float> = Vec::with_capacity(matches.len());
        for &(index, dist_squared) in &matches {
            let cluster = &self.clusters[index];
            distributions.push(Arc::clone(&cluster.distribution) as ArcDistribution);
            influence.push(
                cluster.weight as Float
                    * self
                        .interpolation
                        .weight(dist_squared, max_dist_squared, self.int_smooth),
            );
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
    fn aggregation_pools_flux_by_source_light() {
        let photons = vec![
            Photon {
                p: Point3f::new(0.0, 0.0, 0.0),
                beta: 1.0,
                light_num: Some(0),
                from_dir: Vector3f::ZERO,
            },
            Photon {
                p: Point3f::new(2.0, 0.0, 0.0),
                beta: 3.0,
                light_num: Some(0),
                from_dir: Vector3f::ZERO,
            },
            Photon {
                p: Point3f::new(1.0, 3.0, 0.0),
                beta: 4.0,
                light_num: Some(1),
                from_dir: Vector3f::ZERO,
            },
        ];
        let cluster = aggregate_cluster(&photons, &[0, 1, 2], 0.0, 2).unwrap();

        assert_eq!(cluster.weight, 3);
        assert_eq!(cluster.centroid, Point3f::new(1.0, 1.0, 0.0));
        assert!((cluster.distribution.discrete_pdf(0) - 0.5).abs() < 1e-6);
        assert!((cluster.distribution.discrete_pdf(1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clusters_below_the_photon_threshold_are_dropped() {
        let scene = corner_scene();
        // Leaf size is ~photon_count / cdf_count = 16, below the threshold,
        // so every cluster is dropped and lookups use the fallback.
        let settings = test_settings(|s| {
            s.photon_count = 128;
            s.cdf_count = 8;
            s.photon_threshold = 1000;
        });
        let distribution = CdfKdTreeLightDistribution::new(&settings, &scene);
        assert!(distribution.clusters.is_empty());

        let d = distribution.lookup(&Point3f::new(0.5, 0.5, 0.5), &Normal3f::ZERO);
        assert!((d.discrete_pdf(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lookup_mixes_nearby_cluster_distributions() {
        let scene = corner_scene();
        let settings = test_settings(|s| {
            s.photon_count = 8192;
            s.cdf_count = 16;
            s.kn_cdf = 4;
            s.photon_threshold = 15;
        });
        let distribution = CdfKdTreeLightDistribution::new(&settings, &scene);
        assert!(!distribution.clusters.is_empty());

        let d = distribution.lookup(&Point3f::new(0.05, 0.05, 0.05), &Normal3f::ZERO);
        assert_eq!(d.count(), 2);
        let sum: Float = (0..d.count()).map(|i| d.discrete_pdf(i)).sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(d.discrete_pdf(0) > d.discrete_pdf(1));
    }

    #[test]
    #[should_panic]
    fn radius_mode_is_rejected_at_construction() {
        let scene = corner_scene();
        let settings = test_settings(|s| {
            s.photon_count = 64;
            s.knn = false;
        });
        let _ = CdfKdTreeLightDistribution::new(&settings, &scene);
    }
}
