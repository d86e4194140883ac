//! Light Distribution.

mod cdf_tree;
mod grid;
mod kernel;
mod ml_cdf_tree;
mod photon;
mod power;
mod spatial;
mod tree;
mod uniform;
mod voxel;

pub use cdf_tree::*;
pub use grid::*;
pub use kernel::*;
pub use ml_cdf_tree::*;
pub use photon::*;
pub use power::*;
pub use spatial::*;
pub use tree::*;
pub use uniform::*;
pub use voxel::*;

use crate::base::*;
use crate::geometry::*;
use crate::paramset::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSampleStrategy {
    /// Sample all light sources uniformly.
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,

    /// Estimates light contributions per voxel with point samples, lazily
    /// as voxels are first looked up.
    Spatial,

    /// Accumulates traced photons into per-voxel distributions during a
    /// preprocess.
    PhotonVoxel,

    /// Gathers nearby traced photons from a kd-tree per lookup.
    PhotonTree,

    /// Pre-clusters traced photons by kd-tree leaf and mixes the nearest
    /// cluster distributions per lookup.
    CdfTree,

    /// Pre-clusters traced photons with k-means and mixes the nearest
    /// cluster distributions per lookup.
    MlCdfTree,
}

impl From<&str> for LightSampleStrategy {
    /// Returns a `LightSampleStrategy` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "power" => Self::Power,
            "spatial" => Self::Spatial,
            "photonvoxel" => Self::PhotonVoxel,
            "photontree" => Self::PhotonTree,
            "cdftree" => Self::CdfTree,
            "mlcdftree" => Self::MlCdfTree,
            _ => {
                error!(
                    "Light sample distribution type '{}' unknown. Using 'spatial'.",
                    name
                );
                Self::Spatial
            }
        }
    }
}

impl LightSampleStrategy {
    /// Returns the strategy's parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Power => "power",
            Self::Spatial => "spatial",
            Self::PhotonVoxel => "photonvoxel",
            Self::PhotonTree => "photontree",
            Self::CdfTree => "cdftree",
            Self::MlCdfTree => "mlcdftree",
        }
    }
}

/// Light selection strategy for photon emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhotonSampling {
    /// Emit the same number of photons from every light.
    Uniform,

    /// Emit photons proportionally to each light's emitted power.
    Power,
}

impl From<&str> for PhotonSampling {
    /// Returns a `PhotonSampling` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "uni" => Self::Uniform,
            "power" => Self::Power,
            _ => {
                error!("Photon sampling type '{}' unknown. Using 'uni'.", name);
                Self::Uniform
            }
        }
    }
}

/// The fully resolved configuration of a light sample distribution. The
/// factory returns this record alongside the distribution so callers can
/// stamp the effective settings into output file names without relying on
/// global state.
#[derive(Clone, Debug)]
pub struct LightSampleSettings {
    /// Selected strategy.
    pub strategy: LightSampleStrategy,

    /// Light selection used for photon emission.
    pub photon_sampling: PhotonSampling,

    /// Number of photons traced by the preprocess.
    pub photon_count: usize,

    /// Voxel resolution of the widest scene bound dimension.
    pub max_voxels: usize,

    /// Uniform floor mass of the sparse per-region distributions.
    pub min_contribution_scale: Float,

    /// Blend photon-voxel lookups trilinearly with their neighbour voxels.
    pub interpolate_cdf: bool,

    /// Number of photons fetched per photon-tree lookup in k-NN mode.
    pub nearest_neighbours: usize,

    /// Gather radius per photon-tree lookup in radius mode.
    pub photon_radius: Float,

    /// Use k-NN gathers; radius gathers otherwise.
    pub knn: bool,

    /// Distance weighting kernel for neighbour gathers.
    pub interpolation: InterpolationKernel,

    /// Kernel smoothing parameter.
    pub int_smooth: Float,

    /// Number of photon clusters for the cluster-based strategies.
    pub cdf_count: usize,

    /// Number of cluster centroids fetched per cluster-tree lookup.
    pub kn_cdf: usize,

    /// Minimum photons per kd-tree leaf cluster.
    pub photon_threshold: usize,
}

impl LightSampleSettings {
    /// Resolves the settings from a parameter set, applying the documented
    /// defaults. The cluster count default depends on the strategy: k-means
    /// clustering supports far more clusters than kd-tree leaves.
    ///
    /// * `params` - The parameters.
    pub fn from_params(params: &ParamSet) -> Self {
        let strategy = LightSampleStrategy::from(
            params
                .find_one_string("lightsamplestrategy", String::from("spatial"))
                .as_str(),
        );
        let cdf_count_default = match strategy {
            LightSampleStrategy::MlCdfTree => 264,
            _ => 8,
        };
        Self {
            strategy,
            photon_sampling: PhotonSampling::from(
                params
                    .find_one_string("photonsampling", String::from("uni"))
                    .as_str(),
            ),
            photon_count: params.find_one_int("photonCount", 100_000) as usize,
            max_voxels: params.find_one_int("maxVoxels", 64) as usize,
            min_contribution_scale: params.find_one_float("minContributionScale", 0.001),
            interpolate_cdf: params.find_one_bool("interpolateCdf", true),
            nearest_neighbours: params.find_one_int("nearestNeighbours", 50) as usize,
            photon_radius: params.find_one_float("photonRadius", 0.1),
            knn: params.find_one_bool("knn", true),
            interpolation: InterpolationKernel::from(
                params
                    .find_one_string("interpolation", String::from("shepard"))
                    .as_str(),
            ),
            int_smooth: params.find_one_float("intSmooth", 1.0),
            cdf_count: params.find_one_int("cdfCount", cdf_count_default) as usize,
            kn_cdf: params.find_one_int("knCdf", 16) as usize,
            photon_threshold: params.find_one_int("photonThreshold", 15) as usize,
        }
    }
}

/// Interface of light distribution implementations that provide probability
/// distributions for sampling light sources at a given point in space.
pub trait LightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    /// The normal is unused by all current strategies and reserved for
    /// cosine-weighted variants.
    fn lookup(&self, p: &Point3f, n: &Normal3f) -> ArcDistribution;
}

/// Atomic reference counted `LightDistribution`.
pub type ArcLightDistribution = Arc<dyn LightDistribution + Send + Sync>;

/// Returns a new `LightDistribution` implementation for the given
/// parameters, together with the resolved settings it was built from.
///
/// * `params` - The parameters.
/// * `scene`  - The scene.
pub fn create_light_sample_distribution(
    params: &ParamSet,
    scene: &Scene,
) -> (ArcLightDistribution, LightSampleSettings) {
    let mut settings = LightSampleSettings::from_params(params);
    if scene.lights.len() == 1 {
        settings.strategy = LightSampleStrategy::Uniform;
    }

    let distribution: ArcLightDistribution = match settings.strategy {
        LightSampleStrategy::Uniform => Arc::new(UniformLightDistribution::new(scene)),
        LightSampleStrategy::Power => Arc::new(PowerLightDistribution::new(scene)),
        LightSampleStrategy::Spatial => {
            Arc::new(SpatialLightDistribution::new(scene, settings.max_voxels))
        }
        LightSampleStrategy::PhotonVoxel => {
            Arc::new(PhotonVoxelLightDistribution::new(&settings, scene))
        }
        LightSampleStrategy::PhotonTree => {
            Arc::new(PhotonKdTreeLightDistribution::new(&settings, scene))
        }
        LightSampleStrategy::CdfTree => Arc::new(CdfKdTreeLightDistribution::new(&settings, scene)),
        LightSampleStrategy::MlCdfTree => {
            Arc::new(MlCdfKdTreeLightDistribution::new(&settings, scene))
        }
    };

    (distribution, settings)
}
