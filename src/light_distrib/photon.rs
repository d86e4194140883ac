//! Photon Tracing.

use super::{compute_light_power_distribution, PhotonSampling};
use crate::base::*;
use crate::geometry::*;
use crate::light::*;
use crate::low_discrepancy::radical_inverse;
use crate::sampling::*;
use crate::scene::*;
use rayon::prelude::*;

/// Chunk size of the parallel preprocess loops.
pub(crate) const CHUNK_SIZE: usize = 4096;

/// A light particle recorded at its first surface hit.
#[derive(Clone, Debug)]
pub struct Photon {
    /// The recorded hit position.
    pub p: Point3f,

    /// Scalar flux carried by the photon: the spectrum's component sum
    /// after division by all sampling PDFs.
    pub beta: Float,

    /// The light the photon was emitted from, or `None` when the photon
    /// left the scene without hitting geometry.
    pub light_num: Option<usize>,

    /// Direction back towards the emitting light. Recorded for future
    /// orientation-aware gathering; no current strategy filters on it.
    pub from_dir: Vector3f,
}

impl Photon {
    /// Returns a photon slot marking a miss or degenerate emission sample.
    fn miss() -> Self {
        Self {
            p: Point3f::ZERO,
            beta: 0.0,
            light_num: None,
            from_dir: Vector3f::ZERO,
        }
    }
}

/// Returns the light selection distribution used for photon emission.
///
/// * `scene`    - The scene.
/// * `sampling` - The configured selection strategy.
pub fn photon_emission_distribution(scene: &Scene, sampling: PhotonSampling) -> Distribution1D {
    match sampling {
        PhotonSampling::Uniform => Distribution1D::new(vec![1.0; scene.lights.len()]),
        PhotonSampling::Power => compute_light_power_distribution(scene),
    }
}

/// Emits `photon_count` photons from the scene's lights and records each
/// one's first intersection. Photon `i` draws its samples from the Halton
/// sequence at index `i`, and each photon writes only its own slot, so the
/// result is deterministic and the loop needs no synchronisation. Photons
/// that miss all geometry or whose emission sample is degenerate occupy
/// their slot with `light_num == None`.
///
/// * `scene`          - The scene.
/// * `photon_distrib` - Light selection distribution for emission.
/// * `photon_count`   - Number of photons to trace.
pub fn shoot_photons(
    scene: &Scene,
    photon_distrib: &Distribution1D,
    photon_count: usize,
) -> Vec<Photon> {
    let mut photons = vec![Photon::miss(); photon_count];
    photons
        .par_chunks_mut(CHUNK_SIZE)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            for (i, slot) in chunk.iter_mut().enumerate() {
                let photon_index = chunk_index * CHUNK_SIZE + i;
                *slot = follow_photon(scene, photon_distrib, photon_index as u64);
            }
        });

    let hits = photons.iter().filter(|ph| ph.light_num.is_some()).count();
    info!("Traced {} photons, {} stored on surfaces", photon_count, hits);
    photons
}

/// Follows the photon path for `halton_index` up to its first intersection.
fn follow_photon(scene: &Scene, photon_distrib: &Distribution1D, halton_index: u64) -> Photon {
    let mut halton_dim = 0;

    // Choose light to shoot photon from.
    let light_sample = radical_inverse(halton_dim, halton_index);
    halton_dim += 1;
    let DiscreteSample {
        index: light_num,
        pdf: light_pdf,
        ..
    } = photon_distrib.sample_discrete(light_sample);
    if light_pdf == 0.0 {
        return Photon::miss();
    }
    let light = &scene.lights[light_num];

    // Compute sample values for photon ray leaving light source. Dimension
    // halton_dim + 4 is reserved for shutter time; the preprocess traces at
    // t = 0.
    let u_light_0 = Point2f::new(
        radical_inverse(halton_dim, halton_index),
        radical_inverse(halton_dim + 1, halton_index),
    );
    let u_light_1 = Point2f::new(
        radical_inverse(halton_dim + 2, halton_index),
        radical_inverse(halton_dim + 3, halton_index),
    );
    let u_light_time = 0.0;

    // Generate the photon ray from the light source and initialize `beta`.
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value: le,
    } = light.sample_le(&u_light_0, &u_light_1, u_light_time);
    if pdf_pos == 0.0 || pdf_dir == 0.0 || le.is_black() {
        return Photon::miss();
    }
    let beta = (n_light.abs_dot(&ray.d) * le) / (light_pdf * pdf_pos * pdf_dir);
    if beta.is_black() {
        return Photon::miss();
    }

    // Follow photon through the scene and record the first intersection.
    match scene.intersect(&ray) {
        Some(isect) => Photon {
            p: isect.p,
            beta: beta.sum_values(),
            light_num: Some(light_num),
            from_dir: -ray.d.normalize(),
        },
        None => Photon::miss(),
    }
}
