//! Spatial Light Distribution.

use super::{LightDistribution, VoxelGrid, INVALID_PACKED_POS};
use crate::base::*;
use crate::geometry::*;
use crate::interaction::Hit;
use crate::light::*;
use crate::low_discrepancy::radical_inverse;
use crate::sampling::*;
use crate::scene::*;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Number of Halton-distributed points sampled inside a voxel when its
/// distribution is computed.
const N_SAMPLES: usize = 128;

/// One slot of the voxel cache. Slots are claimed by storing the packed
/// voxel coordinates; a claimed slot with an empty distribution is still
/// being built by the claiming thread.
struct HashEntry {
    packed_pos: AtomicU64,
    distribution: ArcSwapOption<Distribution1D>,
}

impl Default for HashEntry {
    /// Returns the "default value" for `HashEntry`.
    fn default() -> Self {
        Self {
            packed_pos: AtomicU64::new(INVALID_PACKED_POS),
            distribution: ArcSwapOption::const_empty(),
        }
    }
}

/// A spatially-varying light distribution that adjusts the probability of
/// sampling a light source based on an estimate of its contribution to a
/// region of space. A fixed voxel grid is imposed over the scene bounds and
/// a sampling distribution is computed as needed for each voxel.
pub struct SpatialLightDistribution {
    lights: Vec<ArcLight>,
    grid: VoxelGrid,
    hash_table: Vec<HashEntry>,
}

impl SpatialLightDistribution {
    /// Create a new instance of `SpatialLightDistribution`.
    ///
    /// * `scene`      - The scene.
    /// * `max_voxels` - Maximum number of voxels (defaults to 64).
    pub fn new(scene: &Scene, max_voxels: usize) -> Self {
        let grid = VoxelGrid::new(scene.world_bound, max_voxels);
        let res = grid.resolution();
        info!(
            "SpatialLightDistribution: scene bounds {}, voxel res ({}, {}, {})",
            scene.world_bound, res[0], res[1], res[2]
        );

        let hash_table_size = 4 * grid.voxel_count();
        Self {
            lights: scene.lights.iter().map(Arc::clone).collect(),
            grid,
            hash_table: (0..hash_table_size).map(|_| HashEntry::default()).collect(),
        }
    }

    /// Compute the sampling distribution for the voxel with integer
    /// coordinates given by `pi`.
    fn compute_distribution(&self, pi: &Point3i) -> Distribution1D {
        // Compute the sampling distribution. Sample a number of points
        // inside the voxel's bounds using a 3D Halton sequence; at each one,
        // sample each light source and compute a weight based on Li/pdf for
        // the light's sample (ignoring visibility between the point in the
        // voxel and the point on the light source) as an approximation to
        // how much the light is likely to contribute to illumination in the
        // voxel.
        let voxel_bounds = self.grid.voxel_bounds(pi);
        let n_lights = self.lights.len();
        let mut light_contrib = vec![0.0; n_lights];
        for i in 0..N_SAMPLES {
            let po = voxel_bounds.lerp(&Point3f::new(
                radical_inverse(0, i as u64),
                radical_inverse(1, i as u64),
                radical_inverse(2, i as u64),
            ));
            let intr = Hit::new(po, 0.0, Vector3f::new(1.0, 0.0, 0.0), Normal3f::ZERO);

            // Use the next two Halton dimensions to sample a point on the
            // light source.
            let u = Point2f::new(radical_inverse(3, i as u64), radical_inverse(4, i as u64));
            for (j, light) in self.lights.iter().enumerate() {
                if let Some(li) = light.sample_li(&intr, &u) {
                    if li.pdf > 0.0 {
                        // TODO: look at tracing shadow rays / computing beam
                        // transmittance. Probably shouldn't give those full
                        // weight but instead e.g. have an occluded shadow ray
                        // scale down the contribution by 10 or something.
                        light_contrib[j] += li.value.y() / li.pdf;
                    }
                }
            }
        }

        // We don't want to leave any lights with a zero probability; it's
        // possible that a light contributes to points in the voxel even
        // though we didn't find such a point when sampling above. Therefore,
        // compute a minimum (small) weight and ensure that all lights are
        // given at least the corresponding probability.
        let sum_contrib: Float = light_contrib.iter().sum();
        let avg_contrib = sum_contrib / (N_SAMPLES * light_contrib.len()) as Float;
        let min_contrib = if avg_contrib > 0.0 { 0.001 * avg_contrib } else { 1.0 };
        for (i, contrib) in light_contrib.iter_mut().enumerate() {
            debug!("Voxel pi = {pi}, light {i} contrib = {contrib}");
            *contrib = max(*contrib, min_contrib);
        }
        info!("Initialized light distribution in voxel pi = {pi}, avgContrib = {avg_contrib}");

        // Compute a sampling distribution from the accumulated
        // contributions.
        Distribution1D::new(light_contrib)
    }
}

impl LightDistribution for SpatialLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        // First, compute integer voxel coordinates for the given point `p`
        // with respect to the overall voxel grid and pack them into a single
        // 64-bit hash key.
        let pi = self.grid.voxel_for(p);
        let packed_pos = self.grid.pack(&pi);

        let hash_table_size = self.hash_table.len();
        let mut hash = VoxelGrid::hash(packed_pos, hash_table_size);

        // Now, see if the hash table already has an entry for the voxel.
        // We'll use quadratic probing when the hash table entry is already
        // used for another value; step stores the square root of the probe
        // step.
        let mut step = 1;
        loop {
            let entry = &self.hash_table[hash];

            // Does the hash table entry at offset `hash` match the current
            // point?
            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);
            if entry_packed_pos == packed_pos {
                // Yes! Most of the time, there should already be a light
                // sampling distribution available. Rarely, another thread
                // will have claimed the entry and will still be computing
                // the distribution; in this case, spin until it is ready.
                loop {
                    if let Some(dist) = entry.distribution.load_full() {
                        return dist;
                    }
                    std::hint::spin_loop();
                }
            } else if entry_packed_pos != INVALID_PACKED_POS {
                // The hash table entry we're checking has already been
                // allocated for another voxel. Advance to the next entry
                // with quadratic probing.
                hash += step * step;
                if hash >= hash_table_size {
                    hash %= hash_table_size;
                }
                step += 1;
            } else {
                // We have found an invalid entry. (Though this may have
                // changed since the load into entry_packed_pos above.) Use
                // an atomic compare/exchange to try to claim this entry for
                // the current position.
                if entry
                    .packed_pos
                    .compare_exchange_weak(
                        INVALID_PACKED_POS,
                        packed_pos,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    // Success; we've claimed this entry for this voxel's
                    // distribution. Now compute the sampling distribution
                    // and publish it. As long as packed_pos has been set but
                    // the entry's distribution is empty, any other threads
                    // looking up the distribution for this voxel will spin
                    // wait until the distribution is stored.
                    let dist = Arc::new(self.compute_distribution(&pi));
                    entry.distribution.store(Some(Arc::clone(&dist)));
                    return dist;
                }
                // Lost the race for the entry; re-examine it.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Spectrum;
    use crate::testutil::*;
    use std::thread;

    fn single_light_scene() -> (Scene, Arc<CountingLight>) {
        let light = Arc::new(CountingLight::new(point_light(
            Point3f::ZERO,
            Spectrum::splat(1.0),
        )));
        let scene = room_scene(vec![Arc::clone(&light) as _]);
        (scene, light)
    }

    #[test]
    fn repeated_lookups_return_the_same_distribution() {
        let (scene, _light) = single_light_scene();
        let distribution = SpatialLightDistribution::new(&scene, 4);

        let p = Point3f::new(0.1, 0.1, 0.1);
        let a = distribution.lookup(&p, &Normal3f::ZERO);
        let b = distribution.lookup(&p, &Normal3f::ZERO);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.count(), 1);
        assert!((a.discrete_pdf(0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn concurrent_lookups_build_each_voxel_once() {
        let (scene, light) = single_light_scene();
        let distribution = Arc::new(SpatialLightDistribution::new(&scene, 4));

        let p = Point3f::new(0.1, 0.1, 0.1);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let distribution = Arc::clone(&distribution);
                thread::spawn(move || distribution.lookup(&p, &Normal3f::ZERO))
            })
            .collect();
        let results: Vec<ArcDistribution> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Every thread observes the identical cached distribution...
        for d in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], d));
        }
        // ...and the builder queried the light exactly once per Halton
        // sample, so the distribution was computed exactly once.
        assert_eq!(light.sample_li_calls(), N_SAMPLES);
    }

    #[test]
    fn points_outside_the_scene_bounds_use_edge_voxels() {
        let (scene, _light) = single_light_scene();
        let distribution = SpatialLightDistribution::new(&scene, 4);

        let inside = distribution.lookup(&Point3f::new(0.001, 0.001, 0.001), &Normal3f::ZERO);
        let outside = distribution.lookup(&Point3f::new(-0.0005, -0.0005, -0.0005), &Normal3f::ZERO);
        assert!(Arc::ptr_eq(&inside, &outside));
    }

    #[test]
    fn nearby_lights_dominate_the_voxel_distribution() {
        let scene = room_scene(vec![
            point_light(Point3f::new(0.05, 0.05, 0.05), Spectrum::splat(1.0)),
            point_light(Point3f::new(0.95, 0.95, 0.95), Spectrum::splat(1.0)),
        ]);
        let distribution = SpatialLightDistribution::new(&scene, 4);

        let d = distribution.lookup(&Point3f::new(0.05, 0.05, 0.05), &Normal3f::ZERO);
        assert!(d.discrete_pdf(0) > d.discrete_pdf(1));
        let sum: Float = (0..d.count()).map(|i| d.discrete_pdf(i)).sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }
}
