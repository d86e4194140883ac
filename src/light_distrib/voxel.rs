//! Photon Voxel Light Distribution.

use super::{
    photon_emission_distribution, shoot_photons, LightDistribution, LightSampleSettings,
    VoxelGrid, CHUNK_SIZE, INVALID_PACKED_POS,
};
use crate::base::*;
use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A hash slot during photon accumulation. Slots are claimed for a voxel
/// with the same CAS protocol as the spatial cache; accumulation locks only
/// the claimed slot's map, so photons landing in different voxels never
/// contend.
struct AccumEntry {
    packed_pos: AtomicU64,
    light_contrib: Mutex<HashMap<usize, Float>>,
}

/// A finalised hash slot: the claimed voxel key and its distribution.
struct VoxelEntry {
    packed_pos: u64,
    distribution: Arc<SparseDistribution1D>,
}

/// Estimates per-voxel light distributions by tracing photons in a
/// preprocess: each photon deposits its flux in the voxel containing its
/// first hit, keyed by source light, and every occupied voxel is finalised
/// into a sparse distribution. Voxels no photon reached fall back to a
/// uniform distribution. With `interpolate_cdf` enabled, lookups blend the
/// voxel trilinearly with its neighbours.
pub struct PhotonVoxelLightDistribution {
    grid: VoxelGrid,

    /// Open-addressed table of finalised voxel distributions; `None` slots
    /// were never claimed. Immutable once built, so render-time lookups
    /// probe without synchronisation.
    hash_table: Vec<Option<VoxelEntry>>,

    /// Fallback distribution for voxels that received no photons.
    default_distrib: Arc<Distribution1D>,

    /// Blend lookups trilinearly with the neighbouring voxels.
    interpolate_cdf: bool,
}

impl PhotonVoxelLightDistribution {
    /// Create a new instance of `PhotonVoxelLightDistribution`. Traces the
    /// configured number of photons and finalises the voxel hash table; the
    /// preprocess completes before this returns, after which the table is
    /// read-only.
    ///
    /// * `settings` - The resolved light sample settings.
    /// * `scene`    - The scene.
    pub fn new(settings: &LightSampleSettings, scene: &Scene) -> Self {
        let grid = VoxelGrid::new(scene.world_bound, settings.max_voxels);
        let res = grid.resolution();
        info!(
            "PhotonVoxelLightDistribution: scene bounds {}, voxel res ({}, {}, {})",
            scene.world_bound, res[0], res[1], res[2]
        );

        let n_lights = scene.lights.len();
        let hash_table_size = 4 * grid.voxel_count();
        let photon_distrib = photon_emission_distribution(scene, settings.photon_sampling);
        let photons = shoot_photons(scene, &photon_distrib, settings.photon_count);

        // Deposit each photon's flux into its voxel's slot.
        let accum: Vec<AccumEntry> = (0..hash_table_size)
            .map(|_| AccumEntry {
                packed_pos: AtomicU64::new(INVALID_PACKED_POS),
                light_contrib: Mutex::new(HashMap::new()),
            })
            .collect();
        photons.par_chunks(CHUNK_SIZE).for_each(|chunk| {
            for photon in chunk {
                if let Some(light_num) = photon.light_num {
                    let packed_pos = grid.pack(&grid.voxel_for(&photon.p));
                    deposit(&accum, packed_pos, light_num, photon.beta);
                }
            }
        });

        // Finalise each claimed slot's contribution map into a sparse
        // distribution.
        let hash_table: Vec<Option<VoxelEntry>> = accum
            .into_par_iter()
            .map(|entry| {
                let packed_pos = entry.packed_pos.into_inner();
                if packed_pos == INVALID_PACKED_POS {
                    return None;
                }
                let light_contrib = entry.light_contrib.into_inner().unwrap();
                Some(VoxelEntry {
                    packed_pos,
                    distribution: Arc::new(SparseDistribution1D::from_contributions(
                        &light_contrib,
                        settings.min_contribution_scale,
                        n_lights,
                    )),
                })
            })
            .collect();

        Self {
            grid,
            hash_table,
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            interpolate_cdf: settings.interpolate_cdf,
        }
    }

    /// Returns the distribution stored for the given voxel key, or the
    /// default distribution when the voxel received no photons. The probing
    /// never claims slots: the preprocess has completed by the time lookups
    /// run, so every slot is either finalised or permanently empty.
    fn distribution_for(&self, packed_pos: u64) -> ArcDistribution {
        let hash_table_size = self.hash_table.len();
        let mut hash = VoxelGrid::hash(packed_pos, hash_table_size);
        let mut step = 1;
        loop {
            match &self.hash_table[hash] {
                Some(entry) if entry.packed_pos == packed_pos => {
                    return Arc::clone(&entry.distribution) as ArcDistribution;
                }
                Some(_) => {
                    // Slot taken by another voxel; advance with quadratic
                    // probing.
                    hash += step * step;
                    if hash >= hash_table_size {
                        hash %= hash_table_size;
                    }
                    step += 1;
                }
                // No photon arrived in this voxel.
                None => return Arc::clone(&self.default_distrib) as ArcDistribution,
            }
        }
    }

    /// Returns a mixture of the point's voxel distribution and its up-to-7
    /// neighbours, weighted trilinearly by the point's position within the
    /// voxel. Neighbours beyond the grid boundary keep their influence with
    /// the current voxel.
    fn interpolated_distribution(&self, p: &Point3f) -> ArcDistribution {
        let offset = self.grid.offset(p);
        let res = self.grid.resolution();
        let pi = self.grid.voxel_for(p);

        let mut distributions = vec![self.distribution_for(self.grid.pack(&pi))];
        let mut voxel_ids = vec![pi];
        let mut influence: Vec<Float> = vec![1.0];

        for axis in 0..3 {
            // Signed position within the voxel: -0.5 at the lower face, 0 at
            // the centre, +0.5 at the upper face.
            let offset_in_voxel = (offset[axis] * res[axis] as Float).fract() - 0.5;
            if offset_in_voxel == 0.0 {
                continue;
            }
            let toward: Int = if offset_in_voxel > 0.0 { 1 } else { -1 };

            // Split the influence gathered so far between each voxel and its
            // neighbour along this axis.
            let size = voxel_ids.len();
            for i in 0..size {
                let mut neighbour = voxel_ids[i];
                neighbour[axis] += toward;
                if !self.grid.contains_voxel(&neighbour) {
                    continue;
                }
                distributions.push(self.distribution_for(self.grid.pack(&neighbour)));
                voxel_ids.push(neighbour);
                influence.push(influence[i] * offset_in_voxel.abs());
                influence[i] *= 1.0 - offset_in_voxel.abs();
            }
        }

        Arc::new(InterpolatedDistribution1D::new(influence, distributions))
    }
}

/// Claims the slot for `packed_pos` with CAS-probing and adds the photon's
/// flux to its contribution map.
fn deposit(accum: &[AccumEntry], packed_pos: u64, light_num: usize, beta: Float) {
    let table_size = accum.len();
    let mut hash = VoxelGrid::hash(packed_pos, table_size);
    let mut step = 1;
    loop {
        let entry = &accum[hash];
        let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);

        // The slot is ours if it already carries our key or we can claim an
        // unclaimed one. A lost claim race against a photon of the same
        // voxel still means the slot is ours.
        let claimed = entry_packed_pos == packed_pos
            || (entry_packed_pos == INVALID_PACKED_POS
                && match entry.packed_pos.compare_exchange(
                    INVALID_PACKED_POS,
                    packed_pos,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => true,
                    Err(current) => current == packed_pos,
                });

        if claimed {
            let mut light_contrib = entry.light_contrib.lock().unwrap();
            *light_contrib.entry(light_num).or_insert(0.0) += beta;
            return;
        }

        // The slot belongs to another voxel. Advance to the next entry with
        // quadratic probing.
        hash += step * step;
        if hash >= table_size {
            hash %= table_size;
        }
        step += 1;
    }
}

impl LightDistribution for PhotonVoxelLightDistribution {
    /// Given a point `p` in space, this method returns a (hopefully
    /// effective) sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> ArcDistribution {
        if self.interpolate_cdf {
            self.interpolated_distribution(p)
        } else {
            self.distribution_for(self.grid.pack(&self.grid.voxel_for(p)))
        }
    }
}
