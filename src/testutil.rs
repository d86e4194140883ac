//! Shared test fixtures: a closed box room, isotropic point lights and a
//! light wrapper that counts sampling queries.

use crate::base::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::light_distrib::{
    InterpolationKernel, LightSampleSettings, LightSampleStrategy, PhotonSampling,
};
use crate::primitive::*;
use crate::scene::*;
use crate::spectrum::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An axis-aligned box whose interior walls are the only scene geometry.
/// Rays starting inside hit the wall they exit through, so photons from
/// enclosed lights always land on a surface.
pub struct RoomBox {
    pub bounds: Bounds3f,
}

impl Primitive for RoomBox {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        // Closest wall crossing along the ray direction.
        let mut t_hit = ray.t_max;
        let mut hit_axis = None;
        for axis in 0..3 {
            let d = ray.d[axis];
            if d.abs() < 1e-12 {
                continue;
            }
            let wall = if d > 0.0 {
                self.bounds.p_max[axis]
            } else {
                self.bounds.p_min[axis]
            };
            let t = (wall - ray.o[axis]) / d;
            if t > 1e-5 && t < t_hit {
                t_hit = t;
                hit_axis = Some(axis);
            }
        }

        let axis = hit_axis?;
        let p = ray.at(t_hit);
        let mut n = [0.0; 3];
        n[axis] = if ray.d[axis] > 0.0 { -1.0 } else { 1.0 };
        Some(Hit::new(p, ray.time, -ray.d, Normal3f::new(n[0], n[1], n[2])))
    }
}

/// An isotropic point light with the given radiant intensity.
pub struct TestPointLight {
    pub p_light: Point3f,
    pub intensity: Spectrum,
}

/// Returns a direction uniformly distributed over the unit sphere.
fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = 2.0 * PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

impl Light for TestPointLight {
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Option<Li> {
        let to_light = self.p_light - hit.p;
        let dist_squared = to_light.length_squared();
        if dist_squared == 0.0 {
            return None;
        }
        Some(Li::new(
            to_light.normalize(),
            1.0,
            self.intensity / dist_squared,
        ))
    }

    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Le {
        let d = uniform_sample_sphere(u1);
        Le::new(
            Ray::new(self.p_light, d, INFINITY, time),
            Normal3f::from(d),
            1.0,
            INV_FOUR_PI,
            self.intensity,
        )
    }

    fn power(&self) -> Spectrum {
        self.intensity * FOUR_PI
    }
}

/// Wraps a light and counts how often `sample_li` is queried; used to show
/// that lazily built voxel distributions are computed at most once.
pub struct CountingLight {
    inner: ArcLight,
    sample_li_calls: AtomicUsize,
}

impl CountingLight {
    pub fn new(inner: ArcLight) -> Self {
        Self {
            inner,
            sample_li_calls: AtomicUsize::new(0),
        }
    }

    pub fn sample_li_calls(&self) -> usize {
        self.sample_li_calls.load(Ordering::SeqCst)
    }
}

impl Light for CountingLight {
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Option<Li> {
        self.sample_li_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sample_li(hit, u)
    }

    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Le {
        self.inner.sample_le(u1, u2, time)
    }

    fn power(&self) -> Spectrum {
        self.inner.power()
    }
}

/// Returns a point light as an `ArcLight`.
pub fn point_light(p: Point3f, intensity: Spectrum) -> ArcLight {
    Arc::new(TestPointLight {
        p_light: p,
        intensity,
    })
}

/// Returns a scene consisting of a unit cube room and the given lights.
pub fn room_scene(lights: Vec<ArcLight>) -> Scene {
    let room = RoomBox {
        bounds: Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0)),
    };
    Scene::new(Arc::new(room), lights)
}

/// Returns light sample settings with the documented defaults, adjusted by
/// the given closure. Tests shrink the photon count to keep preprocesses
/// fast.
pub fn test_settings<F>(adjust: F) -> LightSampleSettings
where
    F: FnOnce(&mut LightSampleSettings),
{
    let mut settings = LightSampleSettings {
        strategy: LightSampleStrategy::Spatial,
        photon_sampling: PhotonSampling::Uniform,
        photon_count: 1024,
        max_voxels: 4,
        min_contribution_scale: 0.001,
        interpolate_cdf: true,
        nearest_neighbours: 50,
        photon_radius: 0.1,
        knn: true,
        interpolation: InterpolationKernel::Shepard,
        int_smooth: 1.0,
        cdf_count: 8,
        kn_cdf: 16,
        photon_threshold: 15,
    };
    adjust(&mut settings);
    settings
}
