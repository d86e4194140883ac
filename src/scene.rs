//! Scene

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::primitive::*;
use std::sync::Arc;

/// The scene as seen by the light sampling code: an aggregate of all
/// primitives, the list of light sources and the cached world bound.
pub struct Scene {
    /// An aggregate of all primitives in the scene.
    pub aggregate: ArcPrimitive,

    /// All light sources in the scene.
    pub lights: Vec<ArcLight>,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,
}

impl Scene {
    /// Creates a new `Scene`.
    ///
    /// * `aggregate` - An aggregate of all primitives in the scene.
    /// * `lights`    - All light sources in the scene.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        let world_bound = aggregate.world_bound();
        info!("Scene: world bound {}, {} lights", world_bound, lights.len());
        Self {
            aggregate: Arc::clone(&aggregate),
            lights: lights.iter().map(Arc::clone).collect(),
            world_bound,
        }
    }

    /// Traces the ray into the scene and returns the first hit if an
    /// intersection occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        self.aggregate.intersect(ray)
    }
}
