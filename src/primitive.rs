//! Primitives.

use crate::geometry::*;
use crate::interaction::*;
use std::sync::Arc;

/// The slice of the scene geometry interface the light sampling code
/// consumes: a world bound for the voxel grids and first-hit ray
/// intersection for photon tracing.
pub trait Primitive {
    /// Returns the bounding box of the primitive in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Intersects the ray with the primitive and returns the first hit, if
    /// any, within the ray's extent.
    ///
    /// * `ray` - The ray to trace.
    fn intersect(&self, ray: &Ray) -> Option<Hit>;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;
