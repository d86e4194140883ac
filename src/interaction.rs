//! Interactions.

use crate::base::*;
use crate::geometry::*;

/// A point in the scene that light sampling interfaces are queried from.
/// Carries just enough of a surface interaction to evaluate `sample_li`.
#[derive(Clone, Debug)]
pub struct Hit {
    /// Point of interaction.
    pub p: Point3f,

    /// Time when interaction occurred.
    pub time: Float,

    /// The outgoing direction.
    pub wo: Vector3f,

    /// Surface normal at the point. Zero for points not on a surface.
    pub n: Normal3f,
}

impl Hit {
    /// Creates a new interaction point.
    ///
    /// * `p`    - Point of interaction.
    /// * `time` - Time when interaction occurred.
    /// * `wo`   - The outgoing direction.
    /// * `n`    - Surface normal at the point.
    pub fn new(p: Point3f, time: Float, wo: Vector3f, n: Normal3f) -> Self {
        Self { p, time, wo, n }
    }
}
