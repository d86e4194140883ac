//! Spatially varying light sampling distributions.
//!
//! Given a shading point in the scene, a `LightDistribution` returns a
//! discrete probability distribution over the scene's light sources that
//! reflects how much each light is expected to contribute at that point.
//! Integrators sample the returned distribution to pick a light and query
//! its PDF for multiple importance sampling weights.

#[macro_use]
extern crate log;

pub mod base;
pub mod clustering;
pub mod geometry;
pub mod interaction;
pub mod kdtree;
pub mod light;
pub mod light_distrib;
pub mod low_discrepancy;
pub mod paramset;
pub mod primitive;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod spectrum;

#[cfg(test)]
pub(crate) mod testutil;
