//! Common numeric types and helpers.

mod clamp;
mod common;

// Re-export
pub use clamp::*;
pub use common::*;
