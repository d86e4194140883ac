//! RGB Spectrum.

use crate::base::*;
use std::ops::{Add, AddAssign, Div, Mul};

/// Radiance represented as an RGB triple. The light sampling code only ever
/// reduces spectra to scalars (luminance or component sum) but the emission
/// interfaces speak full RGB.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    /// The RGB components.
    pub c: [Float; 3],
}

impl Spectrum {
    /// Black.
    pub const ZERO: Self = Self { c: [0.0; 3] };

    /// Creates a new spectrum from RGB components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Creates a spectrum with the same value in all components.
    ///
    /// * `v` - The value.
    pub fn splat(v: Float) -> Self {
        Self { c: [v; 3] }
    }

    /// Returns the luminance of the spectrum using the CIE Y weights.
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns the sum of all components. Used as the scalar flux carried by
    /// a photon.
    pub fn sum_values(&self) -> Float {
        self.c[0] + self.c[1] + self.c[2]
    }

    /// Returns true if all components are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }
}

impl Add for Spectrum {
    type Output = Self;

    /// Adds the given spectrum.
    fn add(self, other: Self) -> Self {
        Self::new(
            self.c[0] + other.c[0],
            self.c[1] + other.c[1],
            self.c[2] + other.c[2],
        )
    }
}

impl AddAssign for Spectrum {
    /// Accumulates the given spectrum.
    fn add_assign(&mut self, other: Self) {
        self.c[0] += other.c[0];
        self.c[1] += other.c[1];
        self.c[2] += other.c[2];
    }
}

impl Mul<Float> for Spectrum {
    type Output = Self;

    /// Scales the spectrum.
    fn mul(self, f: Float) -> Self {
        Self::new(self.c[0] * f, self.c[1] * f, self.c[2] * f)
    }
}

impl Mul<Spectrum> for Float {
    type Output = Spectrum;

    /// Scales the spectrum.
    fn mul(self, s: Spectrum) -> Spectrum {
        s * self
    }
}

impl Div<Float> for Spectrum {
    type Output = Self;

    /// Scales the spectrum by 1/f.
    fn div(self, f: Float) -> Self {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        Self::new(self.c[0] * inv, self.c[1] * inv, self.c[2] * inv)
    }
}
