//! Low Discrepancy Sequences.

use crate::base::*;

/// The first handful of prime numbers, indexed by Halton dimension. The
/// light sampling preprocesses never use more than the first six
/// dimensions but a few spares are kept for headroom.
const PRIMES: [u64; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Computes the radical inverse of `a` in the prime base selected by
/// `base_index`: the digits of `a` in that base, mirrored around the radix
/// point. Successive values of `a` enumerate the Halton sequence in the
/// given dimension.
///
/// * `base_index` - Index into the prime table selecting the base.
/// * `a`          - Sequence index.
pub fn radical_inverse(base_index: u16, a: u64) -> Float {
    let base = PRIMES[base_index as usize];

    // Accumulate the reversed digits in integer arithmetic and apply the
    // combined scale at the end; f64 keeps the 32-bit result exact.
    let inv_base = 1.0 / base as f64;
    let mut reversed_digits: u64 = 0;
    let mut inv_base_n: f64 = 1.0;
    let mut a = a;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }

    min(
        (reversed_digits as f64 * inv_base_n) as Float,
        ONE_MINUS_EPSILON,
    )
}
