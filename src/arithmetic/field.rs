//! Arithmetic in Z/qZ for q = 3329. Every function here assumes its inputs are already in [0, q)

use crate::consts::MODULUS_Q;

const Q: u16 = MODULUS_Q;

/// ⌊2^32 / q⌋, the Barrett multiplier
const BARRETT_MULTIPLIER: u64 = (1u64 << 32) / MODULUS_Q as u64;

/// Takes x ∈ (-q, q), stored as a wrapped u16, to [0, q) without branching
#[inline(always)]
fn add_q_if_negative(x: u16) -> u16 {
    // Everything we handle is below 2^15 in absolute value, so the top bit is the sign
    let mask = 0u16.wrapping_sub(x >> 15);
    x.wrapping_add(mask & Q)
}

/// a + b mod q
#[inline(always)]
pub(crate) fn add_mod(a: u16, b: u16) -> u16 {
    debug_assert!(a < Q && b < Q);
    add_q_if_negative(a.wrapping_add(b).wrapping_sub(Q))
}

/// a - b mod q
#[inline(always)]
pub(crate) fn sub_mod(a: u16, b: u16) -> u16 {
    debug_assert!(a < Q && b < Q);
    add_q_if_negative(a.wrapping_sub(b))
}

/// Reduces x ∈ [0, q²) to [0, q) using Barrett reduction
#[inline(always)]
pub(crate) fn reduce_barrett(x: u32) -> u16 {
    debug_assert!(x < Q as u32 * Q as u32);
    let quot = ((x as u64 * BARRETT_MULTIPLIER) >> 32) as u32;
    // The quotient estimate is at most one too small, so the remainder is in [0, 2q)
    let rem = (x - quot * Q as u32) as u16;
    add_q_if_negative(rem.wrapping_sub(Q))
}

/// a · b mod q
#[inline(always)]
pub(crate) fn mul_mod(a: u16, b: u16) -> u16 {
    reduce_barrett(a as u32 * b as u32)
}

// Compress_d from FIPS 203, section 4.2.1
/// Maps x ∈ [0, q) to ⌈x · 2^d / q⌋ mod 2^d, for 1 ≤ d ≤ 11
#[inline]
pub(crate) fn compress(x: u16, d: usize) -> u16 {
    debug_assert!(x < Q);
    debug_assert!(0 < d && d < 12);
    let scaled = (x as u32) << d;
    // Barrett quotient. The estimate is at most one too small, so one masked step fixes it
    let mut quot = ((scaled as u64 * BARRETT_MULTIPLIER) >> 32) as u32;
    let mut rem = scaled - quot * Q as u32;
    let too_small = (Q as u32 - 1).wrapping_sub(rem) >> 31;
    quot += too_small;
    rem -= too_small * Q as u32;
    // q is odd, so a remainder of at least (q+1)/2 means the fraction is above 1/2
    let rounded = quot + (((Q as u32 + 1) / 2).wrapping_sub(rem + 1) >> 31);
    (rounded & ((1 << d) - 1)) as u16
}

// Decompress_d from FIPS 203, section 4.2.1
/// Maps y ∈ [0, 2^d) to ⌈y · q / 2^d⌋, for 1 ≤ d ≤ 11
#[inline]
pub(crate) fn decompress(y: u16, d: usize) -> u16 {
    debug_assert!(0 < d && d < 12);
    debug_assert!((y as u32) < (1 << d));
    // Keep one extra bit so we can round on it
    let scaled = (y as u32 * Q as u32) >> (d - 1);
    ((scaled >> 1) + (scaled & 1)) as u16
}
