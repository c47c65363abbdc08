//! This file defines the elements of the ring R_q = ℤ_q[X]/(X^256 + 1), q = 3329, in its two
//! representations. A [`RingElem`] holds coefficients; an [`NttElem`] holds the image of a ring
//! element under the number-theoretic transform. The only ways between the two are
//! [`RingElem::ntt`] and [`NttElem::inv_ntt`], so the two can never be mixed up.

use crate::{
    arithmetic::field::{add_mod, compress, decompress, mul_mod, reduce_barrett, sub_mod},
    consts::{FULL_COEFF_BITS, MODULUS_Q, RING_DEG},
    ser::{byte_decode, byte_encode},
};

use core::ops::{Add, Mul, Sub};

use zeroize::Zeroize;

/// The primitive 256-th root of unity mod q
const ZETA: u16 = 17;

/// 128⁻¹ mod q, the scaling factor that finishes the inverse NTT
const INV_128: u16 = 3303;

const fn pow_mod(base: u16, exp: usize) -> u16 {
    let mut result = 1u32;
    let mut i = 0;
    while i < exp {
        result = result * base as u32 % MODULUS_Q as u32;
        i += 1;
    }
    result as u16
}

/// Reverses the low 7 bits of `i`
const fn bit_rev7(i: usize) -> usize {
    ((i as u8).reverse_bits() >> 1) as usize
}

/// ζ^bitrev7(i) for i in 0..128. These drive the butterflies of the NTT
const ZETAS: [u16; 128] = {
    let mut table = [0u16; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = pow_mod(ZETA, bit_rev7(i));
        i += 1;
    }
    table
};

/// ζ^(2·bitrev7(i) + 1) for i in 0..128. These are the roots of the degree-2 factors X² - γ the
/// NTT splits the ring into
const GAMMAS: [u16; 128] = {
    let mut table = [0u16; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = pow_mod(ZETA, 2 * bit_rev7(i) + 1);
        i += 1;
    }
    table
};

/// An element of the ring (ℤ/3329ℤ)[X] / (X^256 + 1) in coefficient form
// The coefficients are in order of ascending powers, i.e., `self.0[0]` is the constant term.
// INVARIANT: every coefficient is in [0, q), except right after `compress` where it is in [0, 2^d)
#[derive(Debug, Clone, Copy, Zeroize)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub(crate) struct RingElem(pub(crate) [u16; RING_DEG]);

/// The NTT representation of a ring element: 128 degree-one residues, stored as consecutive
/// coefficient pairs
// INVARIANT: every coefficient is in [0, q)
#[derive(Debug, Clone, Copy, Zeroize)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub(crate) struct NttElem(pub(crate) [u16; RING_DEG]);

impl Default for RingElem {
    fn default() -> Self {
        RingElem([0u16; RING_DEG])
    }
}

impl Default for NttElem {
    fn default() -> Self {
        NttElem([0u16; RING_DEG])
    }
}

impl RingElem {
    /// Creates a random ring element
    #[cfg(test)]
    pub(crate) fn rand(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        let mut result = [0; RING_DEG];
        result.iter_mut().for_each(|coeff| {
            *coeff = (rng.next_u32() % MODULUS_Q as u32) as u16;
        });
        RingElem(result)
    }

    /// Unpacks a ring element whose coefficients take `bits_per_elem` bits each, 1 ≤ d < 12.
    /// `bytes` MUST have length `32 · bits_per_elem`
    pub(crate) fn from_bytes(bytes: &[u8], bits_per_elem: usize) -> Self {
        debug_assert!(bits_per_elem < FULL_COEFF_BITS);
        RingElem(byte_decode(bytes, bits_per_elem))
    }

    /// Packs this ring element, keeping the low `bits_per_elem` bits of each coefficient.
    /// `out_buf` MUST have length `32 · bits_per_elem`
    pub(crate) fn to_bytes(&self, out_buf: &mut [u8], bits_per_elem: usize) {
        byte_encode(&self.0, out_buf, bits_per_elem)
    }

    /// Compresses every coefficient to `d` bits
    pub(crate) fn compress(&self, d: usize) -> Self {
        RingElem(self.0.map(|c| compress(c, d)))
    }

    /// Decompresses every coefficient from `d` bits back to [0, q)
    pub(crate) fn decompress(&self, d: usize) -> Self {
        RingElem(self.0.map(|c| decompress(c, d)))
    }

    // Algorithm 9, NTT
    /// Computes the number-theoretic transform of this ring element
    pub(crate) fn ntt(&self) -> NttElem {
        let mut f = self.0;
        let mut k = 1;
        let mut len = 128;
        while len >= 2 {
            for start in (0..RING_DEG).step_by(2 * len) {
                let zeta = ZETAS[k];
                k += 1;
                for j in start..start + len {
                    let t = mul_mod(zeta, f[j + len]);
                    f[j + len] = sub_mod(f[j], t);
                    f[j] = add_mod(f[j], t);
                }
            }
            len /= 2;
        }
        NttElem(f)
    }
}

impl NttElem {
    /// Creates a random element, uniform over the NTT domain
    #[cfg(test)]
    pub(crate) fn rand(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        RingElem::rand(rng).ntt()
    }

    /// Unpacks an element stored at 12 bits per coefficient, reducing each coefficient mod q.
    /// `bytes` MUST have length 384
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        // 12 bits can hold values up to 4095. Reducing is how ByteDecode_12 is defined
        let coeffs: [u16; RING_DEG] = byte_decode(bytes, FULL_COEFF_BITS);
        NttElem(coeffs.map(|c| reduce_barrett(c as u32)))
    }

    /// Packs this element at 12 bits per coefficient. `out_buf` MUST have length 384
    pub(crate) fn to_bytes(&self, out_buf: &mut [u8]) {
        byte_encode(&self.0, out_buf, FULL_COEFF_BITS)
    }

    // Algorithm 10, NTT⁻¹
    /// Computes the inverse number-theoretic transform, returning to coefficient form
    pub(crate) fn inv_ntt(&self) -> RingElem {
        let mut f = self.0;
        let mut k = 127;
        let mut len = 2;
        while len <= 128 {
            for start in (0..RING_DEG).step_by(2 * len) {
                let zeta = ZETAS[k];
                k -= 1;
                for j in start..start + len {
                    let t = f[j];
                    f[j] = add_mod(t, f[j + len]);
                    f[j + len] = mul_mod(zeta, sub_mod(f[j + len], t));
                }
            }
            len *= 2;
        }

        for coeff in f.iter_mut() {
            *coeff = mul_mod(*coeff, INV_128);
        }
        RingElem(f)
    }
}

impl<'a> Add for &'a RingElem {
    type Output = RingElem;

    fn add(self, other: &'a RingElem) -> Self::Output {
        let mut result = RingElem::default();
        for i in 0..RING_DEG {
            result.0[i] = add_mod(self.0[i], other.0[i]);
        }
        result
    }
}

impl<'a> Sub for &'a RingElem {
    type Output = RingElem;

    fn sub(self, other: &'a RingElem) -> Self::Output {
        let mut result = RingElem::default();
        for i in 0..RING_DEG {
            result.0[i] = sub_mod(self.0[i], other.0[i]);
        }
        result
    }
}

impl<'a> Add for &'a NttElem {
    type Output = NttElem;

    fn add(self, other: &'a NttElem) -> Self::Output {
        let mut result = NttElem::default();
        for i in 0..RING_DEG {
            result.0[i] = add_mod(self.0[i], other.0[i]);
        }
        result
    }
}

impl<'a> Mul for &'a NttElem {
    type Output = NttElem;

    // Algorithm 11, MultiplyNTTs
    /// Multiplies in the NTT domain. This is 128 products in ℤ_q[X]/(X² - γᵢ), one per coefficient
    /// pair, not a plain pointwise product
    fn mul(self, other: &'a NttElem) -> Self::Output {
        let mut result = NttElem::default();
        for (i, gamma) in GAMMAS.iter().enumerate() {
            let (a0, a1) = (self.0[2 * i], self.0[2 * i + 1]);
            let (b0, b1) = (other.0[2 * i], other.0[2 * i + 1]);

            // Algorithm 12, BaseCaseMultiply
            // (a0 + a1·X)(b0 + b1·X) = a0·b0 + γ·a1·b1 + (a0·b1 + a1·b0)·X  mod X² - γ
            result.0[2 * i] = add_mod(mul_mod(a0, b0), mul_mod(*gamma, mul_mod(a1, b1)));
            result.0[2 * i + 1] = add_mod(mul_mod(a0, b1), mul_mod(a1, b0));
        }
        result
    }
}
