use crate::{
    arithmetic::ring_arith::{NttElem, RingElem},
    consts::{ENCODED_ELEM_LEN, RING_DEG},
};

use zeroize::Zeroize;

/// An element of R_q^K in coefficient form
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub(crate) struct RingVec<const K: usize>(pub(crate) [RingElem; K]);

/// An element of R_q^K in NTT form
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub(crate) struct NttVec<const K: usize>(pub(crate) [NttElem; K]);

/// A K×K matrix over R_q in NTT form, stored in row-major order. Matrices are never serialized;
/// they are regenerated from their seed wherever they are needed
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub(crate) struct NttMatrix<const K: usize>(pub(crate) [[NttElem; K]; K]);

impl<const K: usize> Default for RingVec<K> {
    fn default() -> Self {
        RingVec([RingElem::default(); K])
    }
}

impl<const K: usize> Default for NttVec<K> {
    fn default() -> Self {
        NttVec([NttElem::default(); K])
    }
}

impl<const K: usize> Default for NttMatrix<K> {
    fn default() -> Self {
        NttMatrix([[NttElem::default(); K]; K])
    }
}

impl<const K: usize> Zeroize for RingVec<K> {
    fn zeroize(&mut self) {
        self.0.iter_mut().for_each(Zeroize::zeroize);
    }
}

impl<const K: usize> Zeroize for NttVec<K> {
    fn zeroize(&mut self) {
        self.0.iter_mut().for_each(Zeroize::zeroize);
    }
}

impl<const K: usize> RingVec<K> {
    #[cfg(test)]
    pub fn rand(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        let mut v = RingVec::default();
        v.0.iter_mut().for_each(|elem| *elem = RingElem::rand(rng));
        v
    }

    /// Applies [`RingElem::ntt`] to each element
    pub(crate) fn ntt(&self) -> NttVec<K> {
        NttVec(self.0.map(|elem| elem.ntt()))
    }

    /// Applies [`RingElem::compress`] to each element
    pub(crate) fn compress(&self, d: usize) -> Self {
        RingVec(self.0.map(|elem| elem.compress(d)))
    }

    /// Applies [`RingElem::decompress`] to each element
    pub(crate) fn decompress(&self, d: usize) -> Self {
        RingVec(self.0.map(|elem| elem.decompress(d)))
    }

    /// Serializes this vector, ring element by ring element, at `bits_per_elem` bits per
    /// coefficient. `out_buf` MUST have length `K · 32 · bits_per_elem`
    pub(crate) fn to_bytes(&self, out_buf: &mut [u8], bits_per_elem: usize) {
        debug_assert_eq!(out_buf.len(), K * bits_per_elem * RING_DEG / 8);

        for (elem, out_chunk) in self
            .0
            .iter()
            .zip(out_buf.chunks_exact_mut(bits_per_elem * RING_DEG / 8))
        {
            elem.to_bytes(out_chunk, bits_per_elem);
        }
    }

    /// Deserializes a vector, ring element by ring element, at `bits_per_elem` bits per
    /// coefficient. `bytes` MUST have length `K · 32 · bits_per_elem`
    pub(crate) fn from_bytes(bytes: &[u8], bits_per_elem: usize) -> Self {
        debug_assert_eq!(bytes.len(), K * bits_per_elem * RING_DEG / 8);

        let mut result = RingVec::default();
        for (elem, chunk) in result
            .0
            .iter_mut()
            .zip(bytes.chunks_exact(bits_per_elem * RING_DEG / 8))
        {
            *elem = RingElem::from_bytes(chunk, bits_per_elem);
        }
        result
    }
}

impl<const K: usize> NttVec<K> {
    #[cfg(test)]
    pub fn rand(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        let mut v = NttVec::default();
        v.0.iter_mut().for_each(|elem| *elem = NttElem::rand(rng));
        v
    }

    /// Applies [`NttElem::inv_ntt`] to each element
    pub(crate) fn inv_ntt(&self) -> RingVec<K> {
        RingVec(self.0.map(|elem| elem.inv_ntt()))
    }

    /// Computes the dot product Σᵢ selfᵢ · otherᵢ
    pub(crate) fn dot(&self, other: &NttVec<K>) -> NttElem {
        let mut acc = NttElem::default();
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            acc = &acc + &(a * b);
        }
        acc
    }

    /// Serializes this vector at 12 bits per coefficient. `out_buf` MUST have length `384 · K`
    pub(crate) fn to_bytes(&self, out_buf: &mut [u8]) {
        debug_assert_eq!(out_buf.len(), K * ENCODED_ELEM_LEN);

        for (elem, out_chunk) in self.0.iter().zip(out_buf.chunks_exact_mut(ENCODED_ELEM_LEN)) {
            elem.to_bytes(out_chunk);
        }
    }

    /// Deserializes a vector stored at 12 bits per coefficient, reducing mod q.
    /// `bytes` MUST have length `384 · K`
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), K * ENCODED_ELEM_LEN);

        let mut result = NttVec::default();
        for (elem, chunk) in result.0.iter_mut().zip(bytes.chunks_exact(ENCODED_ELEM_LEN)) {
            *elem = NttElem::from_bytes(chunk);
        }
        result
    }
}

impl<const K: usize> NttMatrix<K> {
    #[cfg(test)]
    pub fn rand(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        let mut mat = NttMatrix::default();
        for row in mat.0.iter_mut() {
            for elem in row.iter_mut() {
                *elem = NttElem::rand(rng);
            }
        }
        mat
    }

    /// Returns the matrix transpose
    #[cfg(test)]
    pub(crate) fn transpose(&self) -> Self {
        let mut ret = NttMatrix::default();
        for i in 0..K {
            for j in 0..K {
                ret.0[j][i] = self.0[i][j];
            }
        }
        ret
    }

    /// Multiplies this matrix by the given column vector. Entry i of the result is the dot product
    /// of row i with `vec`
    pub(crate) fn mul_vec(&self, vec: &NttVec<K>) -> NttVec<K> {
        let mut result = NttVec::default();
        for (out, row) in result.0.iter_mut().zip(self.0.iter()) {
            *out = NttVec(*row).dot(vec);
        }
        result
    }
}

impl<'a, const K: usize> core::ops::Add<&'a RingVec<K>> for &'a RingVec<K> {
    type Output = RingVec<K>;

    fn add(self, other: &'a RingVec<K>) -> Self::Output {
        let mut result = RingVec::default();
        for i in 0..K {
            result.0[i] = &self.0[i] + &other.0[i];
        }
        result
    }
}

impl<'a, const K: usize> core::ops::Add<&'a NttVec<K>> for &'a NttVec<K> {
    type Output = NttVec<K>;

    fn add(self, other: &'a NttVec<K>) -> Self::Output {
        let mut result = NttVec::default();
        for i in 0..K {
            result.0[i] = &self.0[i] + &other.0[i];
        }
        result
    }
}
