use crate::{
    arithmetic::{field::sub_mod, NttElem, NttMatrix, RingElem, RingVec},
    consts::{MAX_ETA, MODULUS_Q, RING_DEG, SEED_LEN},
    hash::{matrix_xof, prf},
    ser::byte_decode,
};

use sha3::digest::XofReader;
use zeroize::Zeroize;

/// Number of XOF bytes we pull at a time when rejection sampling: three SHAKE128 blocks
const XOF_BUF_LEN: usize = 3 * 168;

// Algorithm 7, SampleNTT
/// Rejection-samples a uniformly random element of T_q from the XOF stream. Every 3 bytes yield
/// two 12-bit candidates, and a candidate is kept iff it is below q
pub(crate) fn sample_ntt(mut xof: impl XofReader) -> NttElem {
    let mut elem = NttElem::default();
    let mut buf = [0u8; XOF_BUF_LEN];
    let mut buf_idx = XOF_BUF_LEN;

    let mut j = 0;
    while j < RING_DEG {
        if buf_idx == XOF_BUF_LEN {
            xof.read(&mut buf);
            buf_idx = 0;
        }
        let b0 = buf[buf_idx] as u16;
        let b1 = buf[buf_idx + 1] as u16;
        let b2 = buf[buf_idx + 2] as u16;
        buf_idx += 3;

        let d1 = b0 | ((b1 & 0x0f) << 8);
        let d2 = (b1 >> 4) | (b2 << 4);
        if d1 < MODULUS_Q {
            elem.0[j] = d1;
            j += 1;
        }
        if d2 < MODULUS_Q && j < RING_DEG {
            elem.0[j] = d2;
            j += 1;
        }
    }

    elem
}

// Algorithm 8, SamplePolyCBD
/// Samples a ring element from the centered binomial distribution with width `eta` ∈ {2, 3}.
/// `bytes` MUST have length 64·η
pub(crate) fn sample_poly_cbd(bytes: &[u8], eta: usize) -> RingElem {
    debug_assert!(eta == 2 || eta == 3);
    debug_assert_eq!(bytes.len(), 64 * eta);

    // Split the bit stream into 512 η-bit words. Coefficient i is
    // hamming(data[2i]) - hamming(data[2i+1])
    let mut data: [u16; 2 * RING_DEG] = byte_decode(bytes, eta);

    let mut elem = RingElem::default();
    for (coeff, pair) in elem.0.iter_mut().zip(data.chunks_exact(2)) {
        let hamming1 = pair[0].count_ones() as u16;
        let hamming2 = pair[1].count_ones() as u16;
        *coeff = sub_mod(hamming1, hamming2);
    }

    data.zeroize();
    elem
}

/// Draws CBD samples from PRF(seed, N), incrementing the one-byte counter N after every ring
/// element. The counter is shared by everything drawn from the same sampler, so it keeps running
/// from one vector into the next
pub(crate) struct NoiseSampler<'a> {
    seed: &'a [u8; SEED_LEN],
    counter: u8,
}

impl<'a> NoiseSampler<'a> {
    pub(crate) fn new(seed: &'a [u8; SEED_LEN]) -> Self {
        NoiseSampler { seed, counter: 0 }
    }

    /// Samples the next ring element with width `eta`
    pub(crate) fn sample_elem(&mut self, eta: usize) -> RingElem {
        // We can't do const math on eta, so make a buffer of the max length and cut it down
        let mut backing_buf = [0u8; 64 * MAX_ETA];
        let buf = &mut backing_buf[..64 * eta];

        prf(self.seed, self.counter, buf);
        self.counter += 1;

        let elem = sample_poly_cbd(buf, eta);
        backing_buf.zeroize();
        elem
    }

    /// Samples the next K ring elements with width `eta`
    pub(crate) fn sample_vec<const K: usize>(&mut self, eta: usize) -> RingVec<K> {
        let mut vec = RingVec::default();
        for elem in vec.0.iter_mut() {
            *elem = self.sample_elem(eta);
        }
        vec
    }
}

/// Which way round the matrix indices go into the XOF seed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MatrixOrientation {
    /// Entry (i, j) is SampleNTT(ρ ‖ j ‖ i). This is Â, used at key generation
    Standard,
    /// Entry (i, j) is SampleNTT(ρ ‖ i ‖ j). This is Âᵀ, used at encryption
    Transposed,
}

/// Uses a public seed to generate the matrix Â, or its transpose, in the NTT domain
pub(crate) fn gen_matrix_from_seed<const K: usize>(
    rho: &[u8; SEED_LEN],
    orientation: MatrixOrientation,
) -> NttMatrix<K> {
    let mut mat = NttMatrix::default();
    for i in 0..K {
        for j in 0..K {
            let (row, col) = (i as u8, j as u8);
            let xof = match orientation {
                MatrixOrientation::Standard => matrix_xof(rho, col, row),
                MatrixOrientation::Transposed => matrix_xof(rho, row, col),
            };
            mat.0[i][j] = sample_ntt(xof);
        }
    }

    mat
}
