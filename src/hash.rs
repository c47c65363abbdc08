//! The symmetric primitives ML-KEM is built on: H, G, J, PRF and the matrix XOF. All of them are
//! thin wrappers around the SHA-3 family

use crate::consts::SEED_LEN;

use sha3::{
    digest::{Digest, ExtendableOutput, Update, XofReader},
    Sha3_256, Sha3_512, Shake128, Shake256,
};

/// H(bytes) = SHA3-256(bytes)
pub(crate) fn hash_h(bytes: &[u8]) -> [u8; SEED_LEN] {
    Sha3_256::digest(bytes).into()
}

/// G(a ‖ b) = SHA3-512(a ‖ b), split into its two 32-byte halves
pub(crate) fn hash_g(a: &[u8], b: &[u8]) -> ([u8; SEED_LEN], [u8; SEED_LEN]) {
    // Both Digest and Update are in scope here, so name the trait explicitly
    let mut h = Sha3_512::new();
    Digest::update(&mut h, a);
    Digest::update(&mut h, b);
    let digest = h.finalize();
    let (first, second) = digest.split_at(SEED_LEN);

    let mut out1 = [0u8; SEED_LEN];
    let mut out2 = [0u8; SEED_LEN];
    out1.copy_from_slice(first);
    out2.copy_from_slice(second);
    (out1, out2)
}

/// J(z ‖ ct) = SHAKE256(z ‖ ct) truncated to 32 bytes. This is the implicit rejection key
pub(crate) fn hash_j(z: &[u8; SEED_LEN], ciphertext: &[u8]) -> [u8; SEED_LEN] {
    let mut h = Shake256::default();
    h.update(z);
    h.update(ciphertext);

    let mut out = [0u8; SEED_LEN];
    h.finalize_xof().read(&mut out);
    out
}

/// PRF_η(seed, n) = SHAKE256(seed ‖ n). `out_buf` MUST have length 64·η
pub(crate) fn prf(seed: &[u8; SEED_LEN], n: u8, out_buf: &mut [u8]) {
    let mut h = Shake256::default();
    h.update(seed);
    h.update(&[n]);
    h.finalize_xof().read(out_buf);
}

/// Returns a SHAKE128 stream absorbing `rho ‖ i ‖ j`, the seed of one matrix entry
pub(crate) fn matrix_xof(rho: &[u8; SEED_LEN], i: u8, j: u8) -> impl XofReader {
    let mut h = Shake128::default();
    h.update(rho);
    h.update(&[i, j]);
    h.finalize_xof()
}
