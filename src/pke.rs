//! This file implements K-PKE, the IND-CPA-secure public-key encryption scheme underneath ML-KEM

use crate::{
    arithmetic::{NttElem, NttVec, RingElem, RingVec},
    consts::{ENCODED_ELEM_LEN, SEED_LEN},
    gen::{gen_matrix_from_seed, MatrixOrientation, NoiseSampler},
    hash::hash_g,
    params::ParameterSet,
};

use zeroize::{Zeroize, Zeroizing};

/// A secret key for K-PKE: the secret vector ŝ in NTT form
pub(crate) struct PkeSecretKey<const K: usize>(NttVec<K>);

/// A public key for K-PKE: the vector t̂ = Âŝ + ê and the seed ρ of the matrix Â
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) struct PkePublicKey<const K: usize> {
    t_hat: NttVec<K>,
    rho: [u8; SEED_LEN],
}

impl<const K: usize> Drop for PkeSecretKey<K> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<const K: usize> PkeSecretKey<K> {
    pub const SERIALIZED_LEN: usize = K * ENCODED_ELEM_LEN;

    pub(crate) fn to_bytes(&self, out_buf: &mut [u8]) {
        debug_assert_eq!(out_buf.len(), Self::SERIALIZED_LEN);
        self.0.to_bytes(out_buf);
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), Self::SERIALIZED_LEN);
        Self(NttVec::from_bytes(bytes))
    }
}

impl<const K: usize> PkePublicKey<K> {
    pub const SERIALIZED_LEN: usize = K * ENCODED_ELEM_LEN + SEED_LEN;

    /// Serializes this public key as `ByteEncode_12(t̂) ‖ ρ`. `out_buf` MUST have length
    /// `SERIALIZED_LEN`
    pub(crate) fn to_bytes(&self, out_buf: &mut [u8]) {
        debug_assert_eq!(out_buf.len(), Self::SERIALIZED_LEN);

        let (t_hat_buf, rho_buf) = out_buf.split_at_mut(K * ENCODED_ELEM_LEN);
        self.t_hat.to_bytes(t_hat_buf);
        rho_buf.copy_from_slice(&self.rho);
    }

    /// Deserializes a public key. Coefficients of t̂ are reduced mod q; rejecting non-canonical
    /// encodings is up to the caller, see [`t_hat_is_canonical`]
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), Self::SERIALIZED_LEN);

        let (t_hat_bytes, rho_bytes) = bytes.split_at(K * ENCODED_ELEM_LEN);
        let mut rho = [0u8; SEED_LEN];
        rho.copy_from_slice(rho_bytes);

        Self {
            t_hat: NttVec::from_bytes(t_hat_bytes),
            rho,
        }
    }
}

/// Checks that every 384-byte chunk of an encoded t̂ survives a decode/encode round trip, i.e.,
/// that no coefficient is stored as a value ≥ q. `encoded` MUST be a multiple of 384 bytes
pub(crate) fn t_hat_is_canonical(encoded: &[u8]) -> bool {
    debug_assert_eq!(encoded.len() % ENCODED_ELEM_LEN, 0);

    let mut reencoded = [0u8; ENCODED_ELEM_LEN];
    encoded.chunks_exact(ENCODED_ELEM_LEN).all(|chunk| {
        NttElem::from_bytes(chunk).to_bytes(&mut reencoded);
        reencoded.as_slice() == chunk
    })
}

// Algorithm 13, K-PKE.KeyGen
/// Deterministically generates a keypair from the 32-byte seed `d`
pub(crate) fn gen_keypair<const K: usize>(
    params: &ParameterSet,
    d: &[u8; SEED_LEN],
) -> (PkeSecretKey<K>, PkePublicKey<K>) {
    debug_assert_eq!(params.k, K);

    // (ρ, σ) = G(d ‖ k). The rank is domain-separated into the seed
    let (rho, sigma) = hash_g(d, &[K as u8]);
    let sigma = Zeroizing::new(sigma);

    let mat_a = gen_matrix_from_seed::<K>(&rho, MatrixOrientation::Standard);

    // s and e share one PRF counter
    let mut sampler = NoiseSampler::new(&sigma);
    let mut s: RingVec<K> = sampler.sample_vec(params.eta1);
    let mut e: RingVec<K> = sampler.sample_vec(params.eta1);

    let s_hat = s.ntt();
    let mut e_hat = e.ntt();
    s.zeroize();
    e.zeroize();

    // t̂ = Â ∘ ŝ + ê
    let t_hat = &mat_a.mul_vec(&s_hat) + &e_hat;
    e_hat.zeroize();

    (PkeSecretKey(s_hat), PkePublicKey { t_hat, rho })
}

// Algorithm 14, K-PKE.Encrypt
/// Encrypts the 32-byte message `msg` under `pk` using the randomness `coins`.
/// `out_buf` MUST have length `params.ciphertext_len()`
pub(crate) fn encrypt_deterministic<const K: usize>(
    params: &ParameterSet,
    pk: &PkePublicKey<K>,
    msg: &[u8; SEED_LEN],
    coins: &[u8; SEED_LEN],
    out_buf: &mut [u8],
) {
    debug_assert_eq!(params.k, K);
    debug_assert_eq!(out_buf.len(), params.ciphertext_len());

    // Encryption needs Âᵀ, which we generate directly rather than transposing
    let mat_a_t = gen_matrix_from_seed::<K>(&pk.rho, MatrixOrientation::Transposed);

    // y, e₁ and e₂ are all drawn with one PRF counter, in that order
    let mut sampler = NoiseSampler::new(coins);
    let mut y: RingVec<K> = sampler.sample_vec(params.eta1);
    let mut e1: RingVec<K> = sampler.sample_vec(params.eta2);
    let mut e2 = sampler.sample_elem(params.eta2);

    let mut y_hat = y.ntt();
    y.zeroize();

    // u = NTT⁻¹(Âᵀ ∘ ŷ) + e₁
    let u = &mat_a_t.mul_vec(&y_hat).inv_ntt() + &e1;
    e1.zeroize();

    // μ = Decompress_1(ByteDecode_1(m))
    let mut mu = RingElem::from_bytes(msg, 1).decompress(1);

    // v = NTT⁻¹(t̂ᵀ ∘ ŷ) + e₂ + μ
    let v = &(&pk.t_hat.dot(&y_hat).inv_ntt() + &e2) + &mu;
    y_hat.zeroize();
    e2.zeroize();
    mu.zeroize();

    // c = ByteEncode_du(Compress_du(u)) ‖ ByteEncode_dv(Compress_dv(v))
    let (c1, c2) = out_buf.split_at_mut(params.ciphertext_u_len());
    u.compress(params.du).to_bytes(c1, params.du);
    v.compress(params.dv).to_bytes(c2, params.dv);
}

// Algorithm 15, K-PKE.Decrypt
/// Decrypts a ciphertext using the given secret key. `ciphertext` MUST have length
/// `params.ciphertext_len()`. Any ciphertext of the right length decrypts to something
pub(crate) fn decrypt<const K: usize>(
    params: &ParameterSet,
    sk: &PkeSecretKey<K>,
    ciphertext: &[u8],
) -> Zeroizing<[u8; SEED_LEN]> {
    debug_assert_eq!(params.k, K);
    debug_assert_eq!(ciphertext.len(), params.ciphertext_len());

    let (c1, c2) = ciphertext.split_at(params.ciphertext_u_len());
    let u: RingVec<K> = RingVec::from_bytes(c1, params.du).decompress(params.du);
    let v = RingElem::from_bytes(c2, params.dv).decompress(params.dv);

    // w = v - NTT⁻¹(ŝᵀ ∘ NTT(u))
    let mut w = &v - &sk.0.dot(&u.ntt()).inv_ntt();

    // m = ByteEncode_1(Compress_1(w))
    let mut m = Zeroizing::new([0u8; SEED_LEN]);
    w.compress(1).to_bytes(&mut m[..], 1);
    w.zeroize();

    m
}
