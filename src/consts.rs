/// The modulus q of our base field Z/3329 Z
pub(crate) const MODULUS_Q: u16 = 3329;
/// The degree of the polynomial ring over Z/qZ
pub(crate) const RING_DEG: usize = 256;

/// The bitlength of a fully serialized coefficient. 12 bits hold anything below q, plus some
/// non-canonical values that key validation has to reject
pub(crate) const FULL_COEFF_BITS: usize = 12;
/// The length of a ring element serialized at 12 bits per coefficient
pub(crate) const ENCODED_ELEM_LEN: usize = RING_DEG * FULL_COEFF_BITS / 8;

/// Length of every seed, hash, message and shared secret that moves through the scheme
pub(crate) const SEED_LEN: usize = 32;

// Key for the following constants:
//   * K is the rank of the module, i.e., the length of the secret vector.
//     E.g., a secret in ML-KEM-768 is an element of R_q^3
//   * ETA1 is the width of the binomial distribution for the secret and the keygen error.
//     ETA2 is the width for the encryption errors
//   * DU and DV are the number of bits each coefficient of the ciphertext halves is compressed to

pub(crate) const MLKEM512_K: usize = 2;
pub(crate) const MLKEM512_ETA1: usize = 3;
pub(crate) const MLKEM512_DU: usize = 10;
pub(crate) const MLKEM512_DV: usize = 4;

pub(crate) const MLKEM768_K: usize = 3;
pub(crate) const MLKEM768_ETA1: usize = 2;
pub(crate) const MLKEM768_DU: usize = 10;
pub(crate) const MLKEM768_DV: usize = 4;

pub(crate) const MLKEM1024_K: usize = 4;
pub(crate) const MLKEM1024_ETA1: usize = 2;
pub(crate) const MLKEM1024_DU: usize = 11;
pub(crate) const MLKEM1024_DV: usize = 5;

/// η2 is the same for every parameter set
pub(crate) const ETA2: usize = 2;

// We need to store maximum values because we can't do const arithmetic on some buffer sizes

/// The maximum possible k value is k=4, set by ML-KEM-1024
pub(crate) const MAX_K: usize = 4;
/// The maximum possible η value is η=3, set by ML-KEM-512
pub(crate) const MAX_ETA: usize = 3;

/// The length of an encapsulation key with rank `k`
pub(crate) const fn encapsulation_key_len(k: usize) -> usize {
    k * ENCODED_ELEM_LEN + SEED_LEN
}

/// The length of a decapsulation key with rank `k`
pub(crate) const fn decapsulation_key_len(k: usize) -> usize {
    k * ENCODED_ELEM_LEN + encapsulation_key_len(k) + 2 * SEED_LEN
}

/// The length of a ciphertext with rank `k` and compression widths `du`, `dv`
pub(crate) const fn ciphertext_len(k: usize, du: usize, dv: usize) -> usize {
    RING_DEG * (du * k + dv) / 8
}

pub(crate) const MAX_ENCAPSULATION_KEY_LEN: usize = encapsulation_key_len(MAX_K);
pub(crate) const MAX_DECAPSULATION_KEY_LEN: usize = decapsulation_key_len(MAX_K);
pub(crate) const MAX_CIPHERTEXT_LEN: usize =
    ciphertext_len(MLKEM1024_K, MLKEM1024_DU, MLKEM1024_DV);
