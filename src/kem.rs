//! This file implements the IND-CCA-secure ML-KEM scheme on top of K-PKE. Everything here is
//! deterministic; randomness is drawn by the key types in `keys` and passed down as seeds

use crate::{
    consts::{MAX_CIPHERTEXT_LEN, MLKEM1024_K, MLKEM512_K, MLKEM768_K, SEED_LEN},
    hash::{hash_g, hash_h, hash_j},
    params::{Kind, ParameterSet},
    pke::{self, PkePublicKey, PkeSecretKey},
};

use subtle::{ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

/// Calls the rank-generic function `$func` monomorphized to the rank of `$params`
macro_rules! dispatch_rank {
    ($params:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $params.kind {
            Kind::MlKem512 => $func::<MLKEM512_K>($($arg),*),
            Kind::MlKem768 => $func::<MLKEM768_K>($($arg),*),
            Kind::MlKem1024 => $func::<MLKEM1024_K>($($arg),*),
        }
    };
}

/// The four fields of a decapsulation key, borrowed from its byte encoding
pub(crate) struct DecapsulationKeyParts<'a> {
    /// The K-PKE secret key ŝ
    pub(crate) dk_pke: &'a [u8],
    /// The encapsulation key
    pub(crate) ek: &'a [u8],
    /// H(ek), as stored
    pub(crate) hash_ek: &'a [u8],
    /// The implicit rejection seed
    pub(crate) z: &'a [u8],
}

/// Splits a decapsulation key into dk_pke ‖ ek ‖ H(ek) ‖ z. `dk` MUST have length
/// `params.decapsulation_key_len()`
pub(crate) fn split_decapsulation_key<'a>(
    params: &ParameterSet,
    dk: &'a [u8],
) -> DecapsulationKeyParts<'a> {
    debug_assert_eq!(dk.len(), params.decapsulation_key_len());

    let (dk_pke, rest) = dk.split_at(params.encapsulation_key_len() - SEED_LEN);
    let (ek, rest) = rest.split_at(params.encapsulation_key_len());
    let (hash_ek, z) = rest.split_at(SEED_LEN);

    DecapsulationKeyParts {
        dk_pke,
        ek,
        hash_ek,
        z,
    }
}

// Algorithm 16, ML-KEM.KeyGen_internal
/// Writes a keypair derived from the seeds `d` and `z` into `ek_out` and `dk_out`, which MUST have
/// lengths `params.encapsulation_key_len()` and `params.decapsulation_key_len()`
fn keygen_internal<const K: usize>(
    params: &ParameterSet,
    d: &[u8; SEED_LEN],
    z: &[u8; SEED_LEN],
    ek_out: &mut [u8],
    dk_out: &mut [u8],
) {
    debug_assert_eq!(ek_out.len(), params.encapsulation_key_len());
    debug_assert_eq!(dk_out.len(), params.decapsulation_key_len());

    let (pke_sk, pke_pk) = pke::gen_keypair::<K>(params, d);
    pke_pk.to_bytes(ek_out);

    // dk = dk_pke ‖ ek ‖ H(ek) ‖ z
    let rest = dk_out;

    let (out_dk_pke, rest) = rest.split_at_mut(PkeSecretKey::<K>::SERIALIZED_LEN);
    pke_sk.to_bytes(out_dk_pke);

    let (out_ek, rest) = rest.split_at_mut(PkePublicKey::<K>::SERIALIZED_LEN);
    out_ek.copy_from_slice(ek_out);

    let (out_hash_ek, rest) = rest.split_at_mut(SEED_LEN);
    out_hash_ek.copy_from_slice(&hash_h(ek_out));

    rest.copy_from_slice(z);
}

// Algorithm 17, ML-KEM.Encaps_internal
/// Encapsulates the message `m` to the encapsulation key `ek`, writing the ciphertext to `ct_out`
/// and returning the shared secret. `ct_out` MUST have length `params.ciphertext_len()`
fn encaps_internal<const K: usize>(
    params: &ParameterSet,
    ek: &[u8],
    m: &[u8; SEED_LEN],
    ct_out: &mut [u8],
) -> Zeroizing<[u8; SEED_LEN]> {
    debug_assert_eq!(ek.len(), params.encapsulation_key_len());

    // (K, r) = G(m ‖ H(ek))
    let (shared_secret, r) = hash_g(m, &hash_h(ek));
    let (shared_secret, r) = (Zeroizing::new(shared_secret), Zeroizing::new(r));

    // c = K-PKE.Encrypt(ek, m, r)
    let pke_pk = PkePublicKey::<K>::from_bytes(ek);
    pke::encrypt_deterministic::<K>(params, &pke_pk, m, &r, ct_out);

    shared_secret
}

// Algorithm 18, ML-KEM.Decaps_internal
/// Decapsulates a shared secret from the given ciphertext. Returns the shared secret, or a
/// pseudorandom value derived from z and the ciphertext if the ciphertext is invalid.
/// `ciphertext` MUST have length `params.ciphertext_len()`
fn decaps_internal<const K: usize>(
    params: &ParameterSet,
    dk: &[u8],
    ciphertext: &[u8],
) -> Zeroizing<[u8; SEED_LEN]> {
    debug_assert_eq!(ciphertext.len(), params.ciphertext_len());

    let parts = split_decapsulation_key(params, dk);
    let pke_sk = PkeSecretKey::<K>::from_bytes(parts.dk_pke);
    let pke_pk = PkePublicKey::<K>::from_bytes(parts.ek);
    let mut z = Zeroizing::new([0u8; SEED_LEN]);
    z.copy_from_slice(parts.z);

    // m' = K-PKE.Decrypt(dk_pke, c)
    let m = pke::decrypt::<K>(params, &pke_sk, ciphertext);

    // (K', r') = G(m' ‖ h)
    let (shared_secret, r) = hash_g(m.as_slice(), parts.hash_ek);
    let (shared_secret, r) = (Zeroizing::new(shared_secret), Zeroizing::new(r));

    // K̄ = J(z ‖ c)
    let rejection_secret = Zeroizing::new(hash_j(&z, ciphertext));

    // c' = K-PKE.Encrypt(ek, m', r')
    let mut buf = [0u8; MAX_CIPHERTEXT_LEN];
    let reconstructed_ct = &mut buf[..params.ciphertext_len()];
    pke::encrypt_deterministic::<K>(params, &pke_pk, &m, &r, reconstructed_ct);

    // Output K' if c == c', and K̄ otherwise
    let reconstruction_matched = reconstructed_ct.ct_eq(ciphertext);
    let mut out = Zeroizing::new([0u8; SEED_LEN]);
    for i in 0..SEED_LEN {
        out[i] = u8::conditional_select(
            &rejection_secret[i],
            &shared_secret[i],
            reconstruction_matched,
        );
    }
    out
}

/// Derives a keypair from the seeds `d` and `z` for the given parameter set.
/// `ek_out` and `dk_out` MUST have the key lengths of `params`
pub(crate) fn keygen(
    params: &ParameterSet,
    d: &[u8; SEED_LEN],
    z: &[u8; SEED_LEN],
    ek_out: &mut [u8],
    dk_out: &mut [u8],
) {
    dispatch_rank!(params, keygen_internal(params, d, z, ek_out, dk_out))
}

/// Encapsulates `m` to `ek` for the given parameter set. `ct_out` MUST have length
/// `params.ciphertext_len()`
pub(crate) fn encapsulate(
    params: &ParameterSet,
    ek: &[u8],
    m: &[u8; SEED_LEN],
    ct_out: &mut [u8],
) -> Zeroizing<[u8; SEED_LEN]> {
    dispatch_rank!(params, encaps_internal(params, ek, m, ct_out))
}

/// Decapsulates `ciphertext` with `dk` for the given parameter set. Both MUST have the lengths
/// `params` prescribes
pub(crate) fn decapsulate(
    params: &ParameterSet,
    dk: &[u8],
    ciphertext: &[u8],
) -> Zeroizing<[u8; SEED_LEN]> {
    dispatch_rank!(params, decaps_internal(params, dk, ciphertext))
}

/// Checks that the encapsulation key stores every coefficient of t̂ canonically
pub(crate) fn encapsulation_key_is_canonical(params: &ParameterSet, ek: &[u8]) -> bool {
    debug_assert_eq!(ek.len(), params.encapsulation_key_len());
    pke::t_hat_is_canonical(&ek[..params.encapsulation_key_len() - SEED_LEN])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::{MAX_DECAPSULATION_KEY_LEN, MAX_ENCAPSULATION_KEY_LEN};

    use rand::RngCore;

    /// Owned buffers for one keypair
    struct KeyBufs {
        ek: [u8; MAX_ENCAPSULATION_KEY_LEN],
        dk: [u8; MAX_DECAPSULATION_KEY_LEN],
    }

    fn gen_keys(params: &ParameterSet, rng: &mut impl RngCore) -> KeyBufs {
        let mut d = [0u8; SEED_LEN];
        let mut z = [0u8; SEED_LEN];
        rng.fill_bytes(&mut d);
        rng.fill_bytes(&mut z);

        let mut bufs = KeyBufs {
            ek: [0u8; MAX_ENCAPSULATION_KEY_LEN],
            dk: [0u8; MAX_DECAPSULATION_KEY_LEN],
        };
        keygen(
            params,
            &d,
            &z,
            &mut bufs.ek[..params.encapsulation_key_len()],
            &mut bufs.dk[..params.decapsulation_key_len()],
        );
        bufs
    }

    #[test]
    fn cca_correctness() {
        for kind in Kind::ALL {
            test_encap_decap(kind.params());
        }
    }

    fn test_encap_decap(params: &ParameterSet) {
        let mut rng = rand::thread_rng();

        for _ in 0..100 {
            let keys = gen_keys(params, &mut rng);
            let ek = &keys.ek[..params.encapsulation_key_len()];
            let dk = &keys.dk[..params.decapsulation_key_len()];

            let mut m = [0u8; SEED_LEN];
            rng.fill_bytes(&mut m);
            let mut ct_buf = vec![0u8; params.ciphertext_len()];

            let ss1 = encapsulate(params, ek, &m, &mut ct_buf);
            let ss2 = decapsulate(params, dk, &ct_buf);
            assert_eq!(ss1, ss2);
        }
    }

    // The decapsulation key embeds the encapsulation key and its hash
    #[test]
    fn decapsulation_key_layout() {
        let mut rng = rand::thread_rng();
        for kind in Kind::ALL {
            let params = kind.params();
            let keys = gen_keys(params, &mut rng);
            let ek = &keys.ek[..params.encapsulation_key_len()];
            let dk = &keys.dk[..params.decapsulation_key_len()];

            let parts = split_decapsulation_key(params, dk);
            assert_eq!(parts.dk_pke.len(), 384 * params.k());
            assert_eq!(parts.ek, ek);
            assert_eq!(parts.hash_ek, hash_h(ek));
            assert_eq!(parts.z.len(), SEED_LEN);
            assert!(encapsulation_key_is_canonical(params, ek));
        }
    }

    // A tampered ciphertext decapsulates to J(z ‖ c) rather than failing
    #[test]
    fn implicit_rejection() {
        let mut rng = rand::thread_rng();
        for kind in Kind::ALL {
            let params = kind.params();
            let keys = gen_keys(params, &mut rng);
            let ek = &keys.ek[..params.encapsulation_key_len()];
            let dk = &keys.dk[..params.decapsulation_key_len()];

            let mut m = [0u8; SEED_LEN];
            rng.fill_bytes(&mut m);
            let mut ct = vec![0u8; params.ciphertext_len()];
            let ss = encapsulate(params, ek, &m, &mut ct);

            let idx = (rng.next_u32() as usize) % ct.len();
            ct[idx] ^= 1 << (rng.next_u32() % 8);
            let rejected = decapsulate(params, dk, &ct);
            assert_ne!(rejected, ss);

            let mut z = [0u8; SEED_LEN];
            z.copy_from_slice(split_decapsulation_key(params, dk).z);
            assert_eq!(*rejected, hash_j(&z, &ct));

            // Rejection is deterministic
            assert_eq!(decapsulate(params, dk, &ct), rejected);
        }
    }
}
