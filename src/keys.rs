//! Contains the external-facing key, ciphertext and shared secret types

use crate::{
    consts::{MAX_CIPHERTEXT_LEN, MAX_DECAPSULATION_KEY_LEN, MAX_ENCAPSULATION_KEY_LEN, SEED_LEN},
    error::{Error, Result},
    hash::hash_h,
    kem,
    params::{Kind, ParameterSet},
};

use core::{convert::Infallible, fmt};

use kem_traits::{Decapsulate, Encapsulate};
use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The length of the seed accepted by [`derive_keypair`]
pub const KEYPAIR_SEED_LEN: usize = 2 * SEED_LEN;

/// The public half of an ML-KEM keypair. Anyone holding it can encapsulate shared secrets to the
/// owner of the matching [`DecapsulationKey`]
#[derive(Clone)]
pub struct EncapsulationKey {
    params: &'static ParameterSet,
    bytes: [u8; MAX_ENCAPSULATION_KEY_LEN],
}

/// The private half of an ML-KEM keypair. The key bytes are wiped when this is dropped
#[derive(Clone)]
pub struct DecapsulationKey {
    params: &'static ParameterSet,
    bytes: [u8; MAX_DECAPSULATION_KEY_LEN],
    ek: EncapsulationKey,
}

/// The ciphertext, or "encapsulated key", produced by [`EncapsulationKey::encapsulate`]
#[derive(Clone)]
pub struct Ciphertext {
    params: &'static ParameterSet,
    bytes: [u8; MAX_CIPHERTEXT_LEN],
}

/// The 32-byte shared secret of a KEM execution. Comparisons are constant-time, and the bytes are
/// wiped when this is dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SEED_LEN]);

/// Generates a fresh keypair for the given parameter set
pub fn generate_keypair(
    kind: Kind,
    rng: &mut impl CryptoRngCore,
) -> (EncapsulationKey, DecapsulationKey) {
    let mut d = Zeroizing::new([0u8; SEED_LEN]);
    let mut z = Zeroizing::new([0u8; SEED_LEN]);
    rng.fill_bytes(d.as_mut_slice());
    rng.fill_bytes(z.as_mut_slice());

    keypair_from_seeds(kind.params(), &d, &z)
}

/// Deterministically derives a keypair from a 64-byte seed `d ‖ z`. The same seed always gives
/// the same keypair, so the seed must be kept as secret as the decapsulation key itself
pub fn derive_keypair(kind: Kind, seed: &[u8]) -> Result<(EncapsulationKey, DecapsulationKey)> {
    if seed.len() != KEYPAIR_SEED_LEN {
        log_warn!(len = seed.len(), "rejected key derivation seed");
        return Err(Error::SeedSize(seed.len()));
    }

    let (d_bytes, z_bytes) = seed.split_at(SEED_LEN);
    let mut d = Zeroizing::new([0u8; SEED_LEN]);
    let mut z = Zeroizing::new([0u8; SEED_LEN]);
    d.copy_from_slice(d_bytes);
    z.copy_from_slice(z_bytes);

    Ok(keypair_from_seeds(kind.params(), &d, &z))
}

/// Runs key generation on the given seeds. The keys are built without validation, since we
/// produced them ourselves
pub(crate) fn keypair_from_seeds(
    params: &'static ParameterSet,
    d: &[u8; SEED_LEN],
    z: &[u8; SEED_LEN],
) -> (EncapsulationKey, DecapsulationKey) {
    let mut ek_buf = [0u8; MAX_ENCAPSULATION_KEY_LEN];
    let mut dk_buf = Zeroizing::new([0u8; MAX_DECAPSULATION_KEY_LEN]);
    let ek_bytes = &mut ek_buf[..params.encapsulation_key_len()];
    let dk_bytes = &mut dk_buf[..params.decapsulation_key_len()];
    kem::keygen(params, d, z, ek_bytes, dk_bytes);

    log_debug!(kind = ?params.kind, "generated keypair");

    let ek = EncapsulationKey::from_bytes_unchecked(params, ek_bytes);
    let dk = DecapsulationKey::from_bytes_unchecked(params, dk_bytes);
    (ek, dk)
}

impl EncapsulationKey {
    /// Parses an encapsulation key. The parameter set is inferred from the length. Fails if the
    /// length matches no parameter set, or if any coefficient of the key is not reduced mod q
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let params = ParameterSet::for_encapsulation_key_len(bytes.len()).ok_or_else(|| {
            log_warn!(len = bytes.len(), "rejected encapsulation key of unknown size");
            Error::EncapsulationKeySize(bytes.len())
        })?;
        log_debug!(kind = ?params.kind, "parsing encapsulation key");

        if !kem::encapsulation_key_is_canonical(params, bytes) {
            log_warn!(kind = ?params.kind, "rejected non-canonical encapsulation key");
            return Err(Error::EncapsulationKeyInconsistent);
        }

        Ok(Self::from_bytes_unchecked(params, bytes))
    }

    /// Wraps the given bytes without checking them. `bytes` MUST have length
    /// `params.encapsulation_key_len()`
    pub(crate) fn from_bytes_unchecked(params: &'static ParameterSet, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), params.encapsulation_key_len());

        let mut buf = [0u8; MAX_ENCAPSULATION_KEY_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        EncapsulationKey { params, bytes: buf }
    }

    /// The serialized key, `ByteEncode_12(t̂) ‖ ρ`
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.params.encapsulation_key_len()]
    }

    pub fn kind(&self) -> Kind {
        self.params.kind
    }

    pub fn parameter_set(&self) -> &'static ParameterSet {
        self.params
    }

    /// Encapsulates a fresh shared secret to this key. Returns the shared secret and the
    /// ciphertext to send to the key's owner
    pub fn encapsulate(&self, rng: &mut impl CryptoRngCore) -> (SharedSecret, Ciphertext) {
        let mut m = Zeroizing::new([0u8; SEED_LEN]);
        rng.fill_bytes(m.as_mut_slice());
        self.encapsulate_deterministic(&m)
    }

    /// Encapsulates with a caller-chosen message `m`. Reusing `m` breaks security
    pub(crate) fn encapsulate_deterministic(
        &self,
        m: &[u8; SEED_LEN],
    ) -> (SharedSecret, Ciphertext) {
        let mut ct = Ciphertext {
            params: self.params,
            bytes: [0u8; MAX_CIPHERTEXT_LEN],
        };
        let ct_len = self.params.ciphertext_len();
        let shared_secret =
            kem::encapsulate(self.params, self.as_bytes(), m, &mut ct.bytes[..ct_len]);

        (SharedSecret(*shared_secret), ct)
    }
}

impl DecapsulationKey {
    /// Parses a decapsulation key. The parameter set is inferred from the length. Fails if the
    /// length matches no parameter set, if the embedded encapsulation key is invalid, or if the
    /// stored hash of the encapsulation key is wrong
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let params = ParameterSet::for_decapsulation_key_len(bytes.len()).ok_or_else(|| {
            log_warn!(len = bytes.len(), "rejected decapsulation key of unknown size");
            Error::DecapsulationKeySize(bytes.len())
        })?;
        log_debug!(kind = ?params.kind, "parsing decapsulation key");

        let parts = kem::split_decapsulation_key(params, bytes);
        let computed_hash = hash_h(parts.ek);
        if !bool::from(computed_hash[..].ct_eq(parts.hash_ek)) {
            log_warn!(kind = ?params.kind, "rejected decapsulation key with bad hash");
            return Err(Error::DecapsulationKeyInconsistent);
        }

        let ek = EncapsulationKey::from_bytes(parts.ek)?;
        Ok(Self::with_key_bytes(params, bytes, ek))
    }

    /// Wraps the given bytes without checking them. `bytes` MUST have length
    /// `params.decapsulation_key_len()`
    pub(crate) fn from_bytes_unchecked(params: &'static ParameterSet, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), params.decapsulation_key_len());

        let parts = kem::split_decapsulation_key(params, bytes);
        let ek = EncapsulationKey::from_bytes_unchecked(params, parts.ek);
        Self::with_key_bytes(params, bytes, ek)
    }

    // The key is copied straight into the struct, so the only copy of it is the one wiped on drop
    fn with_key_bytes(params: &'static ParameterSet, bytes: &[u8], ek: EncapsulationKey) -> Self {
        let mut dk = DecapsulationKey {
            params,
            bytes: [0u8; MAX_DECAPSULATION_KEY_LEN],
            ek,
        };
        dk.bytes[..bytes.len()].copy_from_slice(bytes);
        dk
    }

    /// The serialized key, `dk_pke ‖ ek ‖ H(ek) ‖ z`
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.params.decapsulation_key_len()]
    }

    pub fn kind(&self) -> Kind {
        self.params.kind
    }

    pub fn parameter_set(&self) -> &'static ParameterSet {
        self.params
    }

    /// The encapsulation key this key decapsulates for
    pub fn encapsulation_key(&self) -> &EncapsulationKey {
        &self.ek
    }

    /// Decapsulates the shared secret from a ciphertext. Only the length is checked; a ciphertext
    /// that was tampered with yields an unrelated secret rather than an error
    pub fn decapsulate(&self, ciphertext: &[u8]) -> Result<SharedSecret> {
        let expected = self.params.ciphertext_len();
        if ciphertext.len() != expected {
            log_warn!(
                kind = ?self.params.kind,
                len = ciphertext.len(),
                "rejected ciphertext of wrong size"
            );
            return Err(Error::CiphertextSize {
                actual: ciphertext.len(),
                expected,
            });
        }

        let shared_secret = kem::decapsulate(self.params, self.as_bytes(), ciphertext);
        Ok(SharedSecret(*shared_secret))
    }
}

impl Drop for DecapsulationKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl ZeroizeOnDrop for DecapsulationKey {}

impl Encapsulate<Ciphertext, SharedSecret> for EncapsulationKey {
    type Error = Infallible;

    fn encapsulate(
        &self,
        rng: &mut impl CryptoRngCore,
    ) -> core::result::Result<(Ciphertext, SharedSecret), Self::Error> {
        let (shared_secret, ciphertext) = EncapsulationKey::encapsulate(self, rng);
        Ok((ciphertext, shared_secret))
    }
}

/// Fails only if the ciphertext belongs to a different parameter set
impl Decapsulate<Ciphertext, SharedSecret> for DecapsulationKey {
    type Error = Error;

    fn decapsulate(&self, encapsulated_key: &Ciphertext) -> Result<SharedSecret> {
        DecapsulationKey::decapsulate(self, encapsulated_key.as_bytes())
    }
}

impl Ciphertext {
    /// Wraps a received ciphertext for the given parameter set
    pub fn from_bytes(kind: Kind, bytes: &[u8]) -> Result<Self> {
        let params = kind.params();
        let expected = params.ciphertext_len();
        if bytes.len() != expected {
            log_warn!(kind = ?kind, len = bytes.len(), "rejected ciphertext of wrong size");
            return Err(Error::CiphertextSize {
                actual: bytes.len(),
                expected,
            });
        }

        let mut buf = [0u8; MAX_CIPHERTEXT_LEN];
        buf[..expected].copy_from_slice(bytes);
        Ok(Ciphertext { params, bytes: buf })
    }

    /// The serialized ciphertext, `c₁ ‖ c₂`
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.params.ciphertext_len()]
    }

    pub fn kind(&self) -> Kind {
        self.params.kind
    }
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for EncapsulationKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Ciphertext {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for EncapsulationKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for EncapsulationKey {}

impl ConstantTimeEq for DecapsulationKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for DecapsulationKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for DecapsulationKey {}

impl PartialEq for Ciphertext {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Ciphertext {}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for EncapsulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncapsulationKey")
            .field("kind", &self.params.kind)
            .field("len", &self.as_bytes().len())
            .finish()
    }
}

impl fmt::Debug for DecapsulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecapsulationKey")
            .field("kind", &self.params.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext")
            .field("kind", &self.params.kind)
            .field("len", &self.as_bytes().len())
            .finish()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_api() {
        let mut rng = rand::thread_rng();

        for kind in Kind::ALL {
            for _ in 0..20 {
                let (ek, dk) = generate_keypair(kind, &mut rng);

                // Serialize and deserialize the keys
                let dk = DecapsulationKey::from_bytes(dk.as_bytes()).unwrap();
                let ek = EncapsulationKey::from_bytes(ek.as_bytes()).unwrap();
                assert_eq!(dk.encapsulation_key(), &ek);
                assert_eq!(ek.kind(), kind);
                assert_eq!(dk.kind(), kind);

                let (ss1, ct) = ek.encapsulate(&mut rng);
                assert_eq!(ct.as_bytes().len(), kind.params().ciphertext_len());

                let receiver_ct = Ciphertext::from_bytes(kind, ct.as_bytes()).unwrap();
                assert_eq!(receiver_ct, ct);
                let ss2 = dk.decapsulate(receiver_ct.as_bytes()).unwrap();

                assert_eq!(ss1, ss2);
                assert_eq!(ss1.as_bytes().len(), 32);

                // Same thing through the KEM traits
                let (ct, ss1) = Encapsulate::encapsulate(&ek, &mut rng).unwrap();
                let ss2 = Decapsulate::decapsulate(&dk, &ct).unwrap();
                assert_eq!(ss1, ss2);
            }
        }
    }

    // A ciphertext for another parameter set is a size error through the trait as well
    #[test]
    fn trait_decapsulate_checks_parameter_set() {
        let mut rng = rand::thread_rng();
        let (ek, _) = generate_keypair(Kind::MlKem512, &mut rng);
        let (_, dk) = generate_keypair(Kind::MlKem1024, &mut rng);

        let (ct, _) = Encapsulate::encapsulate(&ek, &mut rng).unwrap();
        let err = Decapsulate::decapsulate(&dk, &ct).unwrap_err();
        assert_eq!(
            err,
            Error::CiphertextSize {
                actual: 768,
                expected: 1568,
            }
        );
    }

    // Parsed keys hold their bytes only in the struct, and dropping the struct wipes them
    #[test]
    fn dropped_decapsulation_key_is_wiped() {
        let mut rng = rand::thread_rng();
        let (_, dk) = generate_keypair(Kind::MlKem768, &mut rng);

        let parsed = DecapsulationKey::from_bytes(dk.as_bytes()).unwrap();
        let mut parsed = core::mem::ManuallyDrop::new(parsed);
        assert_eq!(parsed.as_bytes(), dk.as_bytes());

        unsafe { core::ptr::drop_in_place(&mut *parsed) };
        assert!(parsed.bytes.iter().all(|&b| b == 0));
    }

    // The smallest parameter set end to end, with its fixed sizes
    #[test]
    fn mlkem512_scenario() {
        let mut rng = rand::thread_rng();
        let (ek, dk) = generate_keypair(Kind::MlKem512, &mut rng);
        assert_eq!(ek.as_bytes().len(), 800);
        assert_eq!(dk.as_bytes().len(), 1632);

        let (ss1, ct) = ek.encapsulate(&mut rng);
        assert_eq!(ct.as_bytes().len(), 768);
        let ss2 = dk.decapsulate(ct.as_bytes()).unwrap();
        assert_eq!(ss1.as_bytes(), ss2.as_bytes());
    }

    #[test]
    fn wrong_sizes() {
        let mut rng = rand::thread_rng();

        for kind in Kind::ALL {
            let params = kind.params();
            let (ek, dk) = generate_keypair(kind, &mut rng);

            let ek_short = &ek.as_bytes()[..params.encapsulation_key_len() - 1];
            let err = EncapsulationKey::from_bytes(ek_short).unwrap_err();
            assert_eq!(err, Error::EncapsulationKeySize(params.encapsulation_key_len() - 1));
            assert!(err.is_size_mismatch());

            let dk_short = &dk.as_bytes()[..params.decapsulation_key_len() - 1];
            let err = DecapsulationKey::from_bytes(dk_short).unwrap_err();
            assert!(err.is_size_mismatch());
            assert!(!err.is_inconsistent());

            let (_, ct) = ek.encapsulate(&mut rng);
            let ct_short = &ct.as_bytes()[..params.ciphertext_len() - 1];
            let err = dk.decapsulate(ct_short).unwrap_err();
            assert_eq!(
                err,
                Error::CiphertextSize {
                    actual: params.ciphertext_len() - 1,
                    expected: params.ciphertext_len(),
                }
            );
            assert!(Ciphertext::from_bytes(kind, ct_short).is_err());
        }

        assert_eq!(
            derive_keypair(Kind::MlKem768, &[0u8; 63]).unwrap_err(),
            Error::SeedSize(63)
        );
        assert!(EncapsulationKey::from_bytes(&[]).unwrap_err().is_size_mismatch());
    }

    // All 0xff is 4095 in every coefficient, which is not a canonical encoding
    #[test]
    fn non_canonical_encapsulation_key() {
        for kind in Kind::ALL {
            let len = kind.params().encapsulation_key_len();
            let bytes = vec![0xffu8; len];
            let err = EncapsulationKey::from_bytes(&bytes).unwrap_err();
            assert_eq!(err, Error::EncapsulationKeyInconsistent);
            assert!(err.is_inconsistent());
        }
    }

    // Flipping any byte of the stored H(ek) is caught
    #[test]
    fn corrupted_decapsulation_key_hash() {
        let mut rng = rand::thread_rng();

        for kind in Kind::ALL {
            let k = kind.params().k();
            let (_, dk) = generate_keypair(kind, &mut rng);
            let hash_offset = 768 * k + 32;

            for i in [0, 17, 31] {
                let mut bytes = dk.as_bytes().to_vec();
                bytes[hash_offset + i] ^= 0x01;
                let err = DecapsulationKey::from_bytes(&bytes).unwrap_err();
                assert_eq!(err, Error::DecapsulationKeyInconsistent);
            }

            // Changing z is not detectable, and not an error
            let mut bytes = dk.as_bytes().to_vec();
            let last = bytes.len() - 1;
            bytes[last] ^= 0x01;
            assert!(DecapsulationKey::from_bytes(&bytes).is_ok());
        }
    }

    // Decapsulating a tampered ciphertext succeeds with a different secret
    #[test]
    fn corrupted_ciphertext() {
        let mut rng = rand::thread_rng();

        for kind in Kind::ALL {
            let (ek, dk) = generate_keypair(kind, &mut rng);
            let (ss, ct) = ek.encapsulate(&mut rng);

            let mut bytes = ct.as_bytes().to_vec();
            bytes[0] ^= 0x80;
            let rejected = dk.decapsulate(&bytes).unwrap();
            assert_ne!(rejected, ss);
        }
    }

    // The rejection key is SHAKE256(z ‖ c) over the exact bytes received, for every set
    #[test]
    fn rejected_ciphertext_yields_shake256_of_z_and_ciphertext() {
        use sha3::{
            digest::{ExtendableOutput, Update, XofReader},
            Shake256,
        };

        let seed: [u8; KEYPAIR_SEED_LEN] = core::array::from_fn(|i| (3 * i + 1) as u8);
        for kind in Kind::ALL {
            let (ek, dk) = derive_keypair(kind, &seed).unwrap();
            let (ss, ct) = ek.encapsulate_deterministic(&[0x5a; 32]);

            let mut bad_ct = ct.as_bytes().to_vec();
            let last = bad_ct.len() - 1;
            bad_ct[last] ^= 0x40;
            let rejected = dk.decapsulate(&bad_ct).unwrap();
            assert_ne!(rejected, ss);

            let mut h = Shake256::default();
            h.update(&seed[32..]);
            h.update(&bad_ct);
            let mut expected = [0u8; 32];
            h.finalize_xof().read(&mut expected);
            assert_eq!(rejected.as_bytes(), &expected);
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let mut seed = [0u8; KEYPAIR_SEED_LEN];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }

        for kind in Kind::ALL {
            let (ek1, dk1) = derive_keypair(kind, &seed).unwrap();
            let (ek2, dk2) = derive_keypair(kind, &seed).unwrap();
            assert_eq!(ek1, ek2);
            assert_eq!(dk1, dk2);

            // z is the tail of the decapsulation key
            assert_eq!(&dk1.as_bytes()[dk1.as_bytes().len() - 32..], &seed[32..]);

            // Deterministic encapsulation agrees on both ends
            let (ss, ct) = ek1.encapsulate_deterministic(&[7u8; 32]);
            let (ss_again, ct_again) = ek1.encapsulate_deterministic(&[7u8; 32]);
            assert_eq!(ct, ct_again);
            assert_eq!(ss, ss_again);
            assert_eq!(dk1.decapsulate(ct.as_bytes()).unwrap(), ss);
        }
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut rng = rand::thread_rng();
        let (ek, dk) = generate_keypair(Kind::MlKem768, &mut rng);
        let (ss, _) = ek.encapsulate(&mut rng);

        assert_eq!(format!("{ss:?}"), "SharedSecret(..)");
        assert_eq!(format!("{dk:?}"), "DecapsulationKey { kind: MlKem768, .. }");
        assert!(format!("{ek:?}").contains("1184"));
    }
}
