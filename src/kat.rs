//! This module contains code for running known-answer tests (KATs). Each test replays the first
//! case of the NIST KAT generator for one parameter set and compares a SHA-256 digest of the
//! resulting transcript against the published one

use crate::{
    consts::SEED_LEN,
    keys::{derive_keypair, DecapsulationKey, EncapsulationKey, KEYPAIR_SEED_LEN},
    params::Kind,
};

use std::{string::String, vec::Vec};

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// The length of the DRBG seed
const DRBG_SEED_LEN: usize = 48;

/// The RNG the NIST KAT generator uses. This is an AES-256 CTR DRBG with no personalization
/// string
struct KatRng(aes_ctr_drbg::DrbgCtx);

impl KatRng {
    fn new(seed: &[u8]) -> Self {
        assert_eq!(seed.len(), DRBG_SEED_LEN);
        let mut rng = aes_ctr_drbg::DrbgCtx::new();
        rng.init(seed, Vec::new());
        KatRng(rng)
    }
}

// Impl rand_core traits so the RNG can be handed to our crate
impl RngCore for KatRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.get_random(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }

    fn next_u32(&mut self) -> u32 {
        unimplemented!()
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!()
    }
}

impl CryptoRng for KatRng {}

/// Seeds the DRBG with the bytes 0, 1, ..., 47, like the KAT generator's `main` does
fn kat_entropy_rng() -> KatRng {
    let entropy: [u8; DRBG_SEED_LEN] = core::array::from_fn(|i| i as u8);
    KatRng::new(&entropy)
}

// The first seed the generator draws is the one printed in every `count = 0` record
#[test]
fn drbg() {
    let mut rng = kat_entropy_rng();
    let mut seed = [0u8; DRBG_SEED_LEN];
    rng.fill_bytes(&mut seed);

    assert_eq!(
        hex::encode_upper(seed),
        "061550234D158C5EC95595FE04EF7A25767F2E24CC2BC479D09D86DC9ABCFDE7\
         056A8C266F9EF97ED08541DBD2E1FFA1"
    );
}

/// Runs KAT case 0 for the given parameter set and returns the hex SHA-256 of its transcript
fn kat_transcript_digest(kind: Kind) -> String {
    // Draw the case seed, then reseed with it
    let mut seed = [0u8; DRBG_SEED_LEN];
    kat_entropy_rng().fill_bytes(&mut seed);
    let mut rng = KatRng::new(&seed);

    // Key generation draws d ‖ z in one call
    let mut keypair_coins = [0u8; KEYPAIR_SEED_LEN];
    rng.fill_bytes(&mut keypair_coins);
    let (ek, dk) = derive_keypair(kind, &keypair_coins).unwrap();

    // Encapsulation draws m
    let mut m = [0u8; SEED_LEN];
    rng.fill_bytes(&mut m);
    let (ss, ct) = ek.encapsulate_deterministic(&m);

    // The reference keys pass validation
    assert_eq!(EncapsulationKey::from_bytes(ek.as_bytes()).unwrap(), ek);
    let dk = DecapsulationKey::from_bytes(dk.as_bytes()).unwrap();
    assert_eq!(dk.decapsulate(ct.as_bytes()).unwrap(), ss);

    let mut transcript = String::new();
    transcript.push_str("count = 0\n");
    transcript.push_str(&format!("seed = {}\n", hex::encode_upper(seed)));
    transcript.push_str(&format!("pk = {}\n", hex::encode_upper(ek.as_bytes())));
    transcript.push_str(&format!("sk = {}\n", hex::encode_upper(dk.as_bytes())));
    transcript.push_str(&format!("ct = {}\n", hex::encode_upper(ct.as_bytes())));
    transcript.push_str(&format!("ss = {}\n", hex::encode_upper(ss.as_bytes())));

    hex::encode(Sha256::digest(transcript.as_bytes()))
}

#[test]
fn kat_mlkem512() {
    assert_eq!(
        kat_transcript_digest(Kind::MlKem512),
        "c70041a761e01cd6426fa60e9fd6a4412c2be817386c8d0f3334898082512782"
    );
}

#[test]
fn kat_mlkem768() {
    assert_eq!(
        kat_transcript_digest(Kind::MlKem768),
        "5352539586b6c3df58be6158a6250aeff402bd73060b0a3de68850ac074c17c3"
    );
}

#[test]
fn kat_mlkem1024() {
    assert_eq!(
        kat_transcript_digest(Kind::MlKem1024),
        "f580d851e5fb27e6876e5e203fa18be4cdbfd49e05d48fec3d3992c8f43a13e6"
    );
}
