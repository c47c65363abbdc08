//! A pure-Rust implementation of ML-KEM (FIPS 203), the module-lattice key-encapsulation
//! mechanism formerly known as Kyber, for all three parameter sets.
//!
//! ```
//! use kyber_kem::{generate_keypair, Kind};
//!
//! let mut rng = rand::thread_rng();
//! let (ek, dk) = generate_keypair(Kind::MlKem768, &mut rng);
//!
//! let (ss1, ct) = ek.encapsulate(&mut rng);
//! let ss2 = dk.decapsulate(ct.as_bytes()).unwrap();
//! assert_eq!(ss1, ss2);
//! ```
//!
//! Keys and ciphertexts carry no type tag. The parameter set of a key is inferred from its length,
//! and a ciphertext is checked against the length its decapsulation key expects.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

// Logging is compiled out unless the `tracing` feature is on. Never pass secret material to
// these macros

#[cfg(feature = "tracing")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

mod arithmetic;
mod consts;
mod error;
mod gen;
mod hash;
mod kem;
mod keys;
mod params;
mod pke;
mod ser;

#[cfg(test)]
mod kat;

pub extern crate kem as kem_traits;

pub use error::{Error, Result};
pub use keys::{
    derive_keypair, generate_keypair, Ciphertext, DecapsulationKey, EncapsulationKey,
    SharedSecret, KEYPAIR_SEED_LEN,
};
pub use params::{Kind, ParameterSet};
