/// Errors surfaced when constructing keys or decapsulating. Nothing below the key objects returns
/// these; malformed ciphertexts of the right length are not errors at all
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("wrong encapsulation key size {0}, should be 800, 1184 or 1568")]
    EncapsulationKeySize(usize),

    #[error("wrong decapsulation key size {0}, should be 1632, 2400 or 3168")]
    DecapsulationKeySize(usize),

    #[error("wrong ciphertext size {actual}, should be {expected}")]
    CiphertextSize { actual: usize, expected: usize },

    #[error("wrong key derivation seed size {0}, should be 64")]
    SeedSize(usize),

    #[error("encapsulation key contains a non-canonical coefficient")]
    EncapsulationKeyInconsistent,

    #[error("decapsulation key hash does not match its encapsulation key")]
    DecapsulationKeyInconsistent,
}

impl Error {
    /// True if the supplied bytes had a length no parameter set accepts
    pub fn is_size_mismatch(&self) -> bool {
        matches!(
            self,
            Error::EncapsulationKeySize(_)
                | Error::DecapsulationKeySize(_)
                | Error::CiphertextSize { .. }
                | Error::SeedSize(_)
        )
    }

    /// True if the supplied key bytes had the right length but failed a structural check
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self,
            Error::EncapsulationKeyInconsistent | Error::DecapsulationKeyInconsistent
        )
    }
}

pub type Result<T> = core::result::Result<T, Error>;
