//! The three ML-KEM parameter sets and the lookups that pick one from a byte length

use crate::consts::*;

/// Selects one of the three ML-KEM parameter sets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// ML-KEM-512, rank 2
    MlKem512,
    /// ML-KEM-768, rank 3
    MlKem768,
    /// ML-KEM-1024, rank 4
    MlKem1024,
}

impl Kind {
    /// Every parameter set, smallest first
    pub const ALL: [Kind; 3] = [Kind::MlKem512, Kind::MlKem768, Kind::MlKem1024];

    /// Returns the parameter set this kind names
    pub fn params(self) -> &'static ParameterSet {
        match self {
            Kind::MlKem512 => &MLKEM512,
            Kind::MlKem768 => &MLKEM768,
            Kind::MlKem1024 => &MLKEM1024,
        }
    }
}

/// An immutable ML-KEM configuration. The only instances are the ones returned by
/// [`Kind::params`]
#[derive(Debug, PartialEq, Eq)]
pub struct ParameterSet {
    pub(crate) kind: Kind,
    pub(crate) k: usize,
    pub(crate) eta1: usize,
    pub(crate) eta2: usize,
    pub(crate) du: usize,
    pub(crate) dv: usize,
}

static MLKEM512: ParameterSet = ParameterSet {
    kind: Kind::MlKem512,
    k: MLKEM512_K,
    eta1: MLKEM512_ETA1,
    eta2: ETA2,
    du: MLKEM512_DU,
    dv: MLKEM512_DV,
};

static MLKEM768: ParameterSet = ParameterSet {
    kind: Kind::MlKem768,
    k: MLKEM768_K,
    eta1: MLKEM768_ETA1,
    eta2: ETA2,
    du: MLKEM768_DU,
    dv: MLKEM768_DV,
};

static MLKEM1024: ParameterSet = ParameterSet {
    kind: Kind::MlKem1024,
    k: MLKEM1024_K,
    eta1: MLKEM1024_ETA1,
    eta2: ETA2,
    du: MLKEM1024_DU,
    dv: MLKEM1024_DV,
};

impl ParameterSet {
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// The rank of the module
    pub const fn k(&self) -> usize {
        self.k
    }

    pub const fn eta1(&self) -> usize {
        self.eta1
    }

    pub const fn eta2(&self) -> usize {
        self.eta2
    }

    pub const fn du(&self) -> usize {
        self.du
    }

    pub const fn dv(&self) -> usize {
        self.dv
    }

    /// 384k + 32 bytes
    pub const fn encapsulation_key_len(&self) -> usize {
        encapsulation_key_len(self.k)
    }

    /// 768k + 96 bytes
    pub const fn decapsulation_key_len(&self) -> usize {
        decapsulation_key_len(self.k)
    }

    /// 32(du·k + dv) bytes
    pub const fn ciphertext_len(&self) -> usize {
        ciphertext_len(self.k, self.du, self.dv)
    }

    /// Length of the compressed `u` half of a ciphertext
    pub(crate) const fn ciphertext_u_len(&self) -> usize {
        RING_DEG * self.du * self.k / 8
    }

    /// Finds the parameter set whose encapsulation keys are `len` bytes long
    pub fn for_encapsulation_key_len(len: usize) -> Option<&'static ParameterSet> {
        Kind::ALL
            .iter()
            .map(|kind| kind.params())
            .find(|params| params.encapsulation_key_len() == len)
    }

    /// Finds the parameter set whose decapsulation keys are `len` bytes long
    pub fn for_decapsulation_key_len(len: usize) -> Option<&'static ParameterSet> {
        Kind::ALL
            .iter()
            .map(|kind| kind.params())
            .find(|params| params.decapsulation_key_len() == len)
    }
}
