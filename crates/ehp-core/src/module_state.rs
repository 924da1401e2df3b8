use std::fmt;

use serde::{Deserialize, Serialize};

/// Module type of a class over F2[τ].
///
/// The raw data encodes this as an optional exponent where `None` is free,
/// `Some(0)` is dead and `Some(n)` is F2[τ]/τ^n. Keeping the three cases as
/// variants removes the 0-versus-absent ambiguity from the replay rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "exponent", rename_all = "lowercase")]
pub enum ModuleState {
    /// Killed by a differential or tau multiplication.
    Dead,
    /// Free F2[τ]-module.
    Free,
    /// F2[τ]/τ^n with n ≥ 1.
    Torsion(u32),
}

impl ModuleState {
    /// Exponents at or below zero mean the class is gone. Exponents past
    /// `u32::MAX` saturate.
    pub fn from_exponent(n: i64) -> Self {
        if n <= 0 {
            Self::Dead
        } else {
            Self::Torsion(u32::try_from(n).unwrap_or(u32::MAX))
        }
    }

    pub fn from_raw(torsion: Option<u32>) -> Self {
        match torsion {
            None => Self::Free,
            Some(0) => Self::Dead,
            Some(n) => Self::Torsion(n),
        }
    }

    /// Inverse of [`ModuleState::from_raw`].
    pub fn to_raw(self) -> Option<u32> {
        match self {
            Self::Dead => Some(0),
            Self::Free => None,
            Self::Torsion(n) => Some(n),
        }
    }

    pub fn is_alive(self) -> bool {
        !self.is_dead()
    }

    pub fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    pub fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }

    pub fn exponent(self) -> Option<u32> {
        match self {
            Self::Torsion(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dead => write!(f, "0"),
            Self::Free => write!(f, "F2[τ]"),
            Self::Torsion(n) => write!(f, "F2[τ]/τ^{n}"),
        }
    }
}
