//! Principal attribute flags

use std::fmt;

/// Attribute bitmask of a KDC principal.
///
/// Only the "disallow all tickets" flag is interpreted. Every other bit is
/// carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrincipalAttributes(u32);

impl PrincipalAttributes {
    /// KRB5_KDB_DISALLOW_ALL_TIX: the KDC issues no tickets for the principal
    pub const DISALLOW_ALL_TIX: u32 = 64;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_disabled(&self) -> bool {
        self.0 & Self::DISALLOW_ALL_TIX != 0
    }

    /// The same attributes with ticket issuance forbidden
    pub const fn disabled(&self) -> Self {
        Self(self.0 | Self::DISALLOW_ALL_TIX)
    }

    /// The same attributes with ticket issuance allowed again
    pub const fn enabled(&self) -> Self {
        if self.is_disabled() {
            Self(self.0 ^ Self::DISALLOW_ALL_TIX)
        } else {
            *self
        }
    }
}

impl From<u32> for PrincipalAttributes {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for PrincipalAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
