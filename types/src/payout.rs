//! Payout distribution hashes: the fingerprint of one disputed outcome.
//!
//! A child universe is identified relative to its parent by the hash of the
//! payout it represents. The root universe carries [`PayoutDistributionHash::ZERO`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const PAYOUT_HASH_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayoutHashError {
    #[error("payout label is {len} bytes, at most {PAYOUT_HASH_LEN} fit in a payout hash")]
    LabelTooLong { len: usize },
    #[error("payout hash must be {PAYOUT_HASH_LEN} bytes of hex, got {len} bytes")]
    WrongLength { len: usize },
    #[error("payout hash is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayoutDistributionHash([u8; PAYOUT_HASH_LEN]);

impl PayoutDistributionHash {
    pub const ZERO: Self = Self([0; PAYOUT_HASH_LEN]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; PAYOUT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Fixed-size byte-string semantics: the label is copied to the front and
    /// the remainder is zero-filled.
    pub fn from_label(label: impl AsRef<[u8]>) -> Result<Self, PayoutHashError> {
        let label = label.as_ref();
        if label.len() > PAYOUT_HASH_LEN {
            return Err(PayoutHashError::LabelTooLong { len: label.len() });
        }
        let mut bytes = [0; PAYOUT_HASH_LEN];
        bytes[..label.len()].copy_from_slice(label);
        Ok(Self(bytes))
    }

    /// Fingerprint a payout vector.
    ///
    /// SHA-256 over each numerator as 16 big-endian bytes, followed by one
    /// byte for the invalid flag.
    #[must_use]
    pub fn derive(payout_numerators: &[u128], invalid: bool) -> Self {
        let mut hasher = Sha256::new();
        for numerator in payout_numerators {
            hasher.update(numerator.to_be_bytes());
        }
        hasher.update([u8::from(invalid)]);
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PAYOUT_HASH_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl FromStr for PayoutDistributionHash {
    type Err = PayoutHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(digits)?;
        let bytes: [u8; PAYOUT_HASH_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| PayoutHashError::WrongLength { len: decoded.len() })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for PayoutDistributionHash {
    type Error = PayoutHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayoutDistributionHash> for String {
    fn from(value: PayoutDistributionHash) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PayoutDistributionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PayoutDistributionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PayoutDistributionHash({self})")
    }
}
