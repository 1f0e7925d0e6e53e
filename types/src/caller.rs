//! Explicit caller capabilities.
//!
//! A privileged operation never inspects ambient call context. The caller
//! states which role it claims; the universe then verifies the claim against
//! its own references or the containment chain.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{DisputeBondTokenRef, MarketRef, ReputationTokenRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "handle", rename_all = "snake_case")]
pub enum Caller {
    /// An account with no claimed protocol role.
    External,
    Market(MarketRef),
    ReputationToken(ReputationTokenRef),
    DisputeBondToken(DisputeBondTokenRef),
}

impl Caller {
    #[must_use]
    pub const fn market(self) -> Option<MarketRef> {
        match self {
            Self::Market(market) => Some(market),
            _ => None,
        }
    }

    #[must_use]
    pub const fn reputation_token(self) -> Option<ReputationTokenRef> {
        match self {
            Self::ReputationToken(token) => Some(token),
            _ => None,
        }
    }

    #[must_use]
    pub const fn dispute_bond_token(self) -> Option<DisputeBondTokenRef> {
        match self {
            Self::DisputeBondToken(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => f.write_str("external"),
            Self::Market(market) => write!(f, "{market}"),
            Self::ReputationToken(token) => write!(f, "{token}"),
            Self::DisputeBondToken(token) => write!(f, "{token}"),
        }
    }
}
