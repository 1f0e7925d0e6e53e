//! Typed entity handles.
//!
//! Every entity the ledger talks about is addressed by a handle. Handles wrap a
//! `NonZeroU64`, so zero is structurally unrepresentable and "no entity" is
//! always spelled `Option<Handle>::None`.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("entity handle must be a non-zero 64-bit integer")]
pub struct HandleError;

macro_rules! entity_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            pub fn try_new(value: u64) -> Result<Self, HandleError> {
                NonZeroU64::new(value).map(Self).ok_or(HandleError)
            }

            #[must_use]
            pub const fn from_non_zero(value: NonZeroU64) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn value(self) -> u64 {
                self.0.get()
            }

            /// Short entity kind used in `Display` output.
            #[must_use]
            pub const fn kind() -> &'static str {
                $label
            }
        }

        impl TryFrom<u64> for $name {
            type Error = HandleError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::try_new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

entity_handle!(
    /// A universe: the namespace of markets and reporting windows.
    UniverseRef,
    "universe"
);
entity_handle!(MarketRef, "market");
entity_handle!(ReportingWindowRef, "window");
entity_handle!(
    /// The reputation-stake accounting collaborator owned by one universe.
    ReputationTokenRef,
    "rep"
);
entity_handle!(StakeTokenRef, "stake");
entity_handle!(ShareTokenRef, "share");
entity_handle!(DisputeBondTokenRef, "bond");
