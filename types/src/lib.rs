//! Core domain types for Arbor.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the ledger.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod caller;
mod ids;
mod payout;
mod settings;
mod time;

pub use caller::Caller;
pub use ids::{
    DisputeBondTokenRef, HandleError, MarketRef, ReportingWindowRef, ReputationTokenRef,
    ShareTokenRef, StakeTokenRef, UniverseRef,
};
pub use payout::{PAYOUT_HASH_LEN, PayoutDistributionHash, PayoutHashError};
pub use settings::{
    DEFAULT_DESIGNATED_REPORTING_DISPUTE_DURATION_SECS, DEFAULT_DESIGNATED_REPORTING_DURATION_SECS,
    DEFAULT_FORK_DURATION_SECS, DEFAULT_REPORTING_DISPUTE_DURATION_SECS,
    DEFAULT_REPORTING_DURATION_SECS, OpenInterestPolicy, ReportingSchedule, ScheduleError,
    UniverseConfig,
};
pub use time::{Timestamp, WindowId};
