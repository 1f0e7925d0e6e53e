//! Universe state machine for a decentralized prediction-market ledger.
//!
//! A [`Universe`] is the root namespace of markets, reporting windows and
//! reputation. The [`universe`] module holds the state machine itself,
//! [`collaborators`] the interfaces it consumes, [`memory`] an in-memory
//! implementation of those interfaces, and [`ledger`] the transactional
//! runtime that ties them together.

pub mod collaborators;
pub mod errors;
pub mod ledger;
pub mod memory;
pub mod universe;

pub use collaborators::{
    CollaboratorError, MarketView, ReportingWindowFactory, ReportingWindowView,
    ReputationTokenFactory, TokenView, UniverseFactory, UniverseView,
};
pub use errors::{Counter, ErrorKind, UniverseError};
pub use ledger::{Ledger, LedgerError, LedgerView};
pub use memory::{MarketRecord, PendingUniverse, ReportingWindowRecord, World};
pub use universe::{ForkState, UNIVERSE_TYPE_NAME, Universe, UniverseSnapshot};
