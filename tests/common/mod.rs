//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use arbor_core::{Ledger, LedgerError};
use arbor_types::{MarketRef, PayoutDistributionHash, Timestamp, UniverseConfig, UniverseRef};

/// A fixed wall clock, mid-period under the default schedule.
pub const NOW: u64 = 1_509_000_000;

pub fn now() -> Timestamp {
    Timestamp::from_secs(NOW)
}

pub fn label(text: &str) -> PayoutDistributionHash {
    PayoutDistributionHash::from_label(text).expect("label fits in a payout hash")
}

/// Unwrap a query whose handles the test registered itself.
pub fn known(answer: Result<bool, LedgerError>) -> bool {
    answer.expect("known handle")
}

/// A ledger seeded with one genesis universe.
pub struct Fixture {
    pub ledger: Ledger,
    pub genesis: UniverseRef,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(UniverseConfig::default())
    }

    pub fn with_config(config: UniverseConfig) -> Self {
        let mut ledger = Ledger::new(config);
        let genesis = ledger.create_genesis_universe().expect("genesis universe");
        Self { ledger, genesis }
    }

    /// A market in `universe` whose end time is `NOW`.
    pub fn market(&mut self, universe: UniverseRef) -> MarketRef {
        self.ledger.create_market(universe, now()).expect("market")
    }

    pub fn child(&mut self, parent: UniverseRef, payout: &str) -> UniverseRef {
        self.ledger
            .get_or_create_child_universe(parent, label(payout))
            .expect("child universe")
    }
}
