//! The universe aggregate.
//!
//! A universe is a namespace of markets and reporting windows with its own
//! bond and open-interest accounting. It is created once, initialized once,
//! may fork once, and is never destroyed.
//!
//! The operations are split by concern:
//!
//! | Module          | Concern                                          |
//! |-----------------|--------------------------------------------------|
//! | (this module)   | reference registry and initialization            |
//! | [`windows`]     | timestamp → reporting window index               |
//! | [`containment`] | transitive "is X inside this universe" checks    |
//! | [`fork`]        | the unforked → forking transition                |
//! | [`children`]    | one child universe per payout distribution hash  |
//! | [`accounting`]  | bond collateral and open-interest counters       |
//!
//! Every mutating operation validates first and writes last. A collaborator
//! failure or a failed check returns before any field changes.

mod accounting;
mod children;
mod containment;
mod fork;
mod windows;


use std::collections::BTreeMap;

use serde::Serialize;

use arbor_types::{
    MarketRef, PayoutDistributionHash, ReportingWindowRef, ReputationTokenRef, Timestamp,
    UniverseConfig, UniverseRef, WindowId,
};

use crate::collaborators::ReputationTokenFactory;
use crate::errors::UniverseError;

use accounting::BondAccounts;
pub use fork::ForkState;

use children::ChildUniverses;
use windows::ReportingWindowIndex;

pub const UNIVERSE_TYPE_NAME: &str = "Universe";

/// References fixed at initialization and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lineage {
    /// `None` only for the genesis universe.
    pub parent_universe: Option<UniverseRef>,
    pub parent_payout_distribution_hash: PayoutDistributionHash,
    pub reputation_token: ReputationTokenRef,
}

#[derive(Debug, Clone)]
pub struct Universe {
    address: UniverseRef,
    config: UniverseConfig,
    lineage: Option<Lineage>,
    fork: ForkState,
    windows: ReportingWindowIndex,
    children: ChildUniverses,
    accounts: BondAccounts,
}

impl Universe {
    #[must_use]
    pub fn new(address: UniverseRef, config: UniverseConfig) -> Self {
        Self {
            address,
            config,
            lineage: None,
            fork: ForkState::Unforked,
            windows: ReportingWindowIndex::default(),
            children: ChildUniverses::default(),
            accounts: BondAccounts::default(),
        }
    }

    /// Initialize a child universe.
    ///
    /// Creates this universe's reputation token through `factory` and records
    /// the parent and the payout it represents. Allowed exactly once.
    pub fn initialize(
        &mut self,
        parent_universe: Option<UniverseRef>,
        parent_payout_distribution_hash: PayoutDistributionHash,
        factory: &mut impl ReputationTokenFactory,
    ) -> Result<ReputationTokenRef, UniverseError> {
        if self.lineage.is_some() {
            return Err(UniverseError::AlreadyInitialized);
        }
        let Some(parent) = parent_universe else {
            return Err(UniverseError::InvalidArgument("parent universe can not be unset"));
        };
        if parent == self.address {
            return Err(UniverseError::InvalidArgument("universe can not be its own parent"));
        }
        self.register(Some(parent), parent_payout_distribution_hash, factory)
    }

    /// Initialize the root of a universe tree: no parent, zero payout hash.
    pub fn initialize_genesis(
        &mut self,
        factory: &mut impl ReputationTokenFactory,
    ) -> Result<ReputationTokenRef, UniverseError> {
        if self.lineage.is_some() {
            return Err(UniverseError::AlreadyInitialized);
        }
        self.register(None, PayoutDistributionHash::ZERO, factory)
    }

    fn register(
        &mut self,
        parent_universe: Option<UniverseRef>,
        parent_payout_distribution_hash: PayoutDistributionHash,
        factory: &mut impl ReputationTokenFactory,
    ) -> Result<ReputationTokenRef, UniverseError> {
        let reputation_token = factory.create_reputation_token(self.address)?;
        self.lineage = Some(Lineage {
            parent_universe,
            parent_payout_distribution_hash,
            reputation_token,
        });
        tracing::info!(
            universe = %self.address,
            parent = ?parent_universe,
            payout = %parent_payout_distribution_hash,
            reputation_token = %reputation_token,
            "Universe initialized"
        );
        Ok(reputation_token)
    }

    #[must_use]
    pub const fn address(&self) -> UniverseRef {
        self.address
    }

    #[must_use]
    pub const fn config(&self) -> &UniverseConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.lineage.is_some()
    }

    #[must_use]
    pub fn reputation_token(&self) -> Option<ReputationTokenRef> {
        self.lineage.map(|lineage| lineage.reputation_token)
    }

    #[must_use]
    pub fn parent_universe(&self) -> Option<UniverseRef> {
        self.lineage.and_then(|lineage| lineage.parent_universe)
    }

    /// Zero for the genesis universe and before initialization.
    #[must_use]
    pub fn parent_payout_distribution_hash(&self) -> PayoutDistributionHash {
        self.lineage
            .map(|lineage| lineage.parent_payout_distribution_hash)
            .unwrap_or(PayoutDistributionHash::ZERO)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        UNIVERSE_TYPE_NAME
    }

    #[must_use]
    pub fn snapshot(&self) -> UniverseSnapshot {
        UniverseSnapshot {
            address: self.address,
            type_name: UNIVERSE_TYPE_NAME,
            parent_universe: self.parent_universe(),
            parent_payout_distribution_hash: self.parent_payout_distribution_hash(),
            reputation_token: self.reputation_token(),
            forking_market: self.forking_market(),
            fork_end_time: self.fork_end_time(),
            rep_available_for_extra_bond_payouts: self.rep_available_for_extra_bond_payouts(),
            extra_dispute_bond_remaining_to_be_paid_out: self
                .extra_dispute_bond_remaining_to_be_paid_out(),
            open_interest_in_atto_eth: self.open_interest_in_atto_eth(),
            reporting_windows: self.windows.iter().collect(),
            child_universes: self.child_universes().collect(),
        }
    }
}

/// Point-in-time copy of every field of a universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniverseSnapshot {
    pub address: UniverseRef,
    pub type_name: &'static str,
    pub parent_universe: Option<UniverseRef>,
    pub parent_payout_distribution_hash: PayoutDistributionHash,
    pub reputation_token: Option<ReputationTokenRef>,
    pub forking_market: Option<MarketRef>,
    pub fork_end_time: Timestamp,
    pub rep_available_for_extra_bond_payouts: u128,
    pub extra_dispute_bond_remaining_to_be_paid_out: u128,
    pub open_interest_in_atto_eth: u128,
    pub reporting_windows: BTreeMap<WindowId, ReportingWindowRef>,
    pub child_universes: BTreeMap<PayoutDistributionHash, UniverseRef>,
}
