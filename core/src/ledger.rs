//! Transactional runtime over universes and their collaborators.
//!
//! Every mutating entry point runs through `Ledger::transact`. The world
//! and the target universe are checkpointed, the target is detached from the
//! arena so the operation can read every other universe while it mutates
//! this one, queued child universes are initialized, and only then is the
//! result committed. Any error restores both checkpoints.

use std::collections::BTreeMap;

use thiserror::Error;

use arbor_types::{
    Caller, DisputeBondTokenRef, MarketRef, PayoutDistributionHash, ReportingWindowRef,
    ShareTokenRef, StakeTokenRef, Timestamp, UniverseConfig, UniverseRef,
};

use crate::collaborators::{
    CollaboratorError, MarketView, ReportingWindowView, TokenView, UniverseView,
};
use crate::errors::{ErrorKind, UniverseError};
use crate::memory::World;
use crate::universe::{Universe, UniverseSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown universe {0}")]
    UnknownUniverse(UniverseRef),
    #[error("unknown market {0}")]
    UnknownMarket(MarketRef),
    #[error(transparent)]
    Universe(#[from] UniverseError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl LedgerError {
    /// Unknown handles are argument errors from the caller's point of view.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownUniverse(_) | Self::UnknownMarket(_) => ErrorKind::InvalidArgument,
            Self::Universe(err) => err.kind(),
            Self::Collaborator(_) => ErrorKind::Collaborator,
        }
    }
}

/// Read access to every universe plus the collaborator world.
///
/// During a transaction the target universe is detached, so a view handed to
/// it never contains the universe being mutated.
#[derive(Debug, Clone, Copy)]
pub struct LedgerView<'a> {
    universes: &'a BTreeMap<UniverseRef, Universe>,
    world: &'a World,
}

impl<'a> LedgerView<'a> {
    #[must_use]
    pub const fn new(universes: &'a BTreeMap<UniverseRef, Universe>, world: &'a World) -> Self {
        Self { universes, world }
    }
}

impl MarketView for LedgerView<'_> {
    fn reporting_window(&self, market: MarketRef) -> Option<ReportingWindowRef> {
        self.world.reporting_window(market)
    }

    fn market_contains_stake_token(&self, market: MarketRef, token: StakeTokenRef) -> bool {
        self.world.market_contains_stake_token(market, token)
    }

    fn market_contains_share_token(&self, market: MarketRef, token: ShareTokenRef) -> bool {
        self.world.market_contains_share_token(market, token)
    }

    fn market_contains_dispute_bond_token(
        &self,
        market: MarketRef,
        token: DisputeBondTokenRef,
    ) -> bool {
        self.world.market_contains_dispute_bond_token(market, token)
    }
}

impl ReportingWindowView for LedgerView<'_> {
    fn start_time(&self, window: ReportingWindowRef) -> Option<Timestamp> {
        self.world.start_time(window)
    }

    fn window_contains_market(&self, window: ReportingWindowRef, market: MarketRef) -> bool {
        self.world.window_contains_market(window, market)
    }
}

impl TokenView for LedgerView<'_> {
    fn market_of_stake_token(&self, token: StakeTokenRef) -> Option<MarketRef> {
        self.world.market_of_stake_token(token)
    }

    fn market_of_share_token(&self, token: ShareTokenRef) -> Option<MarketRef> {
        self.world.market_of_share_token(token)
    }

    fn market_of_dispute_bond_token(&self, token: DisputeBondTokenRef) -> Option<MarketRef> {
        self.world.market_of_dispute_bond_token(token)
    }
}

impl UniverseView for LedgerView<'_> {
    fn parent_payout_distribution_hash(
        &self,
        universe: UniverseRef,
    ) -> Option<PayoutDistributionHash> {
        self.universes
            .get(&universe)
            .filter(|universe| universe.is_initialized())
            .map(Universe::parent_payout_distribution_hash)
    }

    fn universe_contains_dispute_bond_token(
        &self,
        universe: UniverseRef,
        token: DisputeBondTokenRef,
    ) -> bool {
        self.universes
            .get(&universe)
            .is_some_and(|universe| universe.is_container_for_dispute_bond_token(token, self.world))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    config: UniverseConfig,
    universes: BTreeMap<UniverseRef, Universe>,
    world: World,
}

impl Ledger {
    #[must_use]
    pub fn new(config: UniverseConfig) -> Self {
        Self {
            config,
            universes: BTreeMap::new(),
            world: World::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &UniverseConfig {
        &self.config
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub const fn view(&self) -> LedgerView<'_> {
        LedgerView::new(&self.universes, &self.world)
    }

    #[must_use]
    pub fn universe(&self, universe: UniverseRef) -> Option<&Universe> {
        self.universes.get(&universe)
    }

    pub fn universes(&self) -> impl Iterator<Item = &Universe> + '_ {
        self.universes.values()
    }

    #[must_use]
    pub fn snapshot(&self, universe: UniverseRef) -> Option<UniverseSnapshot> {
        self.universe(universe).map(Universe::snapshot)
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<UniverseSnapshot> {
        self.universes.values().map(Universe::snapshot).collect()
    }

    fn existing(&self, universe: UniverseRef) -> Result<&Universe, LedgerError> {
        self.universes
            .get(&universe)
            .ok_or(LedgerError::UnknownUniverse(universe))
    }

    // ── Transactions ─────────────────────────────────────────

    /// Run `op` against `target` with all-or-nothing semantics.
    ///
    /// `op` gets the detached target, the world for factory calls and the
    /// remaining universes for cross-universe reads.
    fn transact<T>(
        &mut self,
        target: UniverseRef,
        label: &'static str,
        op: impl FnOnce(
            &mut Universe,
            &mut World,
            &BTreeMap<UniverseRef, Universe>,
        ) -> Result<T, UniverseError>,
    ) -> Result<T, LedgerError> {
        let world_checkpoint = self.world.clone();
        let Some(mut universe) = self.universes.remove(&target) else {
            return Err(LedgerError::UnknownUniverse(target));
        };
        let universe_checkpoint = universe.clone();

        let outcome = op(&mut universe, &mut self.world, &self.universes);
        self.universes.insert(target, universe);

        let mut created = Vec::new();
        let result = match outcome {
            Ok(value) => self.initialize_pending(&mut created).map(|()| value),
            Err(err) => Err(LedgerError::from(err)),
        };

        if let Err(err) = &result {
            for child in &created {
                self.universes.remove(child);
            }
            self.universes.insert(target, universe_checkpoint);
            self.world = world_checkpoint;
            tracing::debug!(
                universe = %target,
                operation = label,
                error = %err,
                "Rolled back"
            );
        }
        result
    }

    fn initialize_pending(&mut self, created: &mut Vec<UniverseRef>) -> Result<(), LedgerError> {
        for pending in self.world.take_pending_universes() {
            let mut child = Universe::new(pending.universe, self.config);
            child.initialize(
                Some(pending.parent),
                pending.parent_payout_distribution_hash,
                &mut self.world,
            )?;
            self.universes.insert(pending.universe, child);
            created.push(pending.universe);
        }
        Ok(())
    }

    // ── Registry ─────────────────────────────────────────────

    /// Create and initialize a root universe with no parent.
    pub fn create_genesis_universe(&mut self) -> Result<UniverseRef, LedgerError> {
        let world_checkpoint = self.world.clone();
        let result = self.spawn_genesis();
        match result {
            Ok(universe) => {
                let address = universe.address();
                self.universes.insert(address, universe);
                Ok(address)
            }
            Err(err) => {
                self.world = world_checkpoint;
                tracing::debug!(operation = "create_genesis_universe", error = %err, "Rolled back");
                Err(err)
            }
        }
    }

    fn spawn_genesis(&mut self) -> Result<Universe, LedgerError> {
        let address = self.world.allocate_universe()?;
        let mut universe = Universe::new(address, self.config);
        universe.initialize_genesis(&mut self.world)?;
        Ok(universe)
    }

    /// Create a market in the reporting window its end time maps to.
    pub fn create_market(
        &mut self,
        universe: UniverseRef,
        end_time: Timestamp,
    ) -> Result<MarketRef, LedgerError> {
        self.transact(universe, "create_market", |universe, world, _| {
            let window =
                universe.get_or_create_reporting_window_by_market_end_time(end_time, world)?;
            Ok(world.create_market(universe.address(), window, end_time)?)
        })
    }

    pub fn create_stake_token(&mut self, market: MarketRef) -> Result<StakeTokenRef, LedgerError> {
        self.known_market(market)?;
        Ok(self.world.create_stake_token(market)?)
    }

    pub fn create_share_token(&mut self, market: MarketRef) -> Result<ShareTokenRef, LedgerError> {
        self.known_market(market)?;
        Ok(self.world.create_share_token(market)?)
    }

    pub fn create_dispute_bond_token(
        &mut self,
        market: MarketRef,
    ) -> Result<DisputeBondTokenRef, LedgerError> {
        self.known_market(market)?;
        Ok(self.world.create_dispute_bond_token(market)?)
    }

    fn known_market(&self, market: MarketRef) -> Result<(), LedgerError> {
        if self.world.market(market).is_none() {
            return Err(LedgerError::UnknownMarket(market));
        }
        Ok(())
    }

    // ── Reporting windows ────────────────────────────────────

    pub fn get_or_create_reporting_window_by_timestamp(
        &mut self,
        universe: UniverseRef,
        timestamp: Timestamp,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "window_by_timestamp", |universe, world, _| {
            universe.get_or_create_reporting_window_by_timestamp(timestamp, world)
        })
    }

    pub fn get_or_create_reporting_window_by_market_end_time(
        &mut self,
        universe: UniverseRef,
        end_time: Timestamp,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "window_by_end_time", |universe, world, _| {
            universe.get_or_create_reporting_window_by_market_end_time(end_time, world)
        })
    }

    pub fn get_or_create_previous_reporting_window(
        &mut self,
        universe: UniverseRef,
        now: Timestamp,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "previous_window", |universe, world, _| {
            universe.get_or_create_previous_reporting_window(now, world)
        })
    }

    pub fn get_or_create_current_reporting_window(
        &mut self,
        universe: UniverseRef,
        now: Timestamp,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "current_window", |universe, world, _| {
            universe.get_or_create_current_reporting_window(now, world)
        })
    }

    pub fn get_or_create_next_reporting_window(
        &mut self,
        universe: UniverseRef,
        now: Timestamp,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "next_window", |universe, world, _| {
            universe.get_or_create_next_reporting_window(now, world)
        })
    }

    pub fn get_or_create_reporting_window_for_fork_end_time(
        &mut self,
        universe: UniverseRef,
    ) -> Result<ReportingWindowRef, LedgerError> {
        self.transact(universe, "fork_end_window", |universe, world, _| {
            universe.get_or_create_reporting_window_for_fork_end_time(world)
        })
    }

    // ── Fork & children ──────────────────────────────────────

    pub fn fork(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        now: Timestamp,
    ) -> Result<Timestamp, LedgerError> {
        self.transact(universe, "fork", |universe, world, others| {
            universe.fork(caller, now, &LedgerView::new(others, world))
        })
    }

    /// The child for `hash`, created and initialized on first request.
    pub fn get_or_create_child_universe(
        &mut self,
        universe: UniverseRef,
        hash: PayoutDistributionHash,
    ) -> Result<UniverseRef, LedgerError> {
        self.transact(universe, "child_universe", |universe, world, _| {
            universe.get_or_create_child_universe(hash, world)
        })
    }

    pub fn is_parent_of(
        &self,
        parent: UniverseRef,
        candidate: UniverseRef,
    ) -> Result<bool, LedgerError> {
        let universe = self.existing(parent)?;
        Ok(universe.is_parent_of(candidate, &self.view()))
    }

    // ── Containment ──────────────────────────────────────────

    pub fn is_container_for_reporting_window(
        &self,
        universe: UniverseRef,
        window: ReportingWindowRef,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .existing(universe)?
            .is_container_for_reporting_window(window, &self.world))
    }

    pub fn is_container_for_market(
        &self,
        universe: UniverseRef,
        market: MarketRef,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .existing(universe)?
            .is_container_for_market(market, &self.world))
    }

    pub fn is_container_for_stake_token(
        &self,
        universe: UniverseRef,
        token: StakeTokenRef,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .existing(universe)?
            .is_container_for_stake_token(token, &self.world))
    }

    pub fn is_container_for_share_token(
        &self,
        universe: UniverseRef,
        token: ShareTokenRef,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .existing(universe)?
            .is_container_for_share_token(token, &self.world))
    }

    pub fn is_container_for_dispute_bond_token(
        &self,
        universe: UniverseRef,
        token: DisputeBondTokenRef,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .existing(universe)?
            .is_container_for_dispute_bond_token(token, &self.world))
    }

    // ── Accounting ───────────────────────────────────────────

    pub fn increase_rep_available_for_extra_bond_payouts(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "increase_bond_rep", |universe, _, _| {
            universe.increase_rep_available_for_extra_bond_payouts(caller, amount)
        })
    }

    pub fn decrease_rep_available_for_extra_bond_payouts(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "decrease_bond_rep", |universe, world, others| {
            universe.decrease_rep_available_for_extra_bond_payouts(
                caller,
                amount,
                &LedgerView::new(others, world),
            )
        })
    }

    pub fn increase_extra_dispute_bond_remaining_to_be_paid_out(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "increase_extra_bond", |universe, world, _| {
            universe.increase_extra_dispute_bond_remaining_to_be_paid_out(caller, amount, world)
        })
    }

    pub fn decrease_extra_dispute_bond_remaining_to_be_paid_out(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "decrease_extra_bond", |universe, world, _| {
            universe.decrease_extra_dispute_bond_remaining_to_be_paid_out(caller, amount, world)
        })
    }

    pub fn increment_open_interest(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "increment_open_interest", |universe, world, _| {
            universe.increment_open_interest(caller, amount, world)
        })
    }

    pub fn decrement_open_interest(
        &mut self,
        universe: UniverseRef,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.transact(universe, "decrement_open_interest", |universe, world, _| {
            universe.decrement_open_interest(caller, amount, world)
        })
    }
}
