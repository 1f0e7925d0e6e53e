//! In-memory collaborator world.
//!
//! Plays every entity a universe talks to: reputation tokens, reporting
//! windows, markets and their tokens. All handles come from one monotonic
//! allocator, so a handle is never reused across entity kinds.
//!
//! Universe creation only allocates the child's handle and queues it. The
//! [`Ledger`](crate::Ledger) owns universe state and initializes queued
//! children before it commits.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;
use std::num::NonZeroU64;

use serde::Serialize;

use arbor_types::{
    DisputeBondTokenRef, MarketRef, PayoutDistributionHash, ReportingWindowRef, ReputationTokenRef,
    ShareTokenRef, StakeTokenRef, Timestamp, UniverseRef,
};

use crate::collaborators::{
    CollaboratorError, MarketView, ReportingWindowFactory, ReportingWindowView,
    ReputationTokenFactory, TokenView, UniverseFactory,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingWindowRecord {
    pub universe: UniverseRef,
    pub start_time: Timestamp,
    pub markets: BTreeSet<MarketRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketRecord {
    pub universe: UniverseRef,
    pub reporting_window: ReportingWindowRef,
    pub end_time: Timestamp,
    pub stake_tokens: BTreeSet<StakeTokenRef>,
    pub share_tokens: BTreeSet<ShareTokenRef>,
    pub dispute_bond_tokens: BTreeSet<DisputeBondTokenRef>,
}

/// A child universe whose handle exists but whose state does not yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUniverse {
    pub universe: UniverseRef,
    pub parent: UniverseRef,
    pub parent_payout_distribution_hash: PayoutDistributionHash,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    last_handle: u64,
    universes: BTreeSet<UniverseRef>,
    reputation_tokens: BTreeMap<ReputationTokenRef, UniverseRef>,
    windows: BTreeMap<ReportingWindowRef, ReportingWindowRecord>,
    markets: BTreeMap<MarketRef, MarketRecord>,
    stake_tokens: BTreeMap<StakeTokenRef, MarketRef>,
    share_tokens: BTreeMap<ShareTokenRef, MarketRef>,
    dispute_bond_tokens: BTreeMap<DisputeBondTokenRef, MarketRef>,
    pending_universes: Vec<PendingUniverse>,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> Result<NonZeroU64, CollaboratorError> {
        let next = self
            .last_handle
            .checked_add(1)
            .ok_or(CollaboratorError::HandlesExhausted)?;
        let handle = NonZeroU64::new(next).ok_or(CollaboratorError::HandlesExhausted)?;
        self.last_handle = next;
        Ok(handle)
    }

    /// Reserve a universe handle. Used directly only for genesis universes.
    pub fn allocate_universe(&mut self) -> Result<UniverseRef, CollaboratorError> {
        let universe = UniverseRef::from_non_zero(self.allocate()?);
        self.universes.insert(universe);
        Ok(universe)
    }

    /// Create a market that reports in `reporting_window`.
    pub fn create_market(
        &mut self,
        universe: UniverseRef,
        reporting_window: ReportingWindowRef,
        end_time: Timestamp,
    ) -> Result<MarketRef, CollaboratorError> {
        if !self.windows.contains_key(&reporting_window) {
            return Err(unknown("reporting window", reporting_window.value()));
        }
        let market = MarketRef::from_non_zero(self.allocate()?);
        if let Some(window) = self.windows.get_mut(&reporting_window) {
            window.markets.insert(market);
        }
        self.markets.insert(
            market,
            MarketRecord {
                universe,
                reporting_window,
                end_time,
                stake_tokens: BTreeSet::new(),
                share_tokens: BTreeSet::new(),
                dispute_bond_tokens: BTreeSet::new(),
            },
        );
        tracing::debug!(%market, %universe, window = %reporting_window, "Market created");
        Ok(market)
    }

    pub fn create_stake_token(
        &mut self,
        market: MarketRef,
    ) -> Result<StakeTokenRef, CollaboratorError> {
        let token = StakeTokenRef::from_non_zero(self.allocate_for(market)?);
        self.market_mut(market)?.stake_tokens.insert(token);
        self.stake_tokens.insert(token, market);
        Ok(token)
    }

    pub fn create_share_token(
        &mut self,
        market: MarketRef,
    ) -> Result<ShareTokenRef, CollaboratorError> {
        let token = ShareTokenRef::from_non_zero(self.allocate_for(market)?);
        self.market_mut(market)?.share_tokens.insert(token);
        self.share_tokens.insert(token, market);
        Ok(token)
    }

    pub fn create_dispute_bond_token(
        &mut self,
        market: MarketRef,
    ) -> Result<DisputeBondTokenRef, CollaboratorError> {
        let token = DisputeBondTokenRef::from_non_zero(self.allocate_for(market)?);
        self.market_mut(market)?.dispute_bond_tokens.insert(token);
        self.dispute_bond_tokens.insert(token, market);
        Ok(token)
    }

    /// Validates `market` before spending a handle on it.
    fn allocate_for(&mut self, market: MarketRef) -> Result<NonZeroU64, CollaboratorError> {
        if !self.markets.contains_key(&market) {
            return Err(unknown("market", market.value()));
        }
        self.allocate()
    }

    fn market_mut(&mut self, market: MarketRef) -> Result<&mut MarketRecord, CollaboratorError> {
        self.markets
            .get_mut(&market)
            .ok_or_else(|| unknown("market", market.value()))
    }

    /// Drain the universes created since the last call.
    pub fn take_pending_universes(&mut self) -> Vec<PendingUniverse> {
        mem::take(&mut self.pending_universes)
    }

    #[must_use]
    pub fn has_pending_universes(&self) -> bool {
        !self.pending_universes.is_empty()
    }

    /// Leave exactly `remaining` handles before allocation starts failing.
    #[cfg(test)]
    pub(crate) fn limit_handles(&mut self, remaining: u64) {
        self.last_handle = u64::MAX - remaining;
    }

    #[must_use]
    pub fn market(&self, market: MarketRef) -> Option<&MarketRecord> {
        self.markets.get(&market)
    }

    pub fn markets(&self) -> impl Iterator<Item = (MarketRef, &MarketRecord)> + '_ {
        self.markets
            .iter()
            .map(|(market, record)| (*market, record))
    }

    #[must_use]
    pub fn reporting_window_record(
        &self,
        window: ReportingWindowRef,
    ) -> Option<&ReportingWindowRecord> {
        self.windows.get(&window)
    }

    #[must_use]
    pub fn owner_of_reputation_token(&self, token: ReputationTokenRef) -> Option<UniverseRef> {
        self.reputation_tokens.get(&token).copied()
    }

    #[must_use]
    pub fn knows_universe(&self, universe: UniverseRef) -> bool {
        self.universes.contains(&universe)
    }
}

fn unknown(kind: &'static str, handle: u64) -> CollaboratorError {
    CollaboratorError::UnknownEntity { kind, handle }
}

// ── Factories ────────────────────────────────────────────────

impl ReputationTokenFactory for World {
    fn create_reputation_token(
        &mut self,
        universe: UniverseRef,
    ) -> Result<ReputationTokenRef, CollaboratorError> {
        if !self.universes.contains(&universe) {
            return Err(unknown("universe", universe.value()));
        }
        let token = ReputationTokenRef::from_non_zero(self.allocate()?);
        self.reputation_tokens.insert(token, universe);
        Ok(token)
    }
}

impl ReportingWindowFactory for World {
    fn create_reporting_window(
        &mut self,
        universe: UniverseRef,
        start_time: Timestamp,
    ) -> Result<ReportingWindowRef, CollaboratorError> {
        let window = ReportingWindowRef::from_non_zero(self.allocate()?);
        self.windows.insert(
            window,
            ReportingWindowRecord {
                universe,
                start_time,
                markets: BTreeSet::new(),
            },
        );
        Ok(window)
    }
}

impl UniverseFactory for World {
    fn create_universe(
        &mut self,
        parent: UniverseRef,
        parent_payout_distribution_hash: PayoutDistributionHash,
    ) -> Result<UniverseRef, CollaboratorError> {
        let universe = self.allocate_universe()?;
        self.pending_universes.push(PendingUniverse {
            universe,
            parent,
            parent_payout_distribution_hash,
        });
        Ok(universe)
    }
}

// ── Views ────────────────────────────────────────────────────

impl MarketView for World {
    fn reporting_window(&self, market: MarketRef) -> Option<ReportingWindowRef> {
        self.markets
            .get(&market)
            .map(|record| record.reporting_window)
    }

    fn market_contains_stake_token(&self, market: MarketRef, token: StakeTokenRef) -> bool {
        self.markets
            .get(&market)
            .is_some_and(|record| record.stake_tokens.contains(&token))
    }

    fn market_contains_share_token(&self, market: MarketRef, token: ShareTokenRef) -> bool {
        self.markets
            .get(&market)
            .is_some_and(|record| record.share_tokens.contains(&token))
    }

    fn market_contains_dispute_bond_token(
        &self,
        market: MarketRef,
        token: DisputeBondTokenRef,
    ) -> bool {
        self.markets
            .get(&market)
            .is_some_and(|record| record.dispute_bond_tokens.contains(&token))
    }
}

impl ReportingWindowView for World {
    fn start_time(&self, window: ReportingWindowRef) -> Option<Timestamp> {
        self.windows.get(&window).map(|record| record.start_time)
    }

    fn window_contains_market(&self, window: ReportingWindowRef, market: MarketRef) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|record| record.markets.contains(&market))
    }
}

impl TokenView for World {
    fn market_of_stake_token(&self, token: StakeTokenRef) -> Option<MarketRef> {
        self.stake_tokens.get(&token).copied()
    }

    fn market_of_share_token(&self, token: ShareTokenRef) -> Option<MarketRef> {
        self.share_tokens.get(&token).copied()
    }

    fn market_of_dispute_bond_token(&self, token: DisputeBondTokenRef) -> Option<MarketRef> {
        self.dispute_bond_tokens.get(&token).copied()
    }
}
