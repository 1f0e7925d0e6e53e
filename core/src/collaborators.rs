//! Interfaces a universe consumes from the entities around it.
//!
//! Factories are the only collaborators that create state; views are pure
//! lookups keyed by handle. An unknown handle reads as "absent" (`None` or
//! `false`), never as an error, so containment checks stay total.

use thiserror::Error;

use arbor_types::{
    DisputeBondTokenRef, MarketRef, PayoutDistributionHash, ReportingWindowRef, ReputationTokenRef,
    ShareTokenRef, StakeTokenRef, Timestamp, UniverseRef,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{factory} factory is not configured")]
    Unavailable { factory: &'static str },
    #[error("{factory} factory refused to create an entity: {reason}")]
    Refused {
        factory: &'static str,
        reason: String,
    },
    #[error("handle space exhausted")]
    HandlesExhausted,
    #[error("unknown {kind} {handle}")]
    UnknownEntity { kind: &'static str, handle: u64 },
}

pub trait ReputationTokenFactory {
    fn create_reputation_token(
        &mut self,
        universe: UniverseRef,
    ) -> Result<ReputationTokenRef, CollaboratorError>;
}

pub trait ReportingWindowFactory {
    fn create_reporting_window(
        &mut self,
        universe: UniverseRef,
        start_time: Timestamp,
    ) -> Result<ReportingWindowRef, CollaboratorError>;
}

pub trait UniverseFactory {
    fn create_universe(
        &mut self,
        parent: UniverseRef,
        parent_payout_distribution_hash: PayoutDistributionHash,
    ) -> Result<UniverseRef, CollaboratorError>;
}

pub trait MarketView {
    fn reporting_window(&self, market: MarketRef) -> Option<ReportingWindowRef>;
    fn market_contains_stake_token(&self, market: MarketRef, token: StakeTokenRef) -> bool;
    fn market_contains_share_token(&self, market: MarketRef, token: ShareTokenRef) -> bool;
    fn market_contains_dispute_bond_token(
        &self,
        market: MarketRef,
        token: DisputeBondTokenRef,
    ) -> bool;
}

pub trait ReportingWindowView {
    fn start_time(&self, window: ReportingWindowRef) -> Option<Timestamp>;
    fn window_contains_market(&self, window: ReportingWindowRef, market: MarketRef) -> bool;
}

pub trait TokenView {
    fn market_of_stake_token(&self, token: StakeTokenRef) -> Option<MarketRef>;
    fn market_of_share_token(&self, token: ShareTokenRef) -> Option<MarketRef>;
    fn market_of_dispute_bond_token(&self, token: DisputeBondTokenRef) -> Option<MarketRef>;
}

/// Lookups into universes other than the one handling the call.
pub trait UniverseView {
    fn parent_payout_distribution_hash(
        &self,
        universe: UniverseRef,
    ) -> Option<PayoutDistributionHash>;
    fn universe_contains_dispute_bond_token(
        &self,
        universe: UniverseRef,
        token: DisputeBondTokenRef,
    ) -> bool;
}
