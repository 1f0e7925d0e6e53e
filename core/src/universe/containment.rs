//! Containment oracle.
//!
//! Each predicate delegates one level down the chain
//! token ⊂ market ⊂ reporting window ⊂ universe and never creates state.
//! These checks are the only way a caller proves it belongs to a universe.

use arbor_types::{
    DisputeBondTokenRef, MarketRef, ReportingWindowRef, ShareTokenRef, StakeTokenRef,
};

use super::Universe;
use crate::collaborators::{MarketView, ReportingWindowView, TokenView};

impl Universe {
    /// True iff this universe indexed `window` under the id of its start time.
    #[must_use]
    pub fn is_container_for_reporting_window(
        &self,
        window: ReportingWindowRef,
        view: &impl ReportingWindowView,
    ) -> bool {
        let Some(start_time) = view.start_time(window) else {
            return false;
        };
        self.windows.get(self.reporting_window_id(start_time)) == Some(window)
    }

    #[must_use]
    pub fn is_container_for_market(
        &self,
        market: MarketRef,
        view: &(impl MarketView + ReportingWindowView),
    ) -> bool {
        let Some(window) = view.reporting_window(market) else {
            return false;
        };
        self.is_container_for_reporting_window(window, view)
            && view.window_contains_market(window, market)
    }

    #[must_use]
    pub fn is_container_for_stake_token(
        &self,
        token: StakeTokenRef,
        view: &(impl MarketView + ReportingWindowView + TokenView),
    ) -> bool {
        let Some(market) = view.market_of_stake_token(token) else {
            return false;
        };
        self.is_container_for_market(market, view)
            && view.market_contains_stake_token(market, token)
    }

    #[must_use]
    pub fn is_container_for_share_token(
        &self,
        token: ShareTokenRef,
        view: &(impl MarketView + ReportingWindowView + TokenView),
    ) -> bool {
        let Some(market) = view.market_of_share_token(token) else {
            return false;
        };
        self.is_container_for_market(market, view)
            && view.market_contains_share_token(market, token)
    }

    #[must_use]
    pub fn is_container_for_dispute_bond_token(
        &self,
        token: DisputeBondTokenRef,
        view: &(impl MarketView + ReportingWindowView + TokenView),
    ) -> bool {
        let Some(market) = view.market_of_dispute_bond_token(token) else {
            return false;
        };
        self.is_container_for_market(market, view)
            && view.market_contains_dispute_bond_token(market, token)
    }
}
