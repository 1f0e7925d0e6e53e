//! Fork coordinator: the one-way unforked → forking transition.

use serde::Serialize;

use arbor_types::{Caller, MarketRef, ReportingWindowRef, Timestamp};

use super::Universe;
use crate::collaborators::{MarketView, ReportingWindowFactory, ReportingWindowView};
use crate::errors::UniverseError;

/// Forking is terminal for a universe. Its future continues in the child
/// universes, which are separate entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ForkState {
    #[default]
    Unforked,
    Forking {
        market: MarketRef,
        end_time: Timestamp,
    },
}

impl Universe {
    /// Start forking this universe on behalf of `caller`.
    ///
    /// The caller must be a market this universe contains, and no other
    /// market may have forked it before. Returns the fork end time.
    pub fn fork(
        &mut self,
        caller: Caller,
        now: Timestamp,
        view: &(impl MarketView + ReportingWindowView),
    ) -> Result<Timestamp, UniverseError> {
        if self.is_forking() {
            return Err(UniverseError::AlreadyForking);
        }
        let Some(market) = caller.market() else {
            return Err(UniverseError::Forbidden("must be called from market"));
        };
        if !self.is_container_for_market(market, view) {
            return Err(UniverseError::NotContained("forking market has to be in universe"));
        }
        let end_time = now
            .checked_add(self.config.schedule.fork_duration_secs())
            .ok_or(UniverseError::TimestampOverflow)?;

        self.fork = ForkState::Forking { market, end_time };
        tracing::info!(
            universe = %self.address,
            market = %market,
            fork_end_time = %end_time,
            "Universe forking"
        );
        Ok(end_time)
    }

    #[must_use]
    pub const fn fork_state(&self) -> ForkState {
        self.fork
    }

    #[must_use]
    pub const fn is_forking(&self) -> bool {
        matches!(self.fork, ForkState::Forking { .. })
    }

    #[must_use]
    pub const fn forking_market(&self) -> Option<MarketRef> {
        match self.fork {
            ForkState::Forking { market, .. } => Some(market),
            ForkState::Unforked => None,
        }
    }

    /// [`Timestamp::ZERO`] until a fork starts.
    #[must_use]
    pub const fn fork_end_time(&self) -> Timestamp {
        match self.fork {
            ForkState::Forking { end_time, .. } => end_time,
            ForkState::Unforked => Timestamp::ZERO,
        }
    }

    pub fn get_or_create_reporting_window_for_fork_end_time(
        &mut self,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        let ForkState::Forking { end_time, .. } = self.fork else {
            return Err(UniverseError::NotForking);
        };
        self.get_or_create_reporting_window_by_timestamp(end_time, factory)
    }
}
