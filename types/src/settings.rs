//! Resolved configuration types shared across crates.
//!
//! Raw TOML deserialization structs (with `Option` fields) live in
//! `arbor-config`. The config loader resolves them into these types at the
//! parse boundary, so holding a [`ReportingSchedule`] means its durations are
//! usable as divisors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{Timestamp, WindowId};

const DAY_SECS: u64 = 24 * 60 * 60;

pub const DEFAULT_REPORTING_DURATION_SECS: u64 = 27 * DAY_SECS;
pub const DEFAULT_REPORTING_DISPUTE_DURATION_SECS: u64 = 3 * DAY_SECS;
pub const DEFAULT_DESIGNATED_REPORTING_DURATION_SECS: u64 = 3 * DAY_SECS;
pub const DEFAULT_DESIGNATED_REPORTING_DISPUTE_DURATION_SECS: u64 = 3 * DAY_SECS;
pub const DEFAULT_FORK_DURATION_SECS: u64 = 60 * DAY_SECS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("reporting period (reporting + reporting dispute duration) must be non-zero")]
    EmptyReportingPeriod,
    #[error("reporting period of {reporting} + {dispute} seconds overflows")]
    ReportingPeriodOverflow { reporting: u64, dispute: u64 },
    #[error("fork duration must be non-zero")]
    EmptyForkDuration,
}

/// The five duration constants that drive window mapping and forking.
///
/// Invariant: `reporting_period_secs()` is non-zero and does not overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingSchedule {
    reporting_duration_secs: u64,
    reporting_dispute_duration_secs: u64,
    designated_reporting_duration_secs: u64,
    designated_reporting_dispute_duration_secs: u64,
    fork_duration_secs: u64,
}

impl ReportingSchedule {
    pub fn new(
        reporting_duration_secs: u64,
        reporting_dispute_duration_secs: u64,
        designated_reporting_duration_secs: u64,
        designated_reporting_dispute_duration_secs: u64,
        fork_duration_secs: u64,
    ) -> Result<Self, ScheduleError> {
        let period = reporting_duration_secs
            .checked_add(reporting_dispute_duration_secs)
            .ok_or(ScheduleError::ReportingPeriodOverflow {
                reporting: reporting_duration_secs,
                dispute: reporting_dispute_duration_secs,
            })?;
        if period == 0 {
            return Err(ScheduleError::EmptyReportingPeriod);
        }
        if fork_duration_secs == 0 {
            return Err(ScheduleError::EmptyForkDuration);
        }
        Ok(Self {
            reporting_duration_secs,
            reporting_dispute_duration_secs,
            designated_reporting_duration_secs,
            designated_reporting_dispute_duration_secs,
            fork_duration_secs,
        })
    }

    #[must_use]
    pub const fn reporting_duration_secs(&self) -> u64 {
        self.reporting_duration_secs
    }

    #[must_use]
    pub const fn reporting_dispute_duration_secs(&self) -> u64 {
        self.reporting_dispute_duration_secs
    }

    #[must_use]
    pub const fn designated_reporting_duration_secs(&self) -> u64 {
        self.designated_reporting_duration_secs
    }

    #[must_use]
    pub const fn designated_reporting_dispute_duration_secs(&self) -> u64 {
        self.designated_reporting_dispute_duration_secs
    }

    #[must_use]
    pub const fn fork_duration_secs(&self) -> u64 {
        self.fork_duration_secs
    }

    /// Length of one reporting window: reporting plus reporting dispute.
    #[must_use]
    pub const fn reporting_period_secs(&self) -> u64 {
        self.reporting_duration_secs + self.reporting_dispute_duration_secs
    }

    #[must_use]
    pub const fn window_id_of(&self, timestamp: Timestamp) -> WindowId {
        WindowId::new(timestamp.as_secs() / self.reporting_period_secs())
    }

    /// Start of the window with the given id, or `None` past the end of time.
    #[must_use]
    pub const fn window_start(&self, id: WindowId) -> Option<Timestamp> {
        match id.value().checked_mul(self.reporting_period_secs()) {
            Some(secs) => Some(Timestamp::from_secs(secs)),
            None => None,
        }
    }

    /// Offset from a market's end time to a timestamp inside its first regular
    /// reporting window.
    #[must_use]
    pub const fn market_end_offset_secs(&self) -> Option<u64> {
        let designated = self.designated_reporting_duration_secs;
        match designated.checked_add(self.designated_reporting_dispute_duration_secs) {
            Some(phase) => match phase.checked_add(1) {
                Some(after) => after.checked_add(self.reporting_period_secs()),
                None => None,
            },
            None => None,
        }
    }
}

impl Default for ReportingSchedule {
    fn default() -> Self {
        Self {
            reporting_duration_secs: DEFAULT_REPORTING_DURATION_SECS,
            reporting_dispute_duration_secs: DEFAULT_REPORTING_DISPUTE_DURATION_SECS,
            designated_reporting_duration_secs: DEFAULT_DESIGNATED_REPORTING_DURATION_SECS,
            designated_reporting_dispute_duration_secs:
                DEFAULT_DESIGNATED_REPORTING_DISPUTE_DURATION_SECS,
            fork_duration_secs: DEFAULT_FORK_DURATION_SECS,
        }
    }
}

/// Who may move a universe's open-interest counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenInterestPolicy {
    /// Any caller may adjust open interest.
    #[default]
    Unrestricted,
    /// Only a market the universe contains may adjust open interest.
    ContainedMarket,
}

impl OpenInterestPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::ContainedMarket => "contained_market",
        }
    }
}

/// Per-universe settings, copied into every universe a ledger creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UniverseConfig {
    pub schedule: ReportingSchedule,
    pub open_interest_policy: OpenInterestPolicy,
}
