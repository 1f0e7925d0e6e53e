//! Reporting window index: window id → lazily created window handle.
//!
//! Window ids are derived purely from a timestamp and the reporting period.
//! The first lookup for an id asks the window factory for a window starting at
//! `id * period` and memoizes it; every later lookup for the same id returns
//! that handle. Entries are never replaced or removed.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use arbor_types::{ReportingWindowRef, Timestamp, WindowId};

use super::Universe;
use crate::collaborators::ReportingWindowFactory;
use crate::errors::UniverseError;

#[derive(Debug, Clone, Default)]
pub(super) struct ReportingWindowIndex {
    by_id: BTreeMap<WindowId, ReportingWindowRef>,
}

impl ReportingWindowIndex {
    pub(super) fn get(&self, id: WindowId) -> Option<ReportingWindowRef> {
        self.by_id.get(&id).copied()
    }

    /// Insert-if-absent. `create` runs only for a vacant id, and a failed
    /// `create` leaves the index untouched.
    pub(super) fn get_or_try_insert_with<E>(
        &mut self,
        id: WindowId,
        create: impl FnOnce() -> Result<ReportingWindowRef, E>,
    ) -> Result<ReportingWindowRef, E> {
        match self.by_id.entry(id) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => Ok(*entry.insert(create()?)),
        }
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (WindowId, ReportingWindowRef)> + '_ {
        self.by_id.iter().map(|(id, window)| (*id, *window))
    }
}

impl Universe {
    /// `REPORTING_DURATION + REPORTING_DISPUTE_DURATION`.
    #[must_use]
    pub const fn reporting_period_duration_in_seconds(&self) -> u64 {
        self.config.schedule.reporting_period_secs()
    }

    #[must_use]
    pub const fn reporting_window_id(&self, timestamp: Timestamp) -> WindowId {
        self.config.schedule.window_id_of(timestamp)
    }

    /// Pure lookup; never creates a window.
    #[must_use]
    pub fn reporting_window(&self, id: WindowId) -> Option<ReportingWindowRef> {
        self.windows.get(id)
    }

    pub fn reporting_windows(&self) -> impl Iterator<Item = (WindowId, ReportingWindowRef)> + '_ {
        self.windows.iter()
    }

    pub fn get_or_create_reporting_window_by_timestamp(
        &mut self,
        timestamp: Timestamp,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        let id = self.reporting_window_id(timestamp);
        let start_time = self
            .config
            .schedule
            .window_start(id)
            .ok_or(UniverseError::TimestampOverflow)?;
        let universe = self.address;
        self.windows
            .get_or_try_insert_with(id, || -> Result<_, UniverseError> {
                let window = factory.create_reporting_window(universe, start_time)?;
                tracing::debug!(
                    universe = %universe,
                    window_id = %id,
                    start_time = %start_time,
                    window = %window,
                    "Reporting window created"
                );
                Ok(window)
            })
    }

    /// The first regular reporting window that starts after the designated
    /// reporting phase following `end_time`.
    pub fn get_or_create_reporting_window_by_market_end_time(
        &mut self,
        end_time: Timestamp,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        let target = self
            .config
            .schedule
            .market_end_offset_secs()
            .and_then(|offset| end_time.checked_add(offset))
            .ok_or(UniverseError::TimestampOverflow)?;
        self.get_or_create_reporting_window_by_timestamp(target, factory)
    }

    /// Saturates at window 0 when `now` is inside the first period.
    pub fn get_or_create_previous_reporting_window(
        &mut self,
        now: Timestamp,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        let previous = now.saturating_sub(self.reporting_period_duration_in_seconds());
        self.get_or_create_reporting_window_by_timestamp(previous, factory)
    }

    pub fn get_or_create_current_reporting_window(
        &mut self,
        now: Timestamp,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        self.get_or_create_reporting_window_by_timestamp(now, factory)
    }

    pub fn get_or_create_next_reporting_window(
        &mut self,
        now: Timestamp,
        factory: &mut impl ReportingWindowFactory,
    ) -> Result<ReportingWindowRef, UniverseError> {
        let next = now
            .checked_add(self.reporting_period_duration_in_seconds())
            .ok_or(UniverseError::TimestampOverflow)?;
        self.get_or_create_reporting_window_by_timestamp(next, factory)
    }
}
