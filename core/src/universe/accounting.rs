//! Bond and open-interest accounting.
//!
//! Three independent counters, each moved only by the collaborator role that
//! owns it. Authorization and the arithmetic check both run before the
//! counter is written, so a rejected call never leaves a partial update.

use arbor_types::{Caller, OpenInterestPolicy};

use super::Universe;
use crate::collaborators::{MarketView, ReportingWindowView, TokenView, UniverseView};
use crate::errors::{Counter, UniverseError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BondAccounts {
    rep_available_for_extra_bond_payouts: u128,
    extra_dispute_bond_remaining_to_be_paid_out: u128,
    open_interest_in_atto_eth: u128,
}

impl BondAccounts {
    #[must_use]
    pub const fn balance(&self, counter: Counter) -> u128 {
        match counter {
            Counter::RepAvailableForExtraBondPayouts => self.rep_available_for_extra_bond_payouts,
            Counter::ExtraDisputeBondRemainingToBePaidOut => {
                self.extra_dispute_bond_remaining_to_be_paid_out
            }
            Counter::OpenInterest => self.open_interest_in_atto_eth,
        }
    }

    fn slot(&mut self, counter: Counter) -> &mut u128 {
        match counter {
            Counter::RepAvailableForExtraBondPayouts => {
                &mut self.rep_available_for_extra_bond_payouts
            }
            Counter::ExtraDisputeBondRemainingToBePaidOut => {
                &mut self.extra_dispute_bond_remaining_to_be_paid_out
            }
            Counter::OpenInterest => &mut self.open_interest_in_atto_eth,
        }
    }

    fn credit(&mut self, counter: Counter, amount: u128) -> Result<u128, UniverseError> {
        let slot = self.slot(counter);
        let balance = *slot;
        *slot = balance
            .checked_add(amount)
            .ok_or(UniverseError::CounterOverflow {
                counter,
                balance,
                amount,
            })?;
        Ok(*slot)
    }

    fn debit(&mut self, counter: Counter, amount: u128) -> Result<u128, UniverseError> {
        let slot = self.slot(counter);
        let balance = *slot;
        *slot = balance
            .checked_sub(amount)
            .ok_or(UniverseError::CounterUnderflow {
                counter,
                balance,
                amount,
            })?;
        Ok(*slot)
    }
}

impl Universe {
    #[must_use]
    pub const fn rep_available_for_extra_bond_payouts(&self) -> u128 {
        self.accounts
            .balance(Counter::RepAvailableForExtraBondPayouts)
    }

    #[must_use]
    pub const fn extra_dispute_bond_remaining_to_be_paid_out(&self) -> u128 {
        self.accounts
            .balance(Counter::ExtraDisputeBondRemainingToBePaidOut)
    }

    #[must_use]
    pub const fn open_interest_in_atto_eth(&self) -> u128 {
        self.accounts.balance(Counter::OpenInterest)
    }

    /// Only this universe's own reputation token may add extra bond collateral.
    pub fn increase_rep_available_for_extra_bond_payouts(
        &mut self,
        caller: Caller,
        amount: u128,
    ) -> Result<u128, UniverseError> {
        let is_own_token = caller
            .reputation_token()
            .is_some_and(|token| self.reputation_token() == Some(token));
        if !is_own_token {
            return Err(UniverseError::Forbidden("needs to be called from reputation token"));
        }
        self.apply_credit(Counter::RepAvailableForExtraBondPayouts, amount)
    }

    /// Paid out to a dispute bond of the universe this one forked from.
    pub fn decrease_rep_available_for_extra_bond_payouts(
        &mut self,
        caller: Caller,
        amount: u128,
        view: &impl UniverseView,
    ) -> Result<u128, UniverseError> {
        let in_parent = match (caller.dispute_bond_token(), self.parent_universe()) {
            (Some(token), Some(parent)) => view.universe_contains_dispute_bond_token(parent, token),
            _ => false,
        };
        if !in_parent {
            return Err(UniverseError::NotContained("dispute bond needs to be in parent universe"));
        }
        self.apply_debit(Counter::RepAvailableForExtraBondPayouts, amount)
    }

    pub fn increase_extra_dispute_bond_remaining_to_be_paid_out(
        &mut self,
        caller: Caller,
        amount: u128,
        view: &(impl MarketView + ReportingWindowView),
    ) -> Result<u128, UniverseError> {
        if !self.caller_is_contained_market(caller, view) {
            return Err(UniverseError::NotContained("market needs to be contained in universe"));
        }
        self.apply_credit(Counter::ExtraDisputeBondRemainingToBePaidOut, amount)
    }

    pub fn decrease_extra_dispute_bond_remaining_to_be_paid_out(
        &mut self,
        caller: Caller,
        amount: u128,
        view: &(impl MarketView + ReportingWindowView + TokenView),
    ) -> Result<u128, UniverseError> {
        let contained = caller
            .dispute_bond_token()
            .is_some_and(|token| self.is_container_for_dispute_bond_token(token, view));
        if !contained {
            return Err(UniverseError::NotContained(
                "dispute bond needs to be contained in universe",
            ));
        }
        self.apply_debit(Counter::ExtraDisputeBondRemainingToBePaidOut, amount)
    }

    pub fn increment_open_interest(
        &mut self,
        caller: Caller,
        amount: u128,
        view: &(impl MarketView + ReportingWindowView),
    ) -> Result<u128, UniverseError> {
        self.authorize_open_interest(caller, view)?;
        self.apply_credit(Counter::OpenInterest, amount)
    }

    pub fn decrement_open_interest(
        &mut self,
        caller: Caller,
        amount: u128,
        view: &(impl MarketView + ReportingWindowView),
    ) -> Result<u128, UniverseError> {
        self.authorize_open_interest(caller, view)?;
        self.apply_debit(Counter::OpenInterest, amount)
    }

    fn authorize_open_interest(
        &self,
        caller: Caller,
        view: &(impl MarketView + ReportingWindowView),
    ) -> Result<(), UniverseError> {
        match self.config.open_interest_policy {
            OpenInterestPolicy::Unrestricted => Ok(()),
            OpenInterestPolicy::ContainedMarket => {
                if self.caller_is_contained_market(caller, view) {
                    Ok(())
                } else {
                    Err(UniverseError::NotContained("market needs to be contained in universe"))
                }
            }
        }
    }

    fn caller_is_contained_market(
        &self,
        caller: Caller,
        view: &(impl MarketView + ReportingWindowView),
    ) -> bool {
        caller
            .market()
            .is_some_and(|market| self.is_container_for_market(market, view))
    }

    fn apply_credit(&mut self, counter: Counter, amount: u128) -> Result<u128, UniverseError> {
        let balance = self.accounts.credit(counter, amount)?;
        tracing::debug!(universe = %self.address, %counter, amount, balance, "Counter increased");
        Ok(balance)
    }

    fn apply_debit(&mut self, counter: Counter, amount: u128) -> Result<u128, UniverseError> {
        let balance = self.accounts.debit(counter, amount)?;
        tracing::debug!(universe = %self.address, %counter, amount, balance, "Counter decreased");
        Ok(balance)
    }
}
