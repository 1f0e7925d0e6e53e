//! Bond and open-interest accounting gates through the ledger.

use arbor_core::{ErrorKind, LedgerError, Universe, UniverseError};
use arbor_types::{Caller, OpenInterestPolicy, UniverseConfig, UniverseRef};

use crate::common::Fixture;

fn own_token(fixture: &Fixture, universe: UniverseRef) -> Caller {
    let token = fixture
        .ledger
        .universe(universe)
        .and_then(Universe::reputation_token)
        .expect("initialized universe");
    Caller::ReputationToken(token)
}

#[test]
fn only_own_reputation_token_funds_extra_bonds() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let child = fixture.child(genesis, "101");
    let genesis_token = own_token(&fixture, genesis);
    let child_token = own_token(&fixture, child);

    for caller in [Caller::External, child_token] {
        let err = fixture
            .ledger
            .increase_rep_available_for_extra_bond_payouts(genesis, caller, 10)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            err.to_string(),
            "forbidden: needs to be called from reputation token"
        );
    }

    let balance = fixture
        .ledger
        .increase_rep_available_for_extra_bond_payouts(genesis, genesis_token, 10)
        .expect("increase");
    assert_eq!(balance, 10);
}

#[test]
fn extra_bond_payouts_go_to_parent_universe_bonds() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let parent_market = fixture.market(genesis);
    let parent_bond = fixture
        .ledger
        .create_dispute_bond_token(parent_market)
        .expect("bond");
    let child = fixture.child(genesis, "101");
    let child_market = fixture.market(child);
    let child_bond = fixture
        .ledger
        .create_dispute_bond_token(child_market)
        .expect("bond");
    let child_token = own_token(&fixture, child);
    fixture
        .ledger
        .increase_rep_available_for_extra_bond_payouts(child, child_token, 100)
        .expect("increase");

    let err = fixture
        .ledger
        .decrease_rep_available_for_extra_bond_payouts(
            child,
            Caller::DisputeBondToken(child_bond),
            40,
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "not contained: dispute bond needs to be in parent universe"
    );

    let balance = fixture
        .ledger
        .decrease_rep_available_for_extra_bond_payouts(
            child,
            Caller::DisputeBondToken(parent_bond),
            40,
        )
        .expect("decrease");
    assert_eq!(balance, 60);
}

#[test]
fn genesis_has_no_parent_to_pay_bonds_from() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);
    let bond = fixture
        .ledger
        .create_dispute_bond_token(market)
        .expect("bond");

    let err = fixture
        .ledger
        .decrease_rep_available_for_extra_bond_payouts(genesis, Caller::DisputeBondToken(bond), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotContained);
}

#[test]
fn extra_dispute_bond_moves_with_contained_market_and_bond() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);
    let bond = fixture
        .ledger
        .create_dispute_bond_token(market)
        .expect("bond");
    let child = fixture.child(genesis, "101");
    let foreign_market = fixture.market(child);
    let foreign_bond = fixture
        .ledger
        .create_dispute_bond_token(foreign_market)
        .expect("bond");

    let err = fixture
        .ledger
        .increase_extra_dispute_bond_remaining_to_be_paid_out(
            genesis,
            Caller::Market(foreign_market),
            5,
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "not contained: market needs to be contained in universe"
    );

    fixture
        .ledger
        .increase_extra_dispute_bond_remaining_to_be_paid_out(genesis, Caller::Market(market), 5)
        .expect("increase");

    let err = fixture
        .ledger
        .decrease_extra_dispute_bond_remaining_to_be_paid_out(
            genesis,
            Caller::DisputeBondToken(foreign_bond),
            5,
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "not contained: dispute bond needs to be contained in universe"
    );

    let err = fixture
        .ledger
        .decrease_extra_dispute_bond_remaining_to_be_paid_out(
            genesis,
            Caller::DisputeBondToken(bond),
            6,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arithmetic);

    let balance = fixture
        .ledger
        .decrease_extra_dispute_bond_remaining_to_be_paid_out(
            genesis,
            Caller::DisputeBondToken(bond),
            5,
        )
        .expect("decrease");
    assert_eq!(balance, 0);
}

#[test]
fn open_interest_is_unrestricted_by_default() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;

    fixture
        .ledger
        .increment_open_interest(genesis, Caller::External, 1_000)
        .expect("increment");
    let balance = fixture
        .ledger
        .decrement_open_interest(genesis, Caller::External, 400)
        .expect("decrement");
    assert_eq!(balance, 600);

    let err = fixture
        .ledger
        .decrement_open_interest(genesis, Caller::External, 601)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Universe(UniverseError::CounterUnderflow {
            balance: 600,
            amount: 601,
            ..
        })
    ));
}

#[test]
fn contained_market_policy_rejects_strangers() {
    let mut fixture = Fixture::with_config(UniverseConfig {
        open_interest_policy: OpenInterestPolicy::ContainedMarket,
        ..UniverseConfig::default()
    });
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);

    let err = fixture
        .ledger
        .increment_open_interest(genesis, Caller::External, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotContained);

    let balance = fixture
        .ledger
        .increment_open_interest(genesis, Caller::Market(market), 1)
        .expect("increment");
    assert_eq!(balance, 1);
}

#[test]
fn counters_are_independent_across_universes() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let child = fixture.child(genesis, "101");

    fixture
        .ledger
        .increment_open_interest(child, Caller::External, 50)
        .expect("increment");

    let ledger = &fixture.ledger;
    let genesis = ledger.universe(genesis).expect("genesis");
    let child = ledger.universe(child).expect("child");
    assert_eq!(genesis.open_interest_in_atto_eth(), 0);
    assert_eq!(child.open_interest_in_atto_eth(), 50);
}
