//! Rejected calls leave every universe and collaborator exactly as before.

use arbor_core::{ErrorKind, LedgerError};
use arbor_types::{Caller, Timestamp, UniverseRef};

use crate::common::{Fixture, label, now};

#[test]
fn rejected_calls_do_not_change_snapshots() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);
    let child = fixture.child(genesis, "101");
    let before = fixture.ledger.snapshots();

    let rejected = [
        fixture
            .ledger
            .fork(genesis, Caller::External, now())
            .map(|_| ()),
        fixture
            .ledger
            .fork(child, Caller::Market(market), now())
            .map(|_| ()),
        fixture
            .ledger
            .decrement_open_interest(genesis, Caller::External, 1)
            .map(|_| ()),
        fixture
            .ledger
            .increase_rep_available_for_extra_bond_payouts(child, Caller::External, 1)
            .map(|_| ()),
        fixture
            .ledger
            .get_or_create_reporting_window_for_fork_end_time(genesis)
            .map(|_| ()),
    ];

    assert!(rejected.iter().all(Result::is_err));
    assert_eq!(fixture.ledger.snapshots(), before);
}

#[test]
fn overflowing_market_end_time_creates_nothing() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let before = fixture.ledger.snapshot(genesis).expect("snapshot");

    let err = fixture
        .ledger
        .create_market(genesis, Timestamp::from_secs(u64::MAX))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Arithmetic);
    assert_eq!(fixture.ledger.snapshot(genesis).expect("snapshot"), before);
    assert_eq!(fixture.ledger.world().markets().count(), 0);
}

#[test]
fn handles_are_not_consumed_by_rejected_calls() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let first = fixture.market(genesis);

    let _ = fixture.ledger.fork(genesis, Caller::External, now());
    let stray = UniverseRef::try_new(9_999).expect("non-zero");
    let _ = fixture
        .ledger
        .get_or_create_child_universe(stray, label("1"));

    let second = fixture.market(genesis);
    assert_eq!(second.value(), first.value() + 1);
}

#[test]
fn unknown_universe_leaves_ledger_untouched() {
    let mut fixture = Fixture::new();
    let stray = UniverseRef::try_new(9_999).expect("non-zero");
    let before = fixture.ledger.snapshots();

    let err = fixture.ledger.create_market(stray, now()).unwrap_err();

    assert_eq!(err, LedgerError::UnknownUniverse(stray));
    assert_eq!(fixture.ledger.snapshots(), before);
}
