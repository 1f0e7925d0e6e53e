//! Fork coordinator through the ledger.

use arbor_core::{ErrorKind, LedgerError, UniverseError};
use arbor_types::{Caller, ReportingSchedule, Timestamp};

use crate::common::{Fixture, NOW, now};

#[test]
fn fork_from_non_market_is_forbidden() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;

    let err = fixture
        .ledger
        .fork(genesis, Caller::External, now())
        .unwrap_err();

    assert_eq!(
        err,
        LedgerError::Universe(UniverseError::Forbidden("must be called from market"))
    );
    let universe = fixture.ledger.universe(genesis).expect("genesis");
    assert!(!universe.is_forking());
}

#[test]
fn fork_from_market_of_another_universe_is_not_contained() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let child = fixture.child(genesis, "101");
    let foreign_market = fixture.market(child);

    let err = fixture
        .ledger
        .fork(genesis, Caller::Market(foreign_market), now())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotContained);
    assert_eq!(
        err.to_string(),
        "not contained: forking market has to be in universe"
    );
}

#[test]
fn fork_records_market_and_end_time() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);
    let fork_duration = ReportingSchedule::default().fork_duration_secs();

    let end = fixture
        .ledger
        .fork(genesis, Caller::Market(market), now())
        .expect("fork");

    assert_eq!(end, Timestamp::from_secs(NOW + fork_duration));
    let universe = fixture.ledger.universe(genesis).expect("genesis");
    assert_eq!(universe.forking_market(), Some(market));
    assert_eq!(universe.fork_end_time(), end);

    let window = fixture
        .ledger
        .get_or_create_reporting_window_for_fork_end_time(genesis)
        .expect("fork window");
    let same = fixture
        .ledger
        .get_or_create_reporting_window_by_timestamp(genesis, end)
        .expect("window");
    assert_eq!(window, same);
}

#[test]
fn second_fork_is_rejected_for_any_caller() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let first = fixture.market(genesis);
    let second = fixture.market(genesis);
    let end = fixture
        .ledger
        .fork(genesis, Caller::Market(first), now())
        .expect("fork");

    for caller in [Caller::Market(first), Caller::Market(second), Caller::External] {
        let err = fixture
            .ledger
            .fork(genesis, caller, Timestamp::from_secs(NOW + 100))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyForking);
    }

    let universe = fixture.ledger.universe(genesis).expect("genesis");
    assert_eq!(universe.forking_market(), Some(first));
    assert_eq!(universe.fork_end_time(), end);
}

#[test]
fn fork_window_requires_a_fork() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;

    let err = fixture
        .ledger
        .get_or_create_reporting_window_for_fork_end_time(genesis)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotForking);
}

#[test]
fn forked_universe_still_spawns_children() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let market = fixture.market(genesis);
    fixture
        .ledger
        .fork(genesis, Caller::Market(market), now())
        .expect("fork");

    let child = fixture.child(genesis, "101");
    let stored = fixture.ledger.universe(child).expect("child");
    assert!(!stored.is_forking());
    assert_eq!(stored.parent_universe(), Some(genesis));
}
