//! Window index behavior through the ledger.

use arbor_core::ReportingWindowView;
use arbor_types::{ReportingSchedule, ReportingWindowRef, Timestamp};

use crate::common::{Fixture, NOW, known, now};

#[test]
fn window_is_created_once_and_starts_on_period_boundary() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let period = ReportingSchedule::default().reporting_period_secs();

    let first = fixture
        .ledger
        .get_or_create_reporting_window_by_timestamp(genesis, now())
        .expect("window");
    let second = fixture
        .ledger
        .get_or_create_reporting_window_by_timestamp(genesis, Timestamp::from_secs(NOW + 1))
        .expect("window");

    assert_eq!(first, second);
    let world = fixture.ledger.world();
    let start = world.start_time(first).expect("known window");
    assert_eq!(start.as_secs(), (NOW / period) * period);

    let universe = fixture.ledger.universe(genesis).expect("genesis");
    assert_eq!(
        universe.reporting_window(universe.reporting_window_id(now())),
        Some(first)
    );
}

#[test]
fn market_end_time_window_matches_offset_timestamp() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let schedule = ReportingSchedule::default();
    let end = Timestamp::from_secs(NOW + 1);

    let by_end = fixture
        .ledger
        .get_or_create_reporting_window_by_market_end_time(genesis, end)
        .expect("window");
    let offset = schedule.market_end_offset_secs().expect("no overflow");
    let by_timestamp = fixture
        .ledger
        .get_or_create_reporting_window_by_timestamp(
            genesis,
            end.checked_add(offset).expect("no overflow"),
        )
        .expect("window");

    assert_eq!(by_end, by_timestamp);
}

#[test]
fn neighbouring_windows_are_one_period_apart() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let period = ReportingSchedule::default().reporting_period_secs();

    let previous = fixture
        .ledger
        .get_or_create_previous_reporting_window(genesis, now())
        .expect("window");
    let current = fixture
        .ledger
        .get_or_create_current_reporting_window(genesis, now())
        .expect("window");
    let next = fixture
        .ledger
        .get_or_create_next_reporting_window(genesis, now())
        .expect("window");

    let world = fixture.ledger.world();
    let start = |window: ReportingWindowRef| world.start_time(window).expect("known").as_secs();
    assert_eq!(start(current) - start(previous), period);
    assert_eq!(start(next) - start(current), period);
}

#[test]
fn universes_do_not_share_windows() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let child = fixture.child(genesis, "101");

    let genesis_window = fixture
        .ledger
        .get_or_create_current_reporting_window(genesis, now())
        .expect("window");
    let child_window = fixture
        .ledger
        .get_or_create_current_reporting_window(child, now())
        .expect("window");

    assert_ne!(genesis_window, child_window);
    let ledger = &fixture.ledger;
    assert!(known(ledger.is_container_for_reporting_window(genesis, genesis_window)));
    assert!(!known(ledger.is_container_for_reporting_window(genesis, child_window)));
    assert!(known(ledger.is_container_for_reporting_window(child, child_window)));
}
