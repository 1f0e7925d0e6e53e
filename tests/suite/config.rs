//! Config files drive the schedule and policy of a ledger.

use std::fs;

use arbor_config::{ArborConfig, ConfigError};
use arbor_core::{ErrorKind, Ledger};
use arbor_types::{Caller, OpenInterestPolicy, Timestamp};

const SHORT_SCHEDULE: &str = r#"
[schedule]
reporting_duration_secs = 90
reporting_dispute_duration_secs = 10
designated_reporting_duration_secs = 5
designated_reporting_dispute_duration_secs = 5
fork_duration_secs = 1000

[policy]
open_interest = "contained_market"
"#;

#[test]
fn file_schedule_drives_window_ids_and_fork_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, SHORT_SCHEDULE).expect("write config");

    let config = ArborConfig::load_from(&path)
        .expect("load")
        .universe_config()
        .expect("valid");
    assert_eq!(config.schedule.reporting_period_secs(), 100);
    assert_eq!(
        config.open_interest_policy,
        OpenInterestPolicy::ContainedMarket
    );

    let mut ledger = Ledger::new(config);
    let genesis = ledger.create_genesis_universe().expect("genesis");
    let universe = ledger.universe(genesis).expect("genesis");
    let id = universe.reporting_window_id(Timestamp::from_secs(250));
    assert_eq!(id.value(), 2);

    let market = ledger
        .create_market(genesis, Timestamp::from_secs(250))
        .expect("market");
    let world = ledger.world();
    let window = world.market(market).expect("known").reporting_window;
    let start = world
        .reporting_window_record(window)
        .expect("known")
        .start_time;
    // 250 + 5 + 5 + 1 + 100 = 361, so the window starting at 300.
    assert_eq!(start, Timestamp::from_secs(300));

    let end = ledger
        .fork(genesis, Caller::Market(market), Timestamp::from_secs(400))
        .expect("fork");
    assert_eq!(end, Timestamp::from_secs(1_400));

    let err = ledger
        .increment_open_interest(genesis, Caller::External, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotContained);
}

#[test]
fn invalid_schedule_reports_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[schedule]\nfork_duration_secs = 0\n").expect("write config");

    let err = ArborConfig::load_from(&path)
        .expect("load")
        .universe_config()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Schedule { .. }));
    assert_eq!(err.path(), path.as_path());
}
