//! Registry and initialization through the ledger.

use arbor_core::UNIVERSE_TYPE_NAME;
use arbor_types::{PayoutDistributionHash, Timestamp};

use crate::common::{Fixture, known, label};

#[test]
fn genesis_universe_starts_empty() {
    let fixture = Fixture::new();
    let genesis = fixture.ledger.universe(fixture.genesis).expect("genesis");

    assert!(genesis.reputation_token().is_some());
    assert_eq!(genesis.parent_universe(), None);
    assert_eq!(
        genesis.parent_payout_distribution_hash(),
        PayoutDistributionHash::ZERO
    );
    assert_eq!(genesis.type_name(), UNIVERSE_TYPE_NAME);
    assert_eq!(genesis.forking_market(), None);
    assert_eq!(genesis.fork_end_time(), Timestamp::ZERO);
    assert_eq!(genesis.child_universe(label("5")), None);
    assert_eq!(genesis.rep_available_for_extra_bond_payouts(), 0);
    assert_eq!(genesis.extra_dispute_bond_remaining_to_be_paid_out(), 0);
    assert_eq!(genesis.open_interest_in_atto_eth(), 0);
}

#[test]
fn child_universe_is_registered_once_per_payout() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;

    let child = fixture.child(genesis, "101");
    let again = fixture.child(genesis, "101");
    let sibling = fixture.child(genesis, "102");

    assert_eq!(child, again);
    assert_ne!(child, sibling);
    assert_eq!(fixture.ledger.universes().count(), 3);

    let parent = fixture.ledger.universe(genesis).expect("genesis");
    assert_eq!(parent.child_universe(label("101")), Some(child));
    assert_eq!(parent.child_universe(label("102")), Some(sibling));

    let stored = fixture.ledger.universe(child).expect("child");
    assert_eq!(stored.parent_universe(), Some(genesis));
    assert_eq!(stored.parent_payout_distribution_hash(), label("101"));
    assert_ne!(stored.reputation_token(), parent.reputation_token());
}

#[test]
fn parentage_is_not_transitive() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let child = fixture.child(genesis, "101");
    let grandchild = fixture.child(child, "7");

    assert!(known(fixture.ledger.is_parent_of(genesis, child)));
    assert!(known(fixture.ledger.is_parent_of(child, grandchild)));
    assert!(!known(fixture.ledger.is_parent_of(genesis, grandchild)));
    assert!(!known(fixture.ledger.is_parent_of(grandchild, child)));
}

#[test]
fn children_with_matching_payout_in_other_trees_are_not_adopted() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let other_root = fixture
        .ledger
        .create_genesis_universe()
        .expect("second root");
    let foreign = fixture.child(other_root, "101");

    assert!(!known(fixture.ledger.is_parent_of(genesis, foreign)));

    let own = fixture.child(genesis, "101");
    assert_ne!(own, foreign);
    assert!(known(fixture.ledger.is_parent_of(genesis, own)));
    assert!(!known(fixture.ledger.is_parent_of(genesis, foreign)));
}

#[test]
fn derived_payout_hashes_select_distinct_children() {
    let mut fixture = Fixture::new();
    let genesis = fixture.genesis;
    let yes = PayoutDistributionHash::derive(&[0, 10_000], false);
    let no = PayoutDistributionHash::derive(&[10_000, 0], false);

    let yes_child = fixture
        .ledger
        .get_or_create_child_universe(genesis, yes)
        .expect("child");
    let no_child = fixture
        .ledger
        .get_or_create_child_universe(genesis, no)
        .expect("child");

    assert_ne!(yes_child, no_child);
    let snapshot = fixture.ledger.snapshot(genesis).expect("snapshot");
    assert_eq!(snapshot.child_universes.len(), 2);
    assert_eq!(snapshot.child_universes.get(&yes), Some(&yes_child));
}
