//! Child-universe ledger: at most one child per payout distribution hash.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use arbor_types::{PayoutDistributionHash, UniverseRef};

use super::Universe;
use crate::collaborators::{UniverseFactory, UniverseView};
use crate::errors::UniverseError;

/// First writer wins; entries are never replaced.
#[derive(Debug, Clone, Default)]
pub(super) struct ChildUniverses {
    by_payout: BTreeMap<PayoutDistributionHash, UniverseRef>,
}

impl Universe {
    #[must_use]
    pub fn child_universe(&self, hash: PayoutDistributionHash) -> Option<UniverseRef> {
        self.children.by_payout.get(&hash).copied()
    }

    pub fn child_universes(
        &self,
    ) -> impl Iterator<Item = (PayoutDistributionHash, UniverseRef)> + '_ {
        self.children
            .by_payout
            .iter()
            .map(|(hash, child)| (*hash, *child))
    }

    pub fn get_or_create_child_universe(
        &mut self,
        hash: PayoutDistributionHash,
        factory: &mut impl UniverseFactory,
    ) -> Result<UniverseRef, UniverseError> {
        match self.children.by_payout.entry(hash) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let child = factory.create_universe(self.address, hash)?;
                tracing::info!(
                    universe = %self.address,
                    payout = %hash,
                    child = %child,
                    "Child universe created"
                );
                Ok(*entry.insert(child))
            }
        }
    }

    /// Re-derives parentage from this universe's own child table.
    ///
    /// The candidate's self-reported payout hash only selects which entry to
    /// compare against; a universe that merely claims a hash this universe
    /// knows about is not a child.
    #[must_use]
    pub fn is_parent_of(&self, candidate: UniverseRef, view: &impl UniverseView) -> bool {
        view.parent_payout_distribution_hash(candidate)
            .is_some_and(|hash| self.child_universe(hash) == Some(candidate))
    }
}
