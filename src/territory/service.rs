//! Per-tier territory computation: partition, then merge per league.

use tracing::info;

use super::{EntryPolicy, GeometryMerger, LeagueTerritory, MergeOptions, PartitionStats, TerritoryPartitioner};
use crate::locate::RegionToTeams;
use crate::models::{LevelId, Team, Tier};
use crate::region::{Hierarchy, RegionStore};

/// Territories of one tier
#[derive(Debug, Clone)]
pub struct TierTerritories {
    pub tier: Tier,
    pub entry: LevelId,
    pub team_count: usize,
    /// One per league, ordered by league name
    pub territories: Vec<LeagueTerritory>,
    pub stats: PartitionStats,
    /// Pieces left out of the per-league union
    pub merge_skipped: usize,
}

/// Shared, read-only context for computing any number of tiers.
pub struct TerritoryService<'a> {
    store: &'a RegionStore,
    hierarchy: &'a Hierarchy,
    entry: EntryPolicy,
    merger: GeometryMerger,
}

impl<'a> TerritoryService<'a> {
    pub fn new(store: &'a RegionStore, hierarchy: &'a Hierarchy, entry: EntryPolicy, merge: MergeOptions) -> Self {
        Self {
            store,
            hierarchy,
            entry,
            merger: GeometryMerger::new(merge),
        }
    }

    pub fn entry_level(&self, tier: &Tier) -> LevelId {
        self.entry.entry_level(tier.rank)
    }

    /// Compute the league territories of `tier`.
    ///
    /// `teams` may hold every loaded team; only those of `tier` take part.
    /// `index` is the reverse index of a location pass over them.
    pub fn tier_territories(&self, tier: &Tier, teams: &[Team], index: &RegionToTeams) -> TierTerritories {
        let tier_teams: Vec<Team> = teams.iter().filter(|t| &t.tier == tier).cloned().collect();
        let entry = self.entry_level(tier);

        let partition = TerritoryPartitioner::new(self.store, self.hierarchy).partition(&tier_teams, index, entry);
        let merged = self.merger.merge(&partition.pieces);

        info!(
            "{}: {} teams, {} pieces merged into {} league territories",
            tier,
            tier_teams.len(),
            partition.pieces.len(),
            merged.territories.len()
        );

        TierTerritories {
            tier: tier.clone(),
            entry,
            team_count: tier_teams.len(),
            territories: merged.territories,
            stats: partition.stats,
            merge_skipped: merged.skipped,
        }
    }
}
