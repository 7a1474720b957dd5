//! Point locator: resolves the region hierarchy for a team's coordinate.

use geo::Point;
use tracing::{debug, info};

use super::{LocateStats, Placement, RegionToTeams, TeamRegions};
use crate::models::{LevelId, Team};
use crate::region::{Hierarchy, RegionStore};

/// Point-in-region lookup service
pub struct PointLocator<'a> {
    store: &'a RegionStore,
    hierarchy: &'a Hierarchy,
}

impl<'a> PointLocator<'a> {
    pub fn new(store: &'a RegionStore, hierarchy: &'a Hierarchy) -> Self {
        Self { store, hierarchy }
    }

    /// Resolve the region at every level for a point.
    ///
    /// The coarsest level is searched through its R-tree; each finer level
    /// only tests the children of the region found one level up. The descent
    /// stops at the first level with no containing region.
    pub fn locate(&self, point: &Point<f64>) -> TeamRegions {
        let mut regions = TeamRegions::new(self.store.level_count());

        let Some(mut current) = self.store.locate_at_level(LevelId::ROOT, point) else {
            return regions;
        };
        regions.set(LevelId::ROOT, current);

        let mut level = LevelId::ROOT;
        while self.store.has_finer(level) {
            level = level.finer();
            let found = self
                .hierarchy
                .children(current)
                .iter()
                .copied()
                .find(|child| self.store.region(*child).contains_point(point));

            match found {
                Some(child) => {
                    regions.set(level, child);
                    current = child;
                }
                None => break,
            }
        }

        regions
    }

    /// Locate every team and build the reverse `region -> teams` index.
    pub fn locate_all(&self, teams: &[Team]) -> Placement {
        let level_count = self.store.level_count();
        let mut placement = Placement {
            teams: Default::default(),
            index: RegionToTeams::new(level_count),
            stats: LocateStats {
                total: teams.len(),
                resolved: vec![0; level_count],
                unplaced: 0,
            },
        };

        for team in teams {
            let regions = self.locate(&team.point());

            if regions.is_unplaced() {
                debug!(
                    "Team '{}' at ({}, {}) is outside every region",
                    team.name, team.longitude, team.latitude
                );
                placement.stats.unplaced += 1;
            }

            for (i, resolved) in placement.stats.resolved.iter_mut().enumerate() {
                let level = LevelId(i as u8);
                if let Some(region) = regions.get(level) {
                    placement.index.insert(level, region, team.id);
                    *resolved += 1;
                }
            }

            placement.teams.insert(team.id, regions);
        }

        info!(
            "Located {} teams ({} outside every region)",
            placement.stats.total, placement.stats.unplaced
        );
        for (level, layer) in self.store.levels() {
            info!(
                "  {}: {} teams in {} regions",
                layer.name,
                placement.stats.resolved[level.index()],
                placement.index.occupied_regions(level)
            );
        }

        placement
    }
}
