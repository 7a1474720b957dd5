//! Recursive ownership partitioning of one tier over the region hierarchy.

use geo::MultiPolygon;
use hashbrown::HashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ownership::{nearest_team, Ownership};
use super::voronoi::bounded_voronoi;
use crate::locate::RegionToTeams;
use crate::models::{LevelId, RegionId, Team, TeamId};
use crate::region::{Hierarchy, Region, RegionStore};

/// How a piece came to belong to its league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Every tier team inside the region plays in the league
    Owned,
    /// No tier team inside; given to the nearest team of the parent region
    Fallback,
    /// Voronoi cell of a contested region with no finer subdivision
    Voronoi,
}

/// One league's contribution from one region.
#[derive(Debug, Clone)]
pub struct TerritoryPiece {
    pub league: String,
    pub region: RegionId,
    pub level: LevelId,
    pub kind: PieceKind,
    pub geometry: MultiPolygon<f64>,
}

/// Counters of one partition run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    /// Entry-level regions with at least one team of the tier
    pub entry_regions: usize,
    pub owned: usize,
    pub fallback: usize,
    pub tessellated: usize,
    /// Tessellations that produced nothing and fell back to the nearest team
    pub tessellation_fallbacks: usize,
    /// Contributions dropped because a geometry operation failed
    pub skipped: usize,
    /// Teams of the tier not located down to the entry level; they start no branch
    pub unplaced_at_entry: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub pieces: Vec<TerritoryPiece>,
    pub stats: PartitionStats,
}

pub struct TerritoryPartitioner<'a> {
    store: &'a RegionStore,
    hierarchy: &'a Hierarchy,
}

/// State of one `partition` call
struct Run<'a, 't> {
    index: &'a RegionToTeams,
    teams: HashMap<TeamId, &'t Team>,
    stats: PartitionStats,
}

impl<'a, 't> Run<'a, 't> {
    /// Teams of the run located directly in a region, in input order
    fn teams_in(&self, level: LevelId, region: RegionId) -> Vec<&'t Team> {
        self.index
            .teams_in(level, region)
            .iter()
            .filter_map(|id| self.teams.get(id).copied())
            .collect()
    }
}

impl<'a> TerritoryPartitioner<'a> {
    pub fn new(store: &'a RegionStore, hierarchy: &'a Hierarchy) -> Self {
        Self { store, hierarchy }
    }

    /// Partition every `entry` region holding at least one of `teams`.
    ///
    /// `index` may cover more teams than `teams`; only the given teams count.
    pub fn partition(&self, teams: &[Team], index: &RegionToTeams, entry: LevelId) -> Partition {
        if teams.is_empty() {
            return Partition::default();
        }
        let Some(layer) = self.store.level(entry) else {
            warn!("Entry level {} is not loaded, nothing to partition", entry);
            return Partition::default();
        };

        let mut run = Run {
            index,
            teams: teams.iter().map(|t| (t.id, t)).collect(),
            stats: PartitionStats::default(),
        };
        let mut pieces = Vec::new();
        let mut placed = 0;

        for &region in layer.regions() {
            let located = run.teams_in(entry, region).len();
            if located == 0 {
                continue;
            }
            placed += located;
            run.stats.entry_regions += 1;
            pieces.extend(self.split(&mut run, entry, region, None));
        }

        run.stats.unplaced_at_entry = run.teams.len().saturating_sub(placed);
        if run.stats.unplaced_at_entry > 0 {
            warn!(
                "{} of {} teams are not located at '{}' and take no part",
                run.stats.unplaced_at_entry,
                run.teams.len(),
                layer.name
            );
        }

        info!(
            "Partitioned {} entry regions at '{}': {} owned, {} fallback, {} tessellated",
            run.stats.entry_regions,
            layer.name,
            run.stats.owned,
            run.stats.fallback,
            run.stats.tessellated
        );

        Partition {
            pieces,
            stats: run.stats,
        }
    }

    fn split(
        &self,
        run: &mut Run<'_, '_>,
        level: LevelId,
        id: RegionId,
        inherited: Option<&[&Team]>,
    ) -> Vec<TerritoryPiece> {
        let region = self.store.region(id);
        let own = run.teams_in(level, id);

        match Ownership::decide(own.iter().copied()) {
            Ownership::Empty => {
                let Some(team) = inherited.and_then(|teams| nearest_team(&region.centroid, teams)) else {
                    return Vec::new();
                };
                debug!(
                    "{} '{}' has no teams, nearest is '{}' ({})",
                    level,
                    region.name(),
                    team.name,
                    team.league
                );
                run.stats.fallback += 1;
                vec![piece(region, &team.league, PieceKind::Fallback, region.geometry.clone())]
            }
            Ownership::Owned(league) => {
                debug!("{} '{}' owned by {}", level, region.name(), league);
                run.stats.owned += 1;
                vec![piece(region, &league, PieceKind::Owned, region.geometry.clone())]
            }
            Ownership::Contested(leagues) => {
                debug!("{} '{}' contested by {:?}", level, region.name(), leagues);
                let children: &[RegionId] = if self.store.has_finer(level) {
                    self.hierarchy.children(id)
                } else {
                    &[]
                };

                if children.is_empty() {
                    return tessellate(run, region, &own);
                }

                let mut pieces = Vec::new();
                for &child in children {
                    pieces.extend(self.split(run, level.finer(), child, Some(own.as_slice())));
                }
                pieces
            }
        }
    }
}

fn tessellate(run: &mut Run<'_, '_>, region: &Region, teams: &[&Team]) -> Vec<TerritoryPiece> {
    run.stats.tessellated += 1;
    let split = bounded_voronoi(teams, &region.geometry);
    if split.skipped > 0 {
        warn!("{} Voronoi cells of '{}' failed to clip or merge", split.skipped, region.name());
    }
    run.stats.skipped += split.skipped;

    if split.is_empty() {
        run.stats.tessellation_fallbacks += 1;
        let Some(team) = nearest_team(&region.centroid, teams) else {
            return Vec::new();
        };
        debug!(
            "Tessellation of '{}' produced nothing, giving it to {}",
            region.name(),
            team.league
        );
        return vec![piece(region, &team.league, PieceKind::Fallback, region.geometry.clone())];
    }

    split
        .cells
        .into_iter()
        .map(|cells| {
            debug!("'{}': {} cells for {}", region.name(), cells.cell_count, cells.league);
            piece(region, &cells.league, PieceKind::Voronoi, cells.geometry)
        })
        .collect()
}

fn piece(region: &Region, league: &str, kind: PieceKind, geometry: MultiPolygon<f64>) -> TerritoryPiece {
    TerritoryPiece {
        league: league.to_string(),
        region: region.id(),
        level: region.level(),
        kind,
        geometry,
    }
}
