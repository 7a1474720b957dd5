//! Results of a point-location pass.

use hashbrown::HashMap;

use crate::models::{LevelId, RegionId, Team, TeamId, Tier};

/// Region found for one team at each level, coarsest first.
///
/// Resolution stops at the first level without a containing region, so every
/// entry after the first `None` is also `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRegions {
    levels: Vec<Option<RegionId>>,
}

impl TeamRegions {
    pub fn new(level_count: usize) -> Self {
        Self {
            levels: vec![None; level_count],
        }
    }

    pub fn set(&mut self, level: LevelId, region: RegionId) {
        if let Some(slot) = self.levels.get_mut(level.index()) {
            *slot = Some(region);
        }
    }

    pub fn get(&self, level: LevelId) -> Option<RegionId> {
        self.levels.get(level.index()).copied().flatten()
    }

    /// The most specific region found
    pub fn deepest(&self) -> Option<(LevelId, RegionId)> {
        self.levels
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.map(|r| (LevelId(i as u8), r)))
            .last()
    }

    pub fn is_unplaced(&self) -> bool {
        self.levels.first().copied().flatten().is_none()
    }
}

/// Per level, `region -> teams` located inside it, in input order.
#[derive(Debug, Clone, Default)]
pub struct RegionToTeams {
    levels: Vec<HashMap<RegionId, Vec<TeamId>>>,
}

impl RegionToTeams {
    pub fn new(level_count: usize) -> Self {
        Self {
            levels: vec![HashMap::new(); level_count],
        }
    }

    pub fn insert(&mut self, level: LevelId, region: RegionId, team: TeamId) {
        if self.levels.len() <= level.index() {
            self.levels.resize_with(level.index() + 1, HashMap::new);
        }
        self.levels[level.index()].entry(region).or_default().push(team);
    }

    pub fn teams_in(&self, level: LevelId, region: RegionId) -> &[TeamId] {
        self.levels
            .get(level.index())
            .and_then(|regions| regions.get(&region))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of regions at `level` with at least one team
    pub fn occupied_regions(&self, level: LevelId) -> usize {
        self.levels.get(level.index()).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(HashMap::is_empty)
    }

    /// Copy keeping only the teams accepted by `keep`; emptied regions are dropped.
    pub fn restrict(&self, keep: impl Fn(TeamId) -> bool) -> Self {
        let levels = self
            .levels
            .iter()
            .map(|regions| {
                regions
                    .iter()
                    .filter_map(|(region, teams)| {
                        let kept: Vec<TeamId> = teams.iter().copied().filter(|t| keep(*t)).collect();
                        (!kept.is_empty()).then_some((*region, kept))
                    })
                    .collect()
            })
            .collect();
        Self { levels }
    }

    /// Restrict to the teams of one tier
    pub fn for_tier(&self, teams: &[Team], tier: &Tier) -> Self {
        let members: hashbrown::HashSet<TeamId> = teams
            .iter()
            .filter(|t| &t.tier == tier)
            .map(|t| t.id)
            .collect();
        self.restrict(|id| members.contains(&id))
    }
}

/// Diagnostics of one location pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateStats {
    pub total: usize,
    /// Teams resolved at each level, coarsest first
    pub resolved: Vec<usize>,
    /// Teams outside every coarsest-level region
    pub unplaced: usize,
}

/// Output of `PointLocator::locate_all`
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub teams: HashMap<TeamId, TeamRegions>,
    pub index: RegionToTeams,
    pub stats: LocateStats,
}

impl Placement {
    pub fn regions_of(&self, team: TeamId) -> Option<&TeamRegions> {
        self.teams.get(&team)
    }
}
