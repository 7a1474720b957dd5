//! Region store: every loaded region of every level, in one arena.

use geo::{MultiPolygon, Point};
use tracing::{info, warn};

use super::{LevelIndex, ParentLink, Region};
use crate::models::{LevelId, RegionArea, RegionId};

/// A region as read from a boundary dataset, before it gets an id.
#[derive(Debug, Clone)]
pub struct RegionFeature {
    pub name: String,
    pub code: Option<String>,
    pub parent_code: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// One hierarchy level and the regions loaded for it
pub struct LevelLayer {
    pub name: String,
    /// How regions of this level find their parent one level up
    pub parent_link: Option<ParentLink>,
    regions: Vec<RegionId>,
    index: LevelIndex,
}

impl LevelLayer {
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    pub fn index(&self) -> &LevelIndex {
        &self.index
    }
}

/// Immutable after loading; shared by reference across tiers.
#[derive(Default)]
pub struct RegionStore {
    regions: Vec<Region>,
    levels: Vec<LevelLayer>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next finer level. Features with empty geometry are skipped.
    pub fn add_level(
        &mut self,
        name: impl Into<String>,
        parent_link: Option<ParentLink>,
        features: Vec<RegionFeature>,
    ) -> LevelId {
        let name = name.into();
        let level = LevelId(self.levels.len() as u8);
        let first = self.regions.len();

        for feature in features {
            let id = RegionId(self.regions.len() as u32);
            let area = RegionArea {
                id,
                level,
                name: feature.name,
                code: feature.code,
                parent_code: feature.parent_code,
            };
            match Region::new(area, feature.geometry) {
                Some(region) => self.regions.push(region),
                None => warn!("Skipping region with empty geometry at level '{}'", name),
            }
        }

        let regions: Vec<RegionId> = self.regions[first..].iter().map(Region::id).collect();
        let index = LevelIndex::build(&self.regions[first..]);

        info!("Level {} '{}': {} regions", level.0, name, regions.len());

        self.levels.push(LevelLayer {
            name,
            parent_link,
            regions,
            index,
        });
        level
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    pub fn level(&self, level: LevelId) -> Option<&LevelLayer> {
        self.levels.get(level.index())
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Iterate levels coarsest first
    pub fn levels(&self) -> impl Iterator<Item = (LevelId, &LevelLayer)> {
        self.levels
            .iter()
            .enumerate()
            .map(|(i, layer)| (LevelId(i as u8), layer))
    }

    pub fn level_by_name(&self, name: &str) -> Option<LevelId> {
        self.levels
            .iter()
            .position(|layer| layer.name == name)
            .map(|i| LevelId(i as u8))
    }

    /// Whether a level finer than `level` is loaded
    pub fn has_finer(&self, level: LevelId) -> bool {
        level.finer().index() < self.levels.len()
    }

    /// All regions of a level, in store order
    pub fn regions_at(&self, level: LevelId) -> impl Iterator<Item = &Region> {
        self.level(level)
            .map(|layer| layer.regions.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|id| self.region(*id))
    }

    pub fn find_by_code(&self, level: LevelId, code: &str) -> Option<&Region> {
        self.regions_at(level)
            .find(|r| r.area.code.as_deref() == Some(code))
    }

    /// First region of `level` (store order) covering the point.
    pub fn locate_at_level(&self, level: LevelId, point: &Point<f64>) -> Option<RegionId> {
        let layer = self.level(level)?;
        layer
            .index
            .candidates(point)
            .into_iter()
            .find(|id| self.region(*id).contains_point(point))
    }

    /// Get total number of regions across all levels
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
