//! Administrative region identity and hierarchy levels.

use serde::{Deserialize, Serialize};

/// Index of a loaded hierarchy level, 0 being the coarsest (usually the country level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct LevelId(pub u8);

impl LevelId {
    /// The coarsest level
    pub const ROOT: LevelId = LevelId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The next finer level (which may not be loaded)
    pub fn finer(self) -> LevelId {
        LevelId(self.0 + 1)
    }

    /// The next coarser level, `None` for the root
    pub fn coarser(self) -> Option<LevelId> {
        self.0.checked_sub(1).map(LevelId)
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level{}", self.0)
    }
}

/// Arena index of a region inside a `RegionStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region/{}", self.0)
    }
}

/// Identity and dataset attributes of one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionArea {
    pub id: RegionId,

    pub level: LevelId,

    /// Display name (e.g. "Greater Manchester")
    pub name: String,

    /// Hierarchical dataset code (e.g. "TLD3"), if the dataset has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Parent code taken from an explicit attribute of the feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
}

impl RegionArea {
    /// Stable label for logs: the code when present, otherwise the name.
    pub fn label(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}
