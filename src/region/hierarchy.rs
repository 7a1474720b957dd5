//! Parent/child relations between adjacent hierarchy levels.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::RegionStore;
use crate::models::{LevelId, RegionId};

/// How a level's regions find their parent one level up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ParentLink {
    /// The child's code truncated to `length` characters is the parent's code
    /// (ITL3 "TLC11" -> ITL2 "TLC1").
    Prefix { length: usize },
    /// The parent is the region covering the child's centroid.
    Containment,
    /// A feature property of the child holds the parent's code.
    Attribute { field: String },
}

/// Linkage counts for one level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub linked: usize,
    pub orphaned: usize,
}

/// Id-indexed parent and children tables over a `RegionStore`.
///
/// Regions never point at each other; a region without a mapped parent is
/// simply unreachable from above.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parents: Vec<Option<RegionId>>,
    children: Vec<Vec<RegionId>>,
    stats: Vec<LinkStats>,
}

impl Hierarchy {
    pub fn build(store: &RegionStore) -> Self {
        let mut hierarchy = Self {
            parents: vec![None; store.len()],
            children: vec![Vec::new(); store.len()],
            stats: vec![LinkStats::default(); store.level_count()],
        };

        for (level, layer) in store.levels() {
            let Some(parent_level) = level.coarser() else {
                continue;
            };
            let Some(link) = &layer.parent_link else {
                debug!("Level '{}' has no parent link", layer.name);
                continue;
            };

            let by_code = code_lookup(store, parent_level);
            let mut stats = LinkStats::default();

            for &child in layer.regions() {
                let parent = match link {
                    ParentLink::Prefix { length } => store
                        .region(child)
                        .area
                        .code
                        .as_deref()
                        .and_then(|code| code.get(..*length))
                        .and_then(|prefix| by_code.get(prefix).copied()),
                    ParentLink::Attribute { .. } => store
                        .region(child)
                        .area
                        .parent_code
                        .as_deref()
                        .and_then(|code| by_code.get(code).copied()),
                    ParentLink::Containment => containing_parent(store, parent_level, child),
                };

                match parent {
                    Some(parent) => {
                        hierarchy.parents[child.index()] = Some(parent);
                        hierarchy.children[parent.index()].push(child);
                        stats.linked += 1;
                    }
                    None => {
                        debug!(
                            "No parent found for '{}' at level '{}'",
                            store.region(child).area.label(),
                            layer.name
                        );
                        stats.orphaned += 1;
                    }
                }
            }

            info!(
                "Linked level '{}': {} regions with parents, {} without",
                layer.name, stats.linked, stats.orphaned
            );
            hierarchy.stats[level.index()] = stats;
        }

        hierarchy
    }

    pub fn parent(&self, id: RegionId) -> Option<RegionId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Children in store order; empty for leaves and unknown ids
    pub fn children(&self, id: RegionId) -> &[RegionId] {
        self.children
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn link_stats(&self, level: LevelId) -> LinkStats {
        self.stats.get(level.index()).copied().unwrap_or_default()
    }
}

fn code_lookup(store: &RegionStore, level: LevelId) -> HashMap<&str, RegionId> {
    store
        .regions_at(level)
        .filter_map(|r| r.area.code.as_deref().map(|code| (code, r.id())))
        .collect()
}

fn containing_parent(store: &RegionStore, parent_level: LevelId, child: RegionId) -> Option<RegionId> {
    let region = store.region(child);
    store
        .locate_at_level(parent_level, &region.centroid)
        .or_else(|| {
            let inner = region.interior_point()?;
            store.locate_at_level(parent_level, &inner)
        })
}
