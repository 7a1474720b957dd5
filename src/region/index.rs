//! Per-level spatial index for fast region candidate lookups.

use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

use super::Region;
use crate::models::RegionId;

/// Wrapper for R-tree indexing of region envelopes
#[derive(Clone)]
struct IndexedRegion {
    id: RegionId,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    fn new(region: &Region) -> Self {
        let bbox = region.bbox();
        Self {
            id: region.id(),
            envelope: AABB::from_corners(
                [bbox.min().x, bbox.min().y],
                [bbox.max().x, bbox.max().y],
            ),
        }
    }
}

/// R-tree over the envelopes of one level's regions
pub struct LevelIndex {
    tree: RTree<IndexedRegion>,
}

impl LevelIndex {
    /// Build spatial index from one level's regions
    pub fn build<'a>(regions: impl IntoIterator<Item = &'a Region>) -> Self {
        let indexed: Vec<IndexedRegion> = regions.into_iter().map(IndexedRegion::new).collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Regions whose envelope covers the point, in store order.
    ///
    /// Only envelopes are tested; callers still run the exact containment test.
    pub fn candidates(&self, point: &Point<f64>) -> Vec<RegionId> {
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        let mut ids: Vec<RegionId> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|ir| ir.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Get total number of indexed regions
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
