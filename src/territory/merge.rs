//! Per-league union and simplification of partition pieces.

use std::collections::BTreeMap;

use geo::{MultiPolygon, Polygon, SimplifyVwPreserve};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ops;
use super::partition::TerritoryPiece;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Simplification tolerance in coordinate units; 0 disables simplification
    pub simplify_tolerance: f64,
    /// Drop interior rings from the merged geometry
    pub strip_holes: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            simplify_tolerance: 0.001,
            strip_holes: true,
        }
    }
}

/// The merged territory of one league
#[derive(Debug, Clone)]
pub struct LeagueTerritory {
    pub league: String,
    pub geometry: MultiPolygon<f64>,
    pub piece_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Merged {
    /// Ordered by league name
    pub territories: Vec<LeagueTerritory>,
    /// Pieces left out because their union failed
    pub skipped: usize,
}

pub struct GeometryMerger {
    options: MergeOptions,
}

impl GeometryMerger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn merge(&self, pieces: &[TerritoryPiece]) -> Merged {
        let mut by_league: BTreeMap<&str, Vec<&MultiPolygon<f64>>> = BTreeMap::new();
        for piece in pieces {
            by_league.entry(piece.league.as_str()).or_default().push(&piece.geometry);
        }

        let mut merged = Merged::default();
        for (league, geometries) in by_league {
            let (union, skipped) = ops::union_all(geometries.iter().copied());
            if skipped > 0 {
                warn!("{}: {} of {} pieces left out of the union", league, skipped, geometries.len());
            }
            merged.skipped += skipped;

            let geometry = self.finish(union);
            if !ops::has_area(&geometry) {
                debug!("{}: merged territory is empty", league);
                continue;
            }

            merged.territories.push(LeagueTerritory {
                league: league.to_string(),
                geometry,
                piece_count: geometries.len() - skipped,
            });
        }

        merged
    }

    fn finish(&self, geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
        let tolerance = self.options.simplify_tolerance;
        let geometry = if tolerance > 0.0 {
            // VW works on triangle areas, so square the distance tolerance
            geometry.simplify_vw_preserve(&(tolerance * tolerance))
        } else {
            geometry
        };

        if self.options.strip_holes {
            strip_holes(geometry)
        } else {
            geometry
        }
    }
}

fn strip_holes(geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry
        .into_iter()
        .map(|polygon| {
            let (exterior, _) = polygon.into_inner();
            Polygon::new(exterior, vec![])
        })
        .collect()
}
