//! Territory and team-region output files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde::Serialize;
use serde_json::json;

use crate::locate::Placement;
use crate::models::{LevelId, Team};
use crate::region::RegionStore;
use crate::territory::{PartitionStats, TierTerritories};

/// File name for a tier: spaces and path separators become underscores.
pub fn tier_file_name(tier_name: &str) -> String {
    let stem: String = tier_name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.geojson", stem)
}

/// FeatureCollection with one feature per league.
pub fn tier_collection(result: &TierTerritories) -> FeatureCollection {
    let features = result
        .territories
        .iter()
        .map(|territory| {
            let mut properties = JsonObject::new();
            properties.insert("league".to_string(), json!(territory.league));
            properties.insert("tier".to_string(), json!(result.tier.name));
            properties.insert("rank".to_string(), json!(result.tier.rank));
            properties.insert("pieces".to_string(), json!(territory.piece_count));

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&territory.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write `<dir>/<tier>.geojson` and return its path.
pub fn write_tier(dir: &Path, result: &TierTerritories) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(tier_file_name(&result.tier.name));
    let content = GeoJson::FeatureCollection(tier_collection(result)).to_string();
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Serialize)]
pub struct LevelRegion {
    pub level: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamRegionsRecord {
    pub name: String,
    pub league: String,
    pub tier: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league_url: Option<String>,
    /// Resolved regions, coarsest first; stops at the first unresolved level
    pub regions: Vec<LevelRegion>,
}

pub fn team_regions(teams: &[Team], placement: &Placement, store: &RegionStore) -> Vec<TeamRegionsRecord> {
    teams
        .iter()
        .map(|team| {
            let regions = placement
                .regions_of(team.id)
                .map(|resolved| {
                    store
                        .levels()
                        .map_while(|(level, layer)| {
                            let region = store.region(resolved.get(level)?);
                            Some(LevelRegion {
                                level: layer.name.clone(),
                                name: region.area.name.clone(),
                                code: region.area.code.clone(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            TeamRegionsRecord {
                name: team.name.clone(),
                league: team.league.clone(),
                tier: team.tier.name.clone(),
                latitude: team.latitude,
                longitude: team.longitude,
                url: team.url.clone(),
                address: team.address.clone(),
                league_url: team.league_url.clone(),
                regions,
            }
        })
        .collect()
}

pub fn write_team_regions(path: &Path, teams: &[Team], placement: &Placement, store: &RegionStore) -> Result<()> {
    let records = team_regions(teams, placement, store);
    let content = serde_json::to_string_pretty(&records).context("Failed to serialize team regions")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TierSummary {
    pub tier: String,
    pub rank: u32,
    pub entry_level: String,
    pub teams: usize,
    pub leagues: Vec<String>,
    pub stats: PartitionStats,
    pub merge_skipped: usize,
}

impl TierSummary {
    pub fn new(result: &TierTerritories, store: &RegionStore) -> Self {
        Self {
            tier: result.tier.name.clone(),
            rank: result.tier.rank,
            entry_level: level_name(store, result.entry),
            teams: result.team_count,
            leagues: result.territories.iter().map(|t| t.league.clone()).collect(),
            stats: result.stats.clone(),
            merge_skipped: result.merge_skipped,
        }
    }
}

pub fn write_summary(path: &Path, summaries: &[TierSummary]) -> Result<()> {
    let content = serde_json::to_string_pretty(summaries).context("Failed to serialize summary")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn level_name(store: &RegionStore, level: LevelId) -> String {
    store
        .level(level)
        .map_or_else(|| level.to_string(), |layer| layer.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::PointLocator;
    use crate::models::Tier;
    use crate::region::fixtures::{nested_world, square, team};
    use crate::territory::LeagueTerritory;

    #[test]
    fn test_tier_file_name() {
        assert_eq!(tier_file_name("National League 1"), "National_League_1.geojson");
        assert_eq!(tier_file_name("Premiership Women's"), "Premiership_Women's.geojson");
    }

    #[test]
    fn test_write_tier() {
        let result = TierTerritories {
            tier: Tier::new(3, "National League 1"),
            entry: LevelId::ROOT,
            team_count: 2,
            territories: vec![
                LeagueTerritory {
                    league: "Blue".to_string(),
                    geometry: square(0.0, 0.0, 1.0, 1.0),
                    piece_count: 1,
                },
                LeagueTerritory {
                    league: "Red".to_string(),
                    geometry: square(1.0, 0.0, 2.0, 1.0),
                    piece_count: 2,
                },
            ],
            stats: PartitionStats::default(),
            merge_skipped: 0,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_tier(dir.path(), &result).unwrap();
        assert!(path.ends_with("National_League_1.geojson"));

        let parsed: GeoJson = fs::read_to_string(&path).unwrap().parse().unwrap();
        let GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[1].property("league"), Some(&json!("Red")));
        assert_eq!(collection.features[1].property("rank"), Some(&json!(3)));
        assert_eq!(collection.features[1].property("pieces"), Some(&json!(2)));
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn test_team_regions_stop_at_first_miss() {
        let (store, hierarchy) = nested_world();
        let mut teams = vec![team(0, "Red", 1.5, 1.0), team(1, "Blue", 3.0, 1.0), team(2, "Blue", 9.0, 9.0)];
        teams[0].url = Some("https://red.example".to_string());
        teams[0].address = Some("Red Lane".to_string());
        let placement = PointLocator::new(&store, &hierarchy).locate_all(&teams);

        let records = team_regions(&teams, &placement, &store);
        let codes = |i: usize| -> Vec<Option<&str>> {
            records[i].regions.iter().map(|r| r.code.as_deref()).collect()
        };

        assert_eq!(codes(0), vec![Some("P"), Some("P1"), Some("P12")]);
        assert_eq!(codes(1), vec![Some("P"), Some("P2")]);
        assert!(records[2].regions.is_empty());
        assert_eq!(records[0].regions[2].level, "itl2");

        let first = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(first["url"], json!("https://red.example"));
        assert_eq!(first["address"], json!("Red Lane"));
        let second = serde_json::to_value(&records[1]).unwrap();
        assert!(second.get("url").is_none());
        assert!(second.get("league_url").is_none());
    }
}
