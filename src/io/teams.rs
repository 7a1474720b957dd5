//! Geocoded team files: one JSON file per league, tier taken from the file name.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::TierConfig;
use crate::error::{ConfigError, DatasetError};
use crate::models::{Team, TeamId, Tier};

#[derive(Debug, Deserialize)]
pub struct TeamFile {
    #[serde(default = "unknown_league")]
    pub league_name: String,
    #[serde(default)]
    pub league_url: Option<String>,
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
}

fn unknown_league() -> String {
    "Unknown League".to_string()
}

#[derive(Debug, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

/// Maps team file names to tiers, first matching pattern wins.
#[derive(Debug, Clone)]
pub struct TierMatcher {
    patterns: Vec<(Regex, Tier)>,
}

impl TierMatcher {
    pub fn new(tiers: &[TierConfig]) -> Result<Self, ConfigError> {
        let patterns = tiers
            .iter()
            .map(|tier| {
                let regex = Regex::new(&tier.pattern).map_err(|source| ConfigError::TierPattern {
                    tier: tier.name.clone(),
                    source,
                })?;
                Ok((regex, Tier::new(tier.rank, tier.name.clone())))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { patterns })
    }

    pub fn tier_for(&self, file_stem: &str) -> Option<&Tier> {
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(file_stem))
            .map(|(_, tier)| tier)
    }

    /// Configured tiers ordered by rank, then name
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers: Vec<Tier> = self.patterns.iter().map(|(_, tier)| tier.clone()).collect();
        tiers.sort();
        tiers.dedup();
        tiers
    }
}

/// Teams read from a directory
#[derive(Debug, Clone, Default)]
pub struct TeamSet {
    /// Geocoded teams, ids assigned in load order
    pub teams: Vec<Team>,
    pub files: usize,
    /// JSON files whose name matches no tier
    pub unmatched_files: Vec<PathBuf>,
    /// Records without coordinates
    pub without_location: usize,
}

impl TeamSet {
    pub fn of_tier<'a>(&'a self, tier: &'a Tier) -> impl Iterator<Item = &'a Team> + 'a {
        self.teams.iter().filter(move |t| &t.tier == tier)
    }
}

/// Read every `*.json` team file directly inside `dir`, in file name order.
pub fn load_teams(dir: &Path, matcher: &TierMatcher) -> Result<TeamSet, DatasetError> {
    let mut set = TeamSet::default();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();

        let Some(tier) = matcher.tier_for(stem) else {
            debug!("No tier matches {}", path.display());
            set.unmatched_files.push(path.to_path_buf());
            continue;
        };

        let file = read_team_file(path)?;
        set.files += 1;

        for record in file.teams {
            let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
                set.without_location += 1;
                continue;
            };
            let id = TeamId(set.teams.len() as u32);
            let mut team = Team::new(id, record.name, file.league_name.clone(), tier.clone(), latitude, longitude);
            team.url = record.url;
            team.address = record.formatted_address;
            team.league_url = file.league_url.clone();
            set.teams.push(team);
        }
    }

    if !set.unmatched_files.is_empty() {
        warn!("{} team files match no configured tier", set.unmatched_files.len());
    }
    info!(
        "Loaded {} teams from {} files ({} without coordinates)",
        set.teams.len(),
        set.files,
        set.without_location
    );
    Ok(set)
}

pub fn read_team_file(path: &Path) -> Result<TeamFile, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}
