use anyhow::{Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::io::TierMatcher;
use crate::region::{ParentLink, RegionStore};
use crate::territory::{EntryConfig, EntryPolicy, MergeOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    pub levels: Vec<LevelConfig>,
    pub entry: EntryConfig,
    #[serde(default)]
    pub tiers: Vec<TierConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_tolerance")]
    pub simplify_tolerance: f64,
    #[serde(default = "default_strip_holes")]
    pub strip_holes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            simplify_tolerance: default_tolerance(),
            strip_holes: default_strip_holes(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("territories")
}

fn default_tolerance() -> f64 {
    MergeOptions::default().simplify_tolerance
}

fn default_strip_holes() -> bool {
    MergeOptions::default().strip_holes
}

/// One boundary dataset, coarsest level first
#[derive(Debug, Deserialize, Clone)]
pub struct LevelConfig {
    pub name: String,
    pub path: PathBuf,
    pub name_field: String,
    #[serde(default)]
    pub code_field: Option<String>,
    /// How regions of this level find their parent one level up
    #[serde(default)]
    pub parent: Option<ParentLink>,
}

/// A tier and the team file names that belong to it
#[derive(Debug, Deserialize, Clone)]
pub struct TierConfig {
    pub name: String,
    pub rank: u32,
    /// Regex matched against team file stems
    pub pattern: String,
}

impl Config {
    /// Load and validate a config file. Relative dataset paths are resolved
    /// against the directory holding the file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate().context("Invalid config file")?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for level in &mut self.levels {
            if level.path.is_relative() {
                level.path = base.join(&level.path);
            }
        }
        if self.output.dir.is_relative() {
            self.output.dir = base.join(&self.output.dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(root) = self.levels.first() else {
            return Err(ConfigError::NoLevels);
        };
        if root.parent.is_some() {
            return Err(ConfigError::RootWithParent(root.name.clone()));
        }

        let mut seen = HashSet::new();
        for (i, level) in self.levels.iter().enumerate() {
            if !seen.insert(level.name.as_str()) {
                return Err(ConfigError::DuplicateLevel(level.name.clone()));
            }
            if i == 0 {
                continue;
            }
            match &level.parent {
                None => return Err(ConfigError::MissingParentLink(level.name.clone())),
                Some(ParentLink::Prefix { .. }) if level.code_field.is_none() => {
                    return Err(ConfigError::PrefixWithoutCode(level.name.clone()))
                }
                Some(_) => {}
            }
        }

        for name in std::iter::once(&self.entry.default_level).chain(self.entry.rules.iter().map(|r| &r.level)) {
            if !seen.contains(name.as_str()) {
                return Err(ConfigError::UnknownLevel(name.clone()));
            }
        }

        let tolerance = self.output.simplify_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Tolerance(tolerance));
        }

        self.tier_matcher().map(|_| ())
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            simplify_tolerance: self.output.simplify_tolerance,
            strip_holes: self.output.strip_holes,
        }
    }

    /// Entry rules resolved against the levels actually loaded into `store`
    pub fn entry_policy(&self, store: &RegionStore) -> Result<EntryPolicy, ConfigError> {
        let names: Vec<String> = self.levels.iter().map(|l| l.name.clone()).collect();
        EntryPolicy::resolve(&self.entry, &names, store.level_count())
    }

    pub fn tier_matcher(&self) -> Result<TierMatcher, ConfigError> {
        TierMatcher::new(&self.tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[output]
dir = "out"
simplify_tolerance = 0.002

[[levels]]
name = "country"
path = "boundaries/countries.geojson"
name_field = "CTRY24NM"
code_field = "CTRY24CD"

[[levels]]
name = "itl1"
path = "/data/ITL_1.geojson"
name_field = "ITL125NM"
code_field = "ITL125CD"
parent = { method = "containment" }

[[levels]]
name = "itl2"
path = "boundaries/ITL_2.geojson"
name_field = "ITL225NM"
code_field = "ITL225CD"
parent = { method = "prefix", length = 3 }

[entry]
default_level = "itl2"
rules = [ { max_rank = 3, level = "country" } ]

[[tiers]]
name = "Premiership"
rank = 1
pattern = "^Premiership"
"#;

    fn parse(content: &str) -> Config {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_load_from_file_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catchment.toml");
        fs::File::create(&path).unwrap().write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.levels.len(), 3);
        assert_eq!(config.levels[0].path, dir.path().join("boundaries/countries.geojson"));
        assert_eq!(config.levels[1].path, PathBuf::from("/data/ITL_1.geojson"));
        assert_eq!(config.levels[2].parent, Some(ParentLink::Prefix { length: 3 }));
        assert_eq!(config.output.dir, dir.path().join("out"));
        assert!(config.output.strip_holes);
        assert_eq!(config.merge_options().simplify_tolerance, 0.002);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from_file("/nonexistent/catchment.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_bad_levels() {
        let mut config = parse(SAMPLE);
        config.levels[0].parent = Some(ParentLink::Containment);
        assert!(matches!(config.validate(), Err(ConfigError::RootWithParent(_))));

        let mut config = parse(SAMPLE);
        config.levels[1].parent = None;
        assert!(matches!(config.validate(), Err(ConfigError::MissingParentLink(name)) if name == "itl1"));

        let mut config = parse(SAMPLE);
        config.levels[2].code_field = None;
        assert!(matches!(config.validate(), Err(ConfigError::PrefixWithoutCode(_))));

        let mut config = parse(SAMPLE);
        config.levels[2].name = "country".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateLevel(_))));

        let mut config = parse(SAMPLE);
        config.levels.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoLevels)));
    }

    #[test]
    fn test_validate_rejects_bad_entry_and_tiers() {
        let mut config = parse(SAMPLE);
        config.entry.default_level = "itl9".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownLevel(_))));

        let mut config = parse(SAMPLE);
        config.tiers[0].pattern = "(".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::TierPattern { .. })));

        let mut config = parse(SAMPLE);
        config.output.simplify_tolerance = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Tolerance(_))));

        assert!(parse(SAMPLE).validate().is_ok());
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = parse(include_str!("../catchment.toml"));
        config.validate().unwrap();
        assert_eq!(config.levels.len(), 4);

        let matcher = config.tier_matcher().unwrap();
        assert_eq!(matcher.tier_for("Women's_Championship_North_1").map(|t| t.name.as_str()), Some("Championship 1"));
        assert_eq!(matcher.tier_for("Cumbria_Conference_2").map(|t| t.rank), Some(9));
    }
}
