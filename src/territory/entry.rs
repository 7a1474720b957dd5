//! Choice of the hierarchy level where a tier's partition starts.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::models::LevelId;

/// Tiers ranked at or above `max_rank` start at `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRule {
    pub max_rank: u32,
    pub level: String,
}

/// `[entry]` section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub default_level: String,
    #[serde(default)]
    pub rules: Vec<EntryRule>,
}

/// Entry rules resolved against the loaded levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPolicy {
    rules: Vec<(u32, LevelId)>,
    default: LevelId,
}

impl EntryPolicy {
    /// Every tier starts at `level`
    pub fn uniform(level: LevelId) -> Self {
        Self {
            rules: Vec::new(),
            default: level,
        }
    }

    /// Resolve level names against the configured level order.
    ///
    /// Only the first `loaded` configured levels exist in the store; a rule
    /// naming a level past them falls back to the finest loaded level.
    pub fn resolve(config: &EntryConfig, configured: &[String], loaded: usize) -> Result<Self, ConfigError> {
        let lookup = |name: &str| -> Result<LevelId, ConfigError> {
            let position = configured
                .iter()
                .position(|level| level == name)
                .ok_or_else(|| ConfigError::UnknownLevel(name.to_string()))?;

            if position >= loaded {
                let fallback = loaded.saturating_sub(1);
                warn!(
                    "Entry level '{}' is not loaded, using '{}' instead",
                    name,
                    configured.get(fallback).map(String::as_str).unwrap_or("none")
                );
                return Ok(LevelId(fallback as u8));
            }
            Ok(LevelId(position as u8))
        };

        let rules = config
            .rules
            .iter()
            .map(|rule| Ok((rule.max_rank, lookup(&rule.level)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            rules,
            default: lookup(&config.default_level)?,
        })
    }

    /// First rule (in configuration order) whose `max_rank` covers the rank.
    pub fn entry_level(&self, rank: u32) -> LevelId {
        self.rules
            .iter()
            .find(|(max_rank, _)| rank <= *max_rank)
            .map_or(self.default, |(_, level)| *level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> Vec<String> {
        ["country", "itl1", "itl2", "itl3"].iter().map(|s| s.to_string()).collect()
    }

    fn config() -> EntryConfig {
        EntryConfig {
            default_level: "itl3".to_string(),
            rules: vec![
                EntryRule {
                    max_rank: 3,
                    level: "country".to_string(),
                },
                EntryRule {
                    max_rank: 4,
                    level: "itl1".to_string(),
                },
                EntryRule {
                    max_rank: 6,
                    level: "itl2".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let policy = EntryPolicy::resolve(&config(), &levels(), 4).unwrap();

        assert_eq!(policy.entry_level(1), LevelId(0));
        assert_eq!(policy.entry_level(3), LevelId(0));
        assert_eq!(policy.entry_level(4), LevelId(1));
        assert_eq!(policy.entry_level(5), LevelId(2));
        assert_eq!(policy.entry_level(9), LevelId(3));
    }

    #[test]
    fn test_unloaded_level_falls_back_to_finest_loaded() {
        let policy = EntryPolicy::resolve(&config(), &levels(), 2).unwrap();

        assert_eq!(policy.entry_level(5), LevelId(1));
        assert_eq!(policy.entry_level(9), LevelId(1));
        assert_eq!(policy.entry_level(2), LevelId(0));
    }

    #[test]
    fn test_unknown_level() {
        let mut config = config();
        config.default_level = "ward".to_string();

        let err = EntryPolicy::resolve(&config, &levels(), 4).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLevel(name) if name == "ward"));
    }

    #[test]
    fn test_uniform() {
        let policy = EntryPolicy::uniform(LevelId(2));
        assert_eq!(policy.entry_level(1), LevelId(2));
        assert_eq!(policy.entry_level(100), LevelId(2));
    }
}
