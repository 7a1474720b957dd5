//! Error types raised at the load boundaries and by geometry operations.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or inconsistent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no hierarchy levels configured")]
    NoLevels,

    #[error("level '{0}' is configured more than once")]
    DuplicateLevel(String),

    #[error("coarsest level '{0}' cannot have a parent link")]
    RootWithParent(String),

    #[error("level '{0}' has no parent link")]
    MissingParentLink(String),

    #[error("prefix link of level '{0}' needs a code field")]
    PrefixWithoutCode(String),

    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    #[error("invalid tier pattern for '{tier}': {source}")]
    TierPattern {
        tier: String,
        #[source]
        source: regex::Error,
    },

    #[error("simplify tolerance must be finite and non-negative, got {0}")]
    Tolerance(f64),
}

/// A boundary or team dataset that could not be read.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection(PathBuf),
}

/// A boolean or simplification operation rejected its input.
#[derive(Debug, Error)]
#[error("geometry {operation} failed: {reason}")]
pub struct GeometryError {
    pub operation: &'static str,
    pub reason: String,
}
