//! GeoJSON boundary datasets, one FeatureCollection per hierarchy level.

use std::fs;
use std::path::Path;

use geo_types::{Geometry, MultiPolygon};
use geojson::{Feature, GeoJson};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, LevelConfig};
use crate::error::DatasetError;
use crate::region::{ParentLink, RegionFeature, RegionStore};

/// Read every polygonal feature of a level's dataset.
///
/// Features without a polygon geometry or without a name are skipped.
pub fn read_features(level: &LevelConfig) -> Result<Vec<RegionFeature>, DatasetError> {
    let path = level.path.as_path();
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse().map_err(|source| DatasetError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DatasetError::NotFeatureCollection(path.to_path_buf()));
    };

    let parent_field = match &level.parent {
        Some(ParentLink::Attribute { field }) => Some(field.as_str()),
        _ => None,
    };

    let total = collection.features.len();
    let mut features = Vec::with_capacity(total);
    for feature in &collection.features {
        let Some(name) = property(feature, &level.name_field) else {
            debug!("Feature without '{}' in {}", level.name_field, path.display());
            continue;
        };
        let Some(geometry) = polygons(feature) else {
            warn!("Skipping '{}' in {}: no polygon geometry", name, path.display());
            continue;
        };

        features.push(RegionFeature {
            name,
            code: level.code_field.as_deref().and_then(|field| property(feature, field)),
            parent_code: parent_field.and_then(|field| property(feature, field)),
            geometry,
        });
    }

    if features.len() < total {
        warn!(
            "{}: kept {} of {} features",
            path.display(),
            features.len(),
            total
        );
    }
    Ok(features)
}

/// Load the configured levels in order.
///
/// Loading stops at the first level whose file does not exist; finer levels
/// are left out and the hierarchy ends there.
pub fn load_store(config: &Config) -> Result<RegionStore, DatasetError> {
    let mut store = RegionStore::new();

    for level in &config.levels {
        if !Path::new(&level.path).exists() {
            warn!(
                "Boundary file for level '{}' not found at {}, hierarchy ends at {} levels",
                level.name,
                level.path.display(),
                store.level_count()
            );
            break;
        }
        let features = read_features(level)?;
        store.add_level(level.name.clone(), level.parent.clone(), features);
    }

    info!("Loaded {} regions over {} levels", store.len(), store.level_count());
    Ok(store)
}

/// A property as text; numbers are accepted for numeric codes.
fn property(feature: &Feature, field: &str) -> Option<String> {
    match feature.property(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn polygons(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geometry: Geometry<f64> = feature.geometry.clone()?.try_into().ok()?;
    let multi = collect_polygons(geometry);
    (!multi.0.is_empty()).then_some(multi)
}

fn collect_polygons(geometry: Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
        Geometry::MultiPolygon(multi) => multi,
        Geometry::GeometryCollection(collection) => MultiPolygon(
            collection
                .into_iter()
                .flat_map(|g| collect_polygons(g).0)
                .collect(),
        ),
        _ => MultiPolygon(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn level(path: PathBuf, parent: Option<ParentLink>) -> LevelConfig {
        LevelConfig {
            name: "itl1".to_string(),
            path,
            name_field: "ITL125NM".to_string(),
            code_field: Some("ITL125CD".to_string()),
            parent,
        }
    }

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ITL125NM": "North East", "ITL125CD": "TLC", "CTRY": "E92000001" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] }
            },
            {
                "type": "Feature",
                "properties": { "ITL125NM": "Islands", "ITL125CD": 42 },
                "geometry": { "type": "MultiPolygon", "coordinates": [
                    [[[2,0],[3,0],[3,1],[2,1],[2,0]]],
                    [[[4,0],[5,0],[5,1],[4,1],[4,0]]]
                ] }
            },
            {
                "type": "Feature",
                "properties": { "ITL125NM": "Point" },
                "geometry": { "type": "Point", "coordinates": [0, 0] }
            },
            {
                "type": "Feature",
                "properties": { "other": "no name" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] }
            }
        ]
    }"#;

    #[test]
    fn test_read_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itl1.geojson");
        fs::write(&path, COLLECTION).unwrap();

        let features = read_features(&level(path, Some(ParentLink::Attribute { field: "CTRY".to_string() }))).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "North East");
        assert_eq!(features[0].code.as_deref(), Some("TLC"));
        assert_eq!(features[0].parent_code.as_deref(), Some("E92000001"));
        assert_eq!(features[1].code.as_deref(), Some("42"));
        assert_eq!(features[1].geometry.0.len(), 2);
        assert_eq!(features[1].parent_code, None);
    }

    #[test]
    fn test_not_a_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("point.geojson");
        fs::write(&path, r#"{ "type": "Point", "coordinates": [0, 0] }"#).unwrap();

        let err = read_features(&level(path, None)).unwrap_err();
        assert!(matches!(err, DatasetError::NotFeatureCollection(_)));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        fs::write(&path, "{ not json").unwrap();

        let err = read_features(&level(path, None)).unwrap_err();
        assert!(matches!(err, DatasetError::GeoJson { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_features(&level(PathBuf::from("/nonexistent/itl1.geojson"), None)).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
