//! Small synthetic datasets shared by unit tests.

use geo::{Coord, MultiPolygon, Rect};

use super::{Hierarchy, ParentLink, RegionFeature, RegionStore};
use crate::models::{Team, TeamId, Tier};

pub fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
    let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
    MultiPolygon(vec![rect.to_polygon()])
}

pub fn square_feature(
    name: &str,
    code: &str,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
) -> RegionFeature {
    RegionFeature {
        name: name.to_string(),
        code: Some(code.to_string()),
        parent_code: None,
        geometry: square(min_x, min_y, max_x, max_y),
    }
}

pub fn team(id: u32, league: &str, lon: f64, lat: f64) -> Team {
    Team::new(
        TeamId(id),
        format!("Team {}", id),
        league,
        Tier::new(5, "Regional 1"),
        lat,
        lon,
    )
}

/// Country "P" (0..4 x 0..2) split into "P1" = X (0..2) and "P2" = Y (2..4);
/// X is split again into "P11" (0..1) and "P12" (1..2). Y has no children.
pub fn nested_world() -> (RegionStore, Hierarchy) {
    let mut store = RegionStore::new();
    store.add_level("country", None, vec![square_feature("P", "P", 0.0, 0.0, 4.0, 2.0)]);
    store.add_level(
        "itl1",
        Some(ParentLink::Prefix { length: 1 }),
        vec![
            square_feature("X", "P1", 0.0, 0.0, 2.0, 2.0),
            square_feature("Y", "P2", 2.0, 0.0, 4.0, 2.0),
        ],
    );
    store.add_level(
        "itl2",
        Some(ParentLink::Prefix { length: 2 }),
        vec![
            square_feature("X west", "P11", 0.0, 0.0, 1.0, 2.0),
            square_feature("X east", "P12", 1.0, 0.0, 2.0, 2.0),
        ],
    );
    let hierarchy = Hierarchy::build(&store);
    (store, hierarchy)
}
