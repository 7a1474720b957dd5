//! Bounded Voronoi splitting of a contested region with no finer subdivision.
//!
//! The Voronoi diagram is read off the Delaunay triangulation of the team
//! points: the cell of a point is the polygon joining the circumcenters of
//! the triangles around it. Four synthetic corner points far outside the
//! region keep every team point off the convex hull, so every team cell is
//! bounded. Cells are clipped to the region and merged per league.

use std::collections::BTreeMap;

use delaunator::{triangulate, Triangulation, EMPTY};
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use hashbrown::HashSet;
use tracing::{debug, warn};

use super::ops;
use crate::models::Team;

/// Corner points sit this many times the larger box dimension outside the box.
const PADDING_FACTOR: f64 = 2.0;

/// Merged cells of one league
#[derive(Debug, Clone)]
pub struct LeagueCells {
    pub league: String,
    pub geometry: MultiPolygon<f64>,
    pub cell_count: usize,
}

/// Result of one bounded split. Empty `cells` means the caller must fall back.
#[derive(Debug, Clone, Default)]
pub struct VoronoiSplit {
    /// One entry per league, ordered by league name
    pub cells: Vec<LeagueCells>,
    /// Cells dropped because a geometry operation failed
    pub skipped: usize,
}

impl VoronoiSplit {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Split `boundary` among `teams` by nearest team, merged per league.
///
/// Teams sharing a location collapse onto the first of them in input order.
/// Fewer than two distinct locations yield an empty split.
pub fn bounded_voronoi(teams: &[&Team], boundary: &MultiPolygon<f64>) -> VoronoiSplit {
    let mut split = VoronoiSplit::default();

    let sites = distinct_sites(teams);
    if sites.len() < 2 {
        return split;
    }
    let Some(rect) = boundary.bounding_rect() else {
        return split;
    };

    // Box around the region and the sites, so sites outside the polygon stay interior too
    let (mut min_x, mut min_y) = (rect.min().x, rect.min().y);
    let (mut max_x, mut max_y) = (rect.max().x, rect.max().y);
    for site in &sites {
        min_x = min_x.min(site.longitude);
        min_y = min_y.min(site.latitude);
        max_x = max_x.max(site.longitude);
        max_y = max_y.max(site.latitude);
    }
    let padding = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON) * PADDING_FACTOR;

    let mut points: Vec<delaunator::Point> = sites
        .iter()
        .map(|t| delaunator::Point {
            x: t.longitude,
            y: t.latitude,
        })
        .collect();
    points.extend([
        delaunator::Point { x: min_x - padding, y: min_y - padding },
        delaunator::Point { x: max_x + padding, y: min_y - padding },
        delaunator::Point { x: max_x + padding, y: max_y + padding },
        delaunator::Point { x: min_x - padding, y: max_y + padding },
    ]);

    let triangulation = triangulate(&points);
    if triangulation.triangles.is_empty() {
        debug!("Degenerate triangulation over {} sites", sites.len());
        return split;
    }

    let on_hull: HashSet<usize> = triangulation.hull.iter().copied().collect();
    let incoming = incoming_edges(&triangulation, points.len());
    let mut by_league: BTreeMap<&str, Vec<MultiPolygon<f64>>> = BTreeMap::new();

    for (i, site) in sites.iter().enumerate() {
        if on_hull.contains(&i) {
            // unbounded; the corner padding should make this unreachable
            debug!("Site '{}' is on the hull, skipping its cell", site.name);
            continue;
        }
        let Some(cell) = cell_polygon(&triangulation, &points, incoming[i]) else {
            continue;
        };

        match ops::intersection(&MultiPolygon(vec![cell]), boundary) {
            Ok(clipped) if ops::has_area(&clipped) => {
                by_league.entry(site.league.as_str()).or_default().push(clipped);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping Voronoi cell of '{}': {}", site.name, e);
                split.skipped += 1;
            }
        }
    }

    for (league, cells) in by_league {
        let (geometry, skipped) = ops::union_all(&cells);
        split.skipped += skipped;
        if ops::has_area(&geometry) {
            split.cells.push(LeagueCells {
                league: league.to_string(),
                geometry,
                cell_count: cells.len(),
            });
        }
    }

    split
}

/// Drop teams whose exact location was already taken by an earlier team.
fn distinct_sites<'t>(teams: &[&'t Team]) -> Vec<&'t Team> {
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    teams
        .iter()
        .copied()
        .filter(|t| t.longitude.is_finite() && t.latitude.is_finite())
        .filter(|t| seen.insert((t.longitude.to_bits(), t.latitude.to_bits())))
        .collect()
}

fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// For every point, one halfedge ending at it (the hull edge when there is one).
fn incoming_edges(triangulation: &Triangulation, point_count: usize) -> Vec<usize> {
    let mut incoming = vec![EMPTY; point_count];
    for e in 0..triangulation.triangles.len() {
        let endpoint = triangulation.triangles[next_halfedge(e)];
        if incoming[endpoint] == EMPTY || triangulation.halfedges[e] == EMPTY {
            incoming[endpoint] = e;
        }
    }
    incoming
}

/// Walk the triangles around a point and join their circumcenters.
///
/// `None` when the point was dropped by the triangulation, touches the hull,
/// or yields fewer than three distinct vertices.
fn cell_polygon(
    triangulation: &Triangulation,
    points: &[delaunator::Point],
    start: usize,
) -> Option<Polygon<f64>> {
    if start == EMPTY {
        return None;
    }

    let mut vertices: Vec<Coord<f64>> = Vec::new();
    let mut incoming = start;
    loop {
        let triangle = incoming - incoming % 3;
        vertices.push(circumcenter(
            &points[triangulation.triangles[triangle]],
            &points[triangulation.triangles[triangle + 1]],
            &points[triangulation.triangles[triangle + 2]],
        )?);

        let outgoing = next_halfedge(incoming);
        incoming = triangulation.halfedges[outgoing];
        if incoming == EMPTY {
            return None;
        }
        if incoming == start {
            break;
        }
    }

    vertices.dedup();
    if vertices.len() < 3 {
        return None;
    }
    Some(Polygon::new(LineString::new(vertices), vec![]))
}

fn circumcenter(a: &delaunator::Point, b: &delaunator::Point, c: &delaunator::Point) -> Option<Coord<f64>> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d == 0.0 {
        return None;
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;

    Some(Coord {
        x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::fixtures::{square, team};
    use geo::{Area, Intersects, Point};

    fn league_of<'a>(split: &'a VoronoiSplit, point: Point<f64>) -> Vec<&'a str> {
        split
            .cells
            .iter()
            .filter(|c| c.geometry.intersects(&point))
            .map(|c| c.league.as_str())
            .collect()
    }

    #[test]
    fn test_fewer_than_two_sites_is_empty() {
        let boundary = square(0.0, 0.0, 2.0, 2.0);
        let only = team(0, "Red", 1.0, 1.0);
        let twin = team(1, "Blue", 1.0, 1.0);

        assert!(bounded_voronoi(&[], &boundary).is_empty());
        assert!(bounded_voronoi(&[&only], &boundary).is_empty());
        assert!(bounded_voronoi(&[&only, &twin], &boundary).is_empty());
    }

    #[test]
    fn test_two_leagues_split_along_bisector() {
        let boundary = square(0.0, 0.0, 4.0, 2.0);
        let red = team(0, "Red", 1.0, 1.0);
        let blue = team(1, "Blue", 3.0, 1.0);

        let split = bounded_voronoi(&[&red, &blue], &boundary);
        assert_eq!(split.cells.len(), 2);
        assert_eq!(split.skipped, 0);

        // ordered by league name
        assert_eq!(split.cells[0].league, "Blue");
        assert_eq!(split.cells[1].league, "Red");
        assert!((split.cells[0].geometry.unsigned_area() - 4.0).abs() < 1e-6);
        assert!((split.cells[1].geometry.unsigned_area() - 4.0).abs() < 1e-6);

        assert_eq!(league_of(&split, Point::new(0.5, 0.5)), vec!["Red"]);
        assert_eq!(league_of(&split, Point::new(3.5, 1.5)), vec!["Blue"]);
    }

    #[test]
    fn test_same_league_cells_are_merged() {
        let boundary = square(0.0, 0.0, 6.0, 2.0);
        let red_west = team(0, "Red", 1.0, 1.0);
        let blue = team(1, "Blue", 3.0, 1.0);
        let red_east = team(2, "Red", 5.0, 1.0);

        let split = bounded_voronoi(&[&red_west, &blue, &red_east], &boundary);
        let red = split.cells.iter().find(|c| c.league == "Red").unwrap();
        let blue_cells = split.cells.iter().find(|c| c.league == "Blue").unwrap();

        assert_eq!(red.cell_count, 2);
        assert_eq!(red.geometry.0.len(), 2);
        assert!((red.geometry.unsigned_area() - 8.0).abs() < 1e-6);
        assert!((blue_cells.geometry.unsigned_area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_points_go_to_nearest_team() {
        let boundary = square(0.0, 0.0, 10.0, 10.0);
        let teams = [
            team(0, "Red", 2.0, 2.0),
            team(1, "Blue", 8.0, 3.0),
            team(2, "Green", 5.0, 8.0),
            team(3, "Red", 1.0, 9.0),
        ];
        let refs: Vec<&Team> = teams.iter().collect();
        let split = bounded_voronoi(&refs, &boundary);

        let total: f64 = split.cells.iter().map(|c| c.geometry.unsigned_area()).sum();
        assert!((total - 100.0).abs() < 1e-6);

        for (x, y) in [(0.5, 0.5), (9.5, 0.5), (5.0, 9.5), (0.5, 9.5), (6.0, 4.0)] {
            let probe = Point::new(x, y);
            let nearest = teams
                .iter()
                .min_by(|a, b| {
                    let da = (a.point() - probe).x().hypot((a.point() - probe).y());
                    let db = (b.point() - probe).x().hypot((b.point() - probe).y());
                    da.total_cmp(&db)
                })
                .unwrap();
            assert_eq!(league_of(&split, probe), vec![nearest.league.as_str()]);
        }
    }

    #[test]
    fn test_site_outside_boundary_still_bounded() {
        let boundary = square(0.0, 0.0, 2.0, 2.0);
        let inside = team(0, "Red", 0.5, 1.0);
        let outside = team(1, "Blue", 5.0, 1.0);

        let split = bounded_voronoi(&[&inside, &outside], &boundary);
        let total: f64 = split.cells.iter().map(|c| c.geometry.unsigned_area()).sum();
        assert!((total - 4.0).abs() < 1e-6);
        assert_eq!(league_of(&split, Point::new(1.9, 1.0)), vec!["Red"]);
    }
}
