//! Region boundaries with precomputed containment data.

use geo::{BoundingRect, Centroid, InteriorPoint, Intersects, MultiPolygon, Point, Rect};

use crate::models::{LevelId, RegionArea, RegionId};

/// A single region polygon with metadata
#[derive(Debug, Clone)]
pub struct Region {
    pub area: RegionArea,
    pub geometry: MultiPolygon<f64>,
    pub centroid: Point<f64>,
    bbox: Rect<f64>,
    /// Bounding rectangle of each polygon part, aligned with `geometry.0`
    part_rects: Vec<Option<Rect<f64>>>,
}

impl Region {
    /// Precompute the containment data. Returns `None` for empty geometry.
    pub fn new(area: RegionArea, geometry: MultiPolygon<f64>) -> Option<Self> {
        let bbox = geometry.bounding_rect()?;
        let centroid = geometry.centroid()?;
        let part_rects = geometry.0.iter().map(|p| p.bounding_rect()).collect();

        Some(Self {
            area,
            geometry,
            centroid,
            bbox,
            part_rects,
        })
    }

    pub fn id(&self) -> RegionId {
        self.area.id
    }

    pub fn level(&self) -> LevelId {
        self.area.level
    }

    pub fn name(&self) -> &str {
        &self.area.name
    }

    /// Get the bounding box of this region
    pub fn bbox(&self) -> Rect<f64> {
        self.bbox
    }

    /// Test whether the closed region covers a point.
    ///
    /// Parts whose bounding rectangle misses the point are rejected before
    /// the exact polygon test, so points far from the region cost a couple
    /// of comparisons.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        if !rect_covers(&self.bbox, point) {
            return false;
        }

        self.geometry
            .0
            .iter()
            .zip(&self.part_rects)
            .any(|(polygon, rect)| {
                rect.is_some_and(|r| rect_covers(&r, point)) && polygon.intersects(point)
            })
    }

    /// A point guaranteed to lie inside the region, for concave shapes whose
    /// centroid falls outside.
    pub fn interior_point(&self) -> Option<Point<f64>> {
        self.geometry.interior_point()
    }
}

fn rect_covers(rect: &Rect<f64>, point: &Point<f64>) -> bool {
    point.x() >= rect.min().x
        && point.x() <= rect.max().x
        && point.y() >= rect.min().y
        && point.y() <= rect.max().y
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString, Polygon};

    fn area(name: &str) -> RegionArea {
        RegionArea {
            id: RegionId(0),
            level: LevelId::ROOT,
            name: name.to_string(),
            code: None,
            parent_code: None,
        }
    }

    /// U-shaped region whose centroid lies in the notch
    fn u_shape() -> MultiPolygon<f64> {
        let ring: Vec<Coord<f64>> = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 3.0, y: 0.0 },
            Coord { x: 3.0, y: 3.0 },
            Coord { x: 2.0, y: 3.0 },
            Coord { x: 2.0, y: 1.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 3.0 },
            Coord { x: 0.0, y: 3.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        MultiPolygon(vec![Polygon::new(LineString::new(ring), vec![])])
    }

    #[test]
    fn test_contains_point() {
        let region = Region::new(area("u"), u_shape()).unwrap();
        assert!(region.contains_point(&Point::new(0.5, 2.5)));
        assert!(region.contains_point(&Point::new(2.5, 0.5)));
        // inside the bbox but in the notch
        assert!(!region.contains_point(&Point::new(1.5, 2.5)));
        // outside the bbox
        assert!(!region.contains_point(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_boundary_point_is_covered() {
        let region = Region::new(area("u"), u_shape()).unwrap();
        assert!(region.contains_point(&Point::new(0.0, 1.5)));
    }

    #[test]
    fn test_interior_point_for_concave_region() {
        let region = Region::new(area("u"), u_shape()).unwrap();
        assert!(!region.contains_point(&region.centroid));
        let inner = region.interior_point().unwrap();
        assert!(region.contains_point(&inner));
    }

    #[test]
    fn test_empty_geometry_rejected() {
        assert!(Region::new(area("empty"), MultiPolygon(vec![])).is_none());
    }
}
