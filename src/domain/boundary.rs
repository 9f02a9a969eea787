use crate::geometry::{GeoBounds, point_in_polygon};

/// Region boundary as rings of (lon, lat) vertices.
///
/// Rings may be open or closed. Containment follows even-odd fill across all
/// rings, see [`point_in_polygon`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPolygon {
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl BoundaryPolygon {
    pub fn new(rings: Vec<Vec<(f64, f64)>>) -> Self {
        Self { rings }
    }

    /// Test a (lon, lat) point
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        point_in_polygon((lon, lat), &self.rings)
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_rings(&self.rings)
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(|ring| ring.len() < 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_contains() {
        let boundary = BoundaryPolygon::new(vec![vec![
            (-124.5, 42.0),
            (-124.5, 46.3),
            (-116.9, 46.3),
            (-116.9, 42.0),
        ]]);

        assert!(boundary.contains(-120.5, 44.0));
        assert!(!boundary.contains(-126.0, 44.0));
        assert!(!boundary.is_empty());
    }

    #[test]
    fn test_empty_boundary() {
        let boundary = BoundaryPolygon::default();
        assert!(boundary.is_empty());
        assert!(boundary.bounds().is_none());
        assert!(!boundary.contains(0.0, 0.0));
    }
}
