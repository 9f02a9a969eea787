use geo::{LineString, MultiPolygon, Polygon, Simplify};

/// Minimum vertex count of a closed ring (three corners plus the closing vertex)
const MIN_RING_VERTICES: usize = 4;

/// Ramer-Douglas-Peucker simplification of a closed ring.
///
/// Falls back to the input when simplification would collapse the ring.
pub fn simplify_ring(ring: &LineString<f64>, epsilon: f64) -> LineString<f64> {
    if epsilon <= 0.0 || ring.0.len() <= MIN_RING_VERTICES {
        return ring.clone();
    }

    let simplified = ring.simplify(&epsilon);

    if simplified.0.len() < MIN_RING_VERTICES {
        return ring.clone();
    }

    simplified
}

/// Simplify every ring of a multipolygon, exterior and interiors alike
pub fn simplify_multipolygon(shape: &MultiPolygon<f64>, epsilon: f64) -> MultiPolygon<f64> {
    if epsilon <= 0.0 {
        return shape.clone();
    }

    shape
        .iter()
        .map(|polygon| {
            Polygon::new(
                simplify_ring(polygon.exterior(), epsilon),
                polygon
                    .interiors()
                    .iter()
                    .map(|hole| simplify_ring(hole, epsilon))
                    .collect(),
            )
        })
        .collect()
}
