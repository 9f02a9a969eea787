use std::collections::HashSet;

use geo::LineString;

/// Closed rings below this vertex count are dropped
pub const MIN_CONTOUR_VERTICES: usize = 4;

/// Vertices are compared at this many decimal places when counting distinct points
const DISTINCT_SCALE: f64 = 1e6;

/// Data-quality filter shared by every contour consumer.
///
/// A ring is degenerate when it has fewer than [`MIN_CONTOUR_VERTICES`]
/// vertices, or when fewer than half of its vertices are distinct (a loop
/// folding back over itself).
pub fn is_degenerate_ring(ring: &LineString<f64>) -> bool {
    let count = ring.0.len();
    if count < MIN_CONTOUR_VERTICES {
        return true;
    }

    let distinct: HashSet<(i64, i64)> = ring
        .0
        .iter()
        .map(|c| {
            (
                (c.x * DISTINCT_SCALE).round() as i64,
                (c.y * DISTINCT_SCALE).round() as i64,
            )
        })
        .collect();

    (distinct.len() as f64) < count as f64 / 2.0
}
