use geo::{LineString, Polygon};
use log::debug;

use super::filter::is_degenerate_ring;
use crate::geometry::point_in_ring;

/// Shoelace signed area. Rings traced with the inside on their right come out
/// positive for outer boundaries and negative for holes.
fn signed_area(ring: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// Group traced rings into polygons, attaching each hole to the smallest
/// outer ring that contains it. Degenerate rings are dropped first.
pub(crate) fn assemble_polygons(rings: Vec<Vec<(f64, f64)>>) -> Vec<Polygon<f64>> {
    let mut outers: Vec<(f64, Vec<(f64, f64)>, Vec<LineString<f64>>)> = Vec::new();
    let mut holes: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut dropped = 0;

    for ring in rings {
        if is_degenerate_ring(&LineString::from(ring.clone())) {
            dropped += 1;
            continue;
        }
        let area = signed_area(&ring);
        if area > 0.0 {
            outers.push((area, ring, Vec::new()));
        } else if area < 0.0 {
            holes.push(ring);
        } else {
            dropped += 1;
        }
    }

    for hole in holes {
        let anchor = hole[0];
        let owner = outers
            .iter_mut()
            .filter(|(_, outer, _)| point_in_ring(anchor, outer))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        match owner {
            Some((_, _, interiors)) => interiors.push(LineString::from(hole)),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} degenerate contour rings", dropped);
    }

    outers
        .into_iter()
        .map(|(_, outer, interiors)| Polygon::new(LineString::from(outer), interiors))
        .collect()
}
