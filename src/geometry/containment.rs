/// Crossing-number test of a single ring.
///
/// The ring does not need to be closed: the last-to-first edge is always
/// walked. An edge only counts when it straddles the horizontal line through
/// `point`, so its `dy` is never zero and no slope epsilon is needed.
pub fn point_in_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let (px, py) = point;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > py) != (yj > py) {
            let x_cross = xi + (py - yi) * (xj - xi) / (yj - yi);
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Even-odd point-in-polygon over every ring of `rings`.
///
/// Each ring is tested independently and the results are XOR-ed, so a point
/// enclosed by an even number of rings is outside. Holes are therefore
/// honoured only through even-odd fill, not through ring roles.
///
/// # Arguments
/// * `point` - (lon, lat)
/// * `rings` - rings of (lon, lat) vertices
pub fn point_in_polygon(point: (f64, f64), rings: &[Vec<(f64, f64)>]) -> bool {
    rings
        .iter()
        .fold(false, |inside, ring| inside ^ point_in_ring(point, ring))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle() -> Vec<(f64, f64)> {
        vec![(-124.0, 42.0), (-117.0, 42.0), (-117.0, 46.0), (-124.0, 46.0), (-124.0, 42.0)]
    }

    #[test]
    fn test_rectangle_inside_and_outside() {
        let rings = vec![rectangle()];
        assert!(point_in_polygon((-120.0, 44.0), &rings));
        assert!(point_in_polygon((-123.9, 45.9), &rings));
        assert!(!point_in_polygon((-125.0, 44.0), &rings));
        assert!(!point_in_polygon((-120.0, 46.5), &rings));
        assert!(!point_in_polygon((-116.0, 41.0), &rings));
    }

    #[test]
    fn test_reversed_ring_gives_same_result() {
        let forward = vec![rectangle()];
        let mut reversed_ring = rectangle();
        reversed_ring.reverse();
        let reversed = vec![reversed_ring];

        for point in [(-120.0, 44.0), (-125.0, 44.0), (-117.5, 42.5), (-110.0, 50.0)] {
            assert_eq!(
                point_in_polygon(point, &forward),
                point_in_polygon(point, &reversed)
            );
        }
    }

    #[test]
    fn test_open_ring_is_implicitly_closed() {
        let open = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_ring((5.0, 5.0), &open));
        assert!(!point_in_ring((15.0, 5.0), &open));
    }

    #[test]
    fn test_vertex_level_ray_does_not_divide_by_zero() {
        // Horizontal edges at y = 0 and y = 10 are never crossed
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(!point_in_ring((-1.0, 10.0), &ring));
        assert!(point_in_ring((5.0, 0.0), &ring));
    }

    #[test]
    fn test_even_odd_across_rings() {
        let outer = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let inner = vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)];
        let rings = vec![outer, inner];

        assert!(point_in_polygon((2.0, 2.0), &rings));
        assert!(!point_in_polygon((5.0, 5.0), &rings));
    }

    #[test]
    fn test_degenerate_ring() {
        assert!(!point_in_ring((0.0, 0.0), &[(0.0, 0.0), (1.0, 1.0)]));
        assert!(!point_in_polygon((0.0, 0.0), &[]));
    }
}
