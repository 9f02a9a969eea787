use std::panic::{self, AssertUnwindSafe};

use geo::{BooleanOps, CoordsIter, Geometry, MultiPolygon};
use log::debug;

use crate::error::{GeometryError, PipelineError};

/// Pairwise polygon union, the only geometry operation the merger needs.
///
/// Implementations may return any geometry; the merger keeps only its
/// polygonal members.
pub trait PolygonUnion: Sync {
    fn union(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<Geometry<f64>, GeometryError>;
}

/// [`PolygonUnion`] backed by `geo`'s boolean operations.
///
/// The sweep-line implementation can panic on self-intersecting or otherwise
/// invalid input; such panics are caught and reported as `DegenerateGeometry`.
/// The process panic hook still runs before the catch, so callers that want
/// clean output wrap the merge in [`with_quiet_panics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanOpsUnion;

fn all_finite(shape: &MultiPolygon<f64>) -> bool {
    shape
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

impl PolygonUnion for BooleanOpsUnion {
    fn union(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<Geometry<f64>, GeometryError> {
        if !all_finite(a) || !all_finite(b) {
            return Err(PipelineError::degenerate("non-finite coordinate in union operand"));
        }

        panic::catch_unwind(AssertUnwindSafe(|| a.union(b)))
            .map(Geometry::MultiPolygon)
            .map_err(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "boolean union panicked".to_string());
                PipelineError::degenerate(reason)
            })
    }
}

/// Run `f` with the panic hook routing messages to the debug log instead of
/// stderr, then restore the previous hook.
///
/// The hook is process-wide. If `f` itself panics the previous hook is not
/// restored, since the process is unwinding anyway.
pub fn with_quiet_panics<T>(f: impl FnOnce() -> T) -> T {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| debug!("Contained panic: {}", info)));
    let result = f();
    panic::set_hook(previous);
    result
}

/// Flatten a geometry into one multipolygon, keeping polygonal members only.
///
/// Points and line remnants (for example left over from a near-degenerate
/// union) are discarded; nested collections are walked recursively.
pub fn collapse_to_multipolygon(geometry: Geometry<f64>) -> MultiPolygon<f64> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);
    MultiPolygon::new(polygons)
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<geo::Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon),
        Geometry::MultiPolygon(shape) => out.extend(shape.0),
        Geometry::Rect(rect) => out.push(rect.to_polygon()),
        Geometry::Triangle(triangle) => out.push(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for member in collection.0 {
                collect_polygons(member, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, GeometryCollection, LineString, Point, Polygon, Rect, coord};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Rect::new(coord! { x: x, y: y }, coord! { x: x + size, y: y + size }).to_polygon()
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let a = MultiPolygon::new(vec![square(0.0, 0.0, 2.0)]);
        let b = MultiPolygon::new(vec![square(1.0, 1.0, 2.0)]);

        let merged = collapse_to_multipolygon(BooleanOpsUnion.union(&a, &b).unwrap());
        assert!((merged.unsigned_area() - 7.0).abs() < 1e-9);
        assert_eq!(merged.0.len(), 1);
    }

    #[test]
    fn test_union_rejects_non_finite() {
        let a = MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]);
        let b = MultiPolygon::new(vec![square(f64::NAN, 0.0, 1.0)]);
        assert!(matches!(
            BooleanOpsUnion.union(&a, &b),
            Err(PipelineError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_collapse_geometry_collection() {
        let collection = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
            Geometry::LineString(LineString::from(vec![(0.0, 0.0), (5.0, 5.0)])),
            Geometry::Point(Point::new(3.0, 3.0)),
            Geometry::MultiPolygon(MultiPolygon::new(vec![
                square(5.0, 5.0, 1.0),
                square(8.0, 8.0, 1.0),
            ])),
        ]));

        let shape = collapse_to_multipolygon(collection);
        assert_eq!(shape.0.len(), 3);
        assert!((shape.unsigned_area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_quiet_panics_still_contained() {
        let caught = with_quiet_panics(|| panic::catch_unwind(|| -> u8 { panic!("sweep failure") }).is_err());
        assert!(caught);

        let area = with_quiet_panics(|| {
            let a = MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]);
            let b = MultiPolygon::new(vec![square(2.0, 0.0, 1.0)]);
            collapse_to_multipolygon(BooleanOpsUnion.union(&a, &b).unwrap()).unsigned_area()
        });
        assert!((area - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_collapse_non_polygonal_is_empty() {
        let shape = collapse_to_multipolygon(Geometry::Point(Point::new(1.0, 1.0)));
        assert!(shape.0.is_empty());
    }
}
