use geo::{Geometry, MultiPolygon};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::union::{BooleanOpsUnion, PolygonUnion, collapse_to_multipolygon};
use crate::domain::{Isochrone, MergedBandPolygon};

/// Merges per-source isochrones into one multipolygon per band value.
///
/// Within a band the union is a left-to-right pairwise fold. A failing step
/// drops its right-hand operand and the fold carries on with the previous
/// result. Bands are independent and are merged in parallel.
#[derive(Debug, Clone, Default)]
pub struct BandMerger<U = BooleanOpsUnion> {
    union: U,
}

impl BandMerger<BooleanOpsUnion> {
    pub fn new() -> Self {
        Self::with_union(BooleanOpsUnion)
    }
}

impl<U: PolygonUnion> BandMerger<U> {
    pub fn with_union(union: U) -> Self {
        Self { union }
    }

    /// Group `isochrones` by exact band value and merge each group.
    ///
    /// Results are ordered by ascending band value. Bands where nothing could
    /// be merged are left out; non-finite band values are ignored.
    pub fn merge(&self, isochrones: Vec<Isochrone>) -> Vec<MergedBandPolygon> {
        group_by_band(isochrones)
            .into_par_iter()
            .filter_map(|(value, members)| self.merge_band(value, members))
            .collect()
    }

    /// Fold one band's geometries into a single multipolygon tagged `value`
    pub fn merge_band(&self, value: f64, members: Vec<Geometry<f64>>) -> Option<MergedBandPolygon> {
        let total = members.len();
        let mut accumulated: Option<MultiPolygon<f64>> = None;
        let mut merged = 0;
        let mut skipped = 0;

        for (i, geometry) in members.into_iter().enumerate() {
            let shape = collapse_to_multipolygon(geometry);
            if shape.0.is_empty() {
                warn!(
                    "Band {}: feature {} of {} has no polygonal geometry, skipping",
                    value,
                    i + 1,
                    total
                );
                skipped += 1;
                continue;
            }

            accumulated = match accumulated {
                None => {
                    merged += 1;
                    Some(shape)
                }
                Some(current) => {
                    debug!("Band {}: merging feature {} of {}", value, i + 1, total);
                    match self.union.union(&current, &shape) {
                        Ok(result) => {
                            let result = collapse_to_multipolygon(result);
                            if result.0.is_empty() {
                                warn!(
                                    "Band {}: union with feature {} of {} came back empty, skipping",
                                    value,
                                    i + 1,
                                    total
                                );
                                skipped += 1;
                                Some(current)
                            } else {
                                merged += 1;
                                Some(result)
                            }
                        }
                        Err(e) => {
                            warn!(
                                "Band {}: union error, skipping feature {} of {}: {}",
                                value,
                                i + 1,
                                total,
                                e
                            );
                            skipped += 1;
                            Some(current)
                        }
                    }
                }
            };
        }

        info!(
            "Band {}: merged {} of {} features ({} skipped)",
            value, merged, total, skipped
        );

        accumulated.map(|geometry| MergedBandPolygon {
            value,
            geometry,
            merged,
            skipped,
        })
    }
}

/// Group by exact band value, keeping input order inside each group
fn group_by_band(isochrones: Vec<Isochrone>) -> Vec<(f64, Vec<Geometry<f64>>)> {
    let mut groups: Vec<(f64, Vec<Geometry<f64>>)> = Vec::new();

    for isochrone in isochrones {
        if !isochrone.value.is_finite() {
            warn!("Ignoring isochrone with band value {}", isochrone.value);
            continue;
        }
        match groups.iter_mut().find(|(value, _)| *value == isochrone.value) {
            Some((_, members)) => members.push(isochrone.geometry),
            None => groups.push((isochrone.value, vec![isochrone.geometry])),
        }
    }

    groups.sort_by(|a, b| a.0.total_cmp(&b.0));
    groups
}

/// Keep only isochrones whose value is one of `bands`
pub fn retain_bands(isochrones: Vec<Isochrone>, bands: &[f64]) -> Vec<Isochrone> {
    isochrones
        .into_iter()
        .filter(|iso| bands.contains(&iso.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, PipelineError};
    use geo::{Area, GeometryCollection, LineString, Polygon, Rect, coord};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Rect::new(coord! { x: x, y: y }, coord! { x: x + size, y: y + size }).to_polygon()
    }

    fn area_of(bands: &[MergedBandPolygon], value: f64) -> f64 {
        bands
            .iter()
            .find(|b| b.value == value)
            .map(|b| b.geometry.unsigned_area())
            .unwrap_or(0.0)
    }

    /// Fails whenever the right-hand operand is the poisoned square
    struct FailOn(Polygon<f64>);

    impl PolygonUnion for FailOn {
        fn union(
            &self,
            a: &MultiPolygon<f64>,
            b: &MultiPolygon<f64>,
        ) -> Result<Geometry<f64>, GeometryError> {
            if b.0.first() == Some(&self.0) {
                return Err(PipelineError::degenerate("engineered failure"));
            }
            BooleanOpsUnion.union(a, b)
        }
    }

    /// Returns line remnants alongside the real union
    struct Noisy;

    impl PolygonUnion for Noisy {
        fn union(
            &self,
            a: &MultiPolygon<f64>,
            b: &MultiPolygon<f64>,
        ) -> Result<Geometry<f64>, GeometryError> {
            let real = BooleanOpsUnion.union(a, b)?;
            Ok(Geometry::GeometryCollection(GeometryCollection(vec![
                real,
                Geometry::LineString(LineString::from(vec![(0.0, 0.0), (9.0, 9.0)])),
            ])))
        }
    }

    #[test]
    fn test_single_member_is_unchanged() {
        let a = square(0.0, 0.0, 1.0);
        let merged = BandMerger::new().merge(vec![Isochrone::new(900.0, a.clone())]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, 900.0);
        assert_eq!(merged[0].geometry, MultiPolygon::new(vec![a]));
        assert_eq!(merged[0].merged, 1);
    }

    #[test]
    fn test_groups_by_exact_value_in_ascending_order() {
        let merged = BandMerger::new().merge(vec![
            Isochrone::new(1800.0, square(0.0, 0.0, 2.0)),
            Isochrone::new(900.0, square(0.0, 0.0, 1.0)),
            Isochrone::new(1800.0, square(1.0, 1.0, 2.0)),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].value, 900.0);
        assert_eq!(merged[1].value, 1800.0);
        assert!((area_of(&merged, 1800.0) - 7.0).abs() < 1e-9);
        assert_eq!(merged[1].merged, 2);
    }

    #[test]
    fn test_order_does_not_change_area() {
        let a = square(0.0, 0.0, 3.0);
        let b = square(2.0, 1.0, 3.0);
        let c = square(4.0, 3.0, 2.5);
        let merger = BandMerger::new();

        let orders = [
            vec![a.clone(), b.clone(), c.clone()],
            vec![c.clone(), a.clone(), b.clone()],
            vec![b.clone(), c.clone(), a.clone()],
        ];
        let areas: Vec<f64> = orders
            .iter()
            .map(|order| {
                let input = order.iter().cloned().map(|p| Isochrone::new(60.0, p)).collect();
                area_of(&merger.merge(input), 60.0)
            })
            .collect();

        for area in &areas {
            assert!((area - areas[0]).abs() / areas[0] < 0.001);
        }
    }

    #[test]
    fn test_failed_step_is_skipped() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 0.0, 2.0);
        let c = square(0.0, 5.0, 2.0);

        let merger = BandMerger::with_union(FailOn(b.clone()));
        let merged = merger.merge(vec![
            Isochrone::new(2700.0, a.clone()),
            Isochrone::new(2700.0, b),
            Isochrone::new(2700.0, c.clone()),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].merged, 2);
        assert_eq!(merged[0].skipped, 1);

        let expected = collapse_to_multipolygon(
            BooleanOpsUnion
                .union(&MultiPolygon::new(vec![a]), &MultiPolygon::new(vec![c]))
                .unwrap(),
        );
        assert!((merged[0].geometry.unsigned_area() - expected.unsigned_area()).abs() < 1e-9);
        assert!((merged[0].geometry.unsigned_area() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_collection_remnants_discarded() {
        let merger = BandMerger::with_union(Noisy);
        let merged = merger.merge(vec![
            Isochrone::new(900.0, square(0.0, 0.0, 1.0)),
            Isochrone::new(900.0, square(3.0, 3.0, 1.0)),
        ]);

        assert_eq!(merged[0].geometry.0.len(), 2);
        assert!((merged[0].geometry.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_without_polygons_is_omitted() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        let merged = BandMerger::new().merge(vec![
            Isochrone::new(900.0, line),
            Isochrone::new(1800.0, square(0.0, 0.0, 1.0)),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, 1800.0);
    }

    #[test]
    fn test_retain_bands() {
        let kept = retain_bands(
            vec![
                Isochrone::new(900.0, square(0.0, 0.0, 1.0)),
                Isochrone::new(1000.0, square(0.0, 0.0, 1.0)),
            ],
            &[900.0, 1800.0],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, 900.0);
    }
}
