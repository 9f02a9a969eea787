use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use serde_json::{Map, Value};

use crate::contour::ContourPolygon;
use crate::domain::MergedBandPolygon;
use crate::feed::{Feature, FeatureCollection, GeometryJson};
use crate::geometry::simplify_multipolygon;

fn value_properties(value: f64) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("value".to_string(), Value::from(value));
    properties
}

/// One Polygon feature per contour, `value` = its threshold
pub fn contour_features(contours: &[ContourPolygon], simplify_tolerance: f64) -> FeatureCollection {
    FeatureCollection::new(
        contours
            .iter()
            .map(|contour| {
                let shape =
                    simplify_multipolygon(&MultiPolygon::new(vec![contour.polygon.clone()]), simplify_tolerance);
                let geometry = match shape.0.as_slice() {
                    [polygon] => GeometryJson::from(polygon),
                    _ => GeometryJson::from(&shape),
                };
                Feature::new(geometry, value_properties(contour.threshold))
            })
            .collect(),
    )
}

/// One MultiPolygon feature per merged band, `value` = canonical band value
pub fn merged_features(bands: &[MergedBandPolygon], simplify_tolerance: f64) -> FeatureCollection {
    FeatureCollection::new(
        bands
            .iter()
            .map(|band| {
                let shape = simplify_multipolygon(&band.geometry, simplify_tolerance);
                Feature::new(GeometryJson::from(&shape), value_properties(band.value))
            })
            .collect(),
    )
}

/// Write a FeatureCollection as pretty-printed GeoJSON
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, collection)
        .with_context(|| format!("Failed to serialize GeoJSON: {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse_isochrones;
    use geo::{LineString, Polygon};
    use std::fs;
    use tempfile::tempdir;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )
    }

    #[test]
    fn test_contour_features() {
        let contours = vec![ContourPolygon {
            threshold: 15.0,
            polygon: unit_square(),
        }];
        let fc = contour_features(&contours, 0.0);

        assert_eq!(fc.features.len(), 1);
        assert_eq!(fc.features[0].property_f64("value"), Some(15.0));
        assert!(matches!(
            fc.features[0].geometry,
            Some(GeometryJson::Polygon { .. })
        ));
    }

    #[test]
    fn test_write_merged_bands() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.geojson");
        let bands = vec![MergedBandPolygon {
            value: 1800.0,
            geometry: MultiPolygon::new(vec![unit_square()]),
            merged: 3,
            skipped: 0,
        }];

        write_feature_collection(&path, &merged_features(&bands, 0.0)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let isochrones = parse_isochrones(&text).unwrap();
        assert_eq!(isochrones.len(), 1);
        assert_eq!(isochrones[0].value, 1800.0);
    }
}
