use std::path::Path;

use anyhow::{Context, Result, bail};
use geo::Geometry;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{GeoJson, GeometryJson, Position};
use crate::domain::{BoundaryPolygon, Facility, FacilityKind, Isochrone, validate_facilities};

/// Facility record as exported from the facility spreadsheet
#[derive(Debug, Deserialize)]
struct FacilityRecord {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    /// [lat, lon]
    position: [f64; 2],
    #[serde(rename = "willBeRemoved", default)]
    will_be_removed: bool,
}

impl From<FacilityRecord> for Facility {
    fn from(record: FacilityRecord) -> Self {
        Facility {
            name: record.name,
            position: (record.position[0], record.position[1]),
            kind: FacilityKind::from_tag(record.kind.as_deref().unwrap_or("hospital")),
            will_be_removed: record.will_be_removed,
        }
    }
}

/// Parse a facility list.
///
/// Accepts either a JSON array of `{name, type, position: [lat, lon],
/// willBeRemoved}` records or a GeoJSON collection of Point features with
/// `name`/`type`/`willBeRemoved` properties. The result is validated
/// (non-empty, unique names, finite positions).
pub fn parse_facilities(text: &str) -> Result<Vec<Facility>> {
    let value: Value = serde_json::from_str(text).context("Failed to parse facility JSON")?;

    let facilities: Vec<Facility> = if value.is_array() {
        let records: Vec<FacilityRecord> =
            serde_json::from_value(value).context("Invalid facility record")?;
        records.into_iter().map(Facility::from).collect()
    } else {
        GeoJson::from_value(value)?
            .into_features()
            .into_iter()
            .enumerate()
            .map(|(i, feature)| {
                let Some(GeometryJson::Point { coordinates }) = &feature.geometry else {
                    bail!("Facility feature {} is not a Point", i);
                };
                let [lon, lat, ..] = coordinates.as_slice() else {
                    bail!("Facility feature {} has a short position", i);
                };
                let name = feature
                    .property_str("name")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("facility-{}", i));
                let kind = FacilityKind::from_tag(feature.property_str("type").unwrap_or("hospital"));
                let will_be_removed = feature
                    .property("willBeRemoved")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                Ok(Facility {
                    name,
                    position: (*lat, *lon),
                    kind,
                    will_be_removed,
                })
            })
            .collect::<Result<_>>()?
    };

    validate_facilities(&facilities)?;
    Ok(facilities)
}

fn ring_from_positions(ring: &[Position]) -> Result<Vec<(f64, f64)>> {
    ring.iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Ok((*lon, *lat)),
            _ => bail!("Boundary position needs [lon, lat]"),
        })
        .collect()
}

/// Parse a region boundary.
///
/// Accepts a bare ring list (`[[[lon, lat], ...], ...]`), a Polygon or
/// MultiPolygon geometry, or a Feature/FeatureCollection wrapping them. All
/// rings of all polygons are kept; containment is even-odd across them.
pub fn parse_boundary(text: &str) -> Result<BoundaryPolygon> {
    let value: Value = serde_json::from_str(text).context("Failed to parse boundary JSON")?;

    let rings = if value.is_array() {
        let rings: Vec<Vec<Position>> =
            serde_json::from_value(value).context("Boundary must be a list of rings")?;
        rings
            .iter()
            .map(|ring| ring_from_positions(ring))
            .collect::<Result<Vec<_>>>()?
    } else {
        let mut rings = Vec::new();
        for feature in GeoJson::from_value(value)?.into_features() {
            match feature.geometry {
                Some(GeometryJson::Polygon { coordinates }) => {
                    for ring in &coordinates {
                        rings.push(ring_from_positions(ring)?);
                    }
                }
                Some(GeometryJson::MultiPolygon { coordinates }) => {
                    for ring in coordinates.iter().flatten() {
                        rings.push(ring_from_positions(ring)?);
                    }
                }
                _ => warn!("Ignoring non-polygonal boundary feature"),
            }
        }
        rings
    };

    let boundary = BoundaryPolygon::new(rings);
    if boundary.is_empty() {
        bail!("Boundary has no ring with at least 3 vertices");
    }
    Ok(boundary)
}

/// Parse an isochrone feed: features with polygonal geometry and a numeric
/// `value` property (seconds). Features without a value or geometry are
/// skipped with a warning.
pub fn parse_isochrones(text: &str) -> Result<Vec<Isochrone>> {
    let value: Value = serde_json::from_str(text).context("Failed to parse isochrone feed")?;
    let features = GeoJson::from_value(value)?.into_features();
    let total = features.len();

    let mut isochrones = Vec::with_capacity(total);
    for (i, feature) in features.into_iter().enumerate() {
        let Some(band) = feature.property_f64("value") else {
            warn!("Isochrone feature {} of {} has no numeric value, skipping", i + 1, total);
            continue;
        };
        let Some(geometry) = &feature.geometry else {
            warn!("Isochrone feature {} of {} has no geometry, skipping", i + 1, total);
            continue;
        };

        let geometry = Geometry::try_from(geometry)
            .with_context(|| format!("Invalid geometry in isochrone feature {}", i + 1))?;
        let mut isochrone = Isochrone::new(band, geometry);
        if let Some(source) = feature
            .property_str("name")
            .map(str::to_string)
            .or_else(|| feature.property("group_index").map(Value::to_string))
        {
            isochrone = isochrone.with_source(source);
        }
        isochrones.push(isochrone);
    }

    Ok(isochrones)
}

fn read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))
}

pub fn load_facilities(path: &Path) -> Result<Vec<Facility>> {
    parse_facilities(&read(path, "facility")?)
        .with_context(|| format!("Invalid facility file: {}", path.display()))
}

pub fn load_boundary(path: &Path) -> Result<BoundaryPolygon> {
    parse_boundary(&read(path, "boundary")?)
        .with_context(|| format!("Invalid boundary file: {}", path.display()))
}

pub fn load_isochrones(path: &Path) -> Result<Vec<Isochrone>> {
    parse_isochrones(&read(path, "isochrone feed")?)
        .with_context(|| format!("Invalid isochrone feed: {}", path.display()))
}
