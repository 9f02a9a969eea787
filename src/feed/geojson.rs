//! Minimal GeoJSON wire types (RFC 7946 subset used by the feeds and outputs)

use anyhow::{Context, Result, bail};
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PipelineError;

/// A GeoJSON position: [x, y] with optional extra ordinates
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryJson {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeometryJson>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Option<GeometryJson>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// Any top-level GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    FeatureCollection(FeatureCollection),
    Feature(Feature),
    Geometry(GeometryJson),
}

impl GeoJson {
    /// Dispatch on the `type` member of an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("GeoJSON object has no \"type\" member")?;

        Ok(match kind.as_str() {
            "FeatureCollection" => GeoJson::FeatureCollection(
                serde_json::from_value(value).context("Invalid FeatureCollection")?,
            ),
            "Feature" => {
                GeoJson::Feature(serde_json::from_value(value).context("Invalid Feature")?)
            }
            _ => GeoJson::Geometry(
                serde_json::from_value(value)
                    .with_context(|| format!("Invalid or unsupported geometry type {}", kind))?,
            ),
        })
    }

    /// Every feature, wrapping a bare geometry as a property-less feature
    pub fn into_features(self) -> Vec<Feature> {
        match self {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![Feature {
                geometry: Some(geometry),
                properties: None,
            }],
        }
    }
}

impl Feature {
    pub fn new(geometry: GeometryJson, properties: Map<String, Value>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: Some(properties),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key)?.as_f64()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key)?.as_str()
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

fn coord(position: &Position) -> std::result::Result<Coord<f64>, PipelineError> {
    match position.as_slice() {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(PipelineError::invalid(format!(
            "position needs at least 2 ordinates, got {}",
            position.len()
        ))),
    }
}

fn line(positions: &[Position]) -> std::result::Result<LineString<f64>, PipelineError> {
    positions.iter().map(coord).collect::<std::result::Result<Vec<_>, _>>().map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> std::result::Result<Polygon<f64>, PipelineError> {
    let mut rings = rings.iter().map(|ring| line(ring));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(vec![]),
    };
    let interiors = rings.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

impl TryFrom<&GeometryJson> for Geometry<f64> {
    type Error = PipelineError;

    fn try_from(json: &GeometryJson) -> std::result::Result<Self, Self::Error> {
        Ok(match json {
            GeometryJson::Point { coordinates } => Geometry::Point(Point(coord(coordinates)?)),
            GeometryJson::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .iter()
                    .map(|p| coord(p).map(Point))
                    .collect::<std::result::Result<_, _>>()?,
            )),
            GeometryJson::LineString { coordinates } => Geometry::LineString(line(coordinates)?),
            GeometryJson::MultiLineString { coordinates } => {
                Geometry::MultiLineString(MultiLineString::new(
                    coordinates
                        .iter()
                        .map(|l| line(l))
                        .collect::<std::result::Result<_, _>>()?,
                ))
            }
            GeometryJson::Polygon { coordinates } => Geometry::Polygon(polygon(coordinates)?),
            GeometryJson::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
                coordinates
                    .iter()
                    .map(|p| polygon(p))
                    .collect::<std::result::Result<_, _>>()?,
            )),
            GeometryJson::GeometryCollection { geometries } => {
                Geometry::GeometryCollection(GeometryCollection(
                    geometries
                        .iter()
                        .map(Geometry::try_from)
                        .collect::<std::result::Result<_, _>>()?,
                ))
            }
        })
    }
}

fn ring_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.0.iter().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_positions(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

impl From<&Polygon<f64>> for GeometryJson {
    fn from(polygon: &Polygon<f64>) -> Self {
        GeometryJson::Polygon {
            coordinates: polygon_positions(polygon),
        }
    }
}

impl From<&MultiPolygon<f64>> for GeometryJson {
    fn from(shape: &MultiPolygon<f64>) -> Self {
        GeometryJson::MultiPolygon {
            coordinates: shape.iter().map(polygon_positions).collect(),
        }
    }
}

/// Parse GeoJSON text of any top-level kind
pub fn parse_geojson(text: &str) -> Result<GeoJson> {
    let value: Value = serde_json::from_str(text).context("Failed to parse JSON")?;
    if !value.is_object() {
        bail!("Expected a GeoJSON object");
    }
    GeoJson::from_value(value)
}
