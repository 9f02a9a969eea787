//! Iso-value contour extraction over a [`SampleGrid`](crate::field::SampleGrid)

pub mod filter;
pub mod marching;
pub mod rings;

use geo::{Coord, LineString, MapCoords, Polygon};

pub use filter::is_degenerate_ring;
pub use marching::MarchingSquares;

use crate::error::{PipelineError, Result};
use crate::field::SampleGrid;
use crate::geometry::GridExtent;

/// A closed contour polygon (with optional holes) tagged with its threshold.
///
/// The polygon encloses the samples whose value is `<= threshold`. Coordinates
/// are grid (column, row) positions until mapped by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPolygon {
    pub threshold: f64,
    pub polygon: Polygon<f64>,
}

impl ContourPolygon {
    /// Apply a caller-supplied transform to every vertex
    pub fn map_points(&self, f: impl Fn(f64, f64) -> (f64, f64)) -> Self {
        Self {
            threshold: self.threshold,
            polygon: self.polygon.map_coords(|Coord { x, y }| {
                let (x, y) = f(x, y);
                Coord { x, y }
            }),
        }
    }

    /// Map grid positions to (lon, lat) through the grid's extent
    pub fn to_lon_lat(&self, extent: &GridExtent) -> Self {
        self.map_points(|x, y| extent.to_lon_lat(x, y))
    }

    pub fn exterior(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }
}

/// Narrow seam over the contouring algorithm
pub trait ContourExtractor {
    /// Closed polygons for every threshold, in threshold order
    fn extract(&self, grid: &SampleGrid, thresholds: &[f64]) -> Vec<ContourPolygon>;
}

/// `count` thresholds spaced `step` apart, starting at `step`
pub fn evenly_spaced_thresholds(step: f64, count: usize) -> Result<Vec<f64>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(PipelineError::invalid(format!(
            "contour step must be positive, got {}",
            step
        )));
    }
    Ok((1..=count).map(|i| step * i as f64).collect())
}
