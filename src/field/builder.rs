use log::debug;
use rayon::prelude::*;

use super::SampleGrid;
use crate::domain::{BoundaryPolygon, Facility, validate_facilities};
use crate::error::{PipelineError, Result};
use crate::geometry::{GridExtent, great_circle_distance};

/// Width of one histogram bin in kilometers
pub const HISTOGRAM_BIN_KM: f64 = 5.0;
/// Histogram bins; the last bin is open-ended
pub const HISTOGRAM_BINS: usize = 16;

/// Maps a grid cell to the (lon, lat) it samples.
///
/// Owned by the caller (a screen projection, a degree lattice, ...). Must be
/// deterministic and safe to call from several threads.
pub trait CellMapper: Sync {
    fn cell_to_lon_lat(&self, x: usize, y: usize) -> (f64, f64);
}

impl CellMapper for GridExtent {
    fn cell_to_lon_lat(&self, x: usize, y: usize) -> (f64, f64) {
        self.to_lon_lat(x as f64, y as f64)
    }
}

impl<F> CellMapper for F
where
    F: Fn(usize, usize) -> (f64, f64) + Sync,
{
    fn cell_to_lon_lat(&self, x: usize, y: usize) -> (f64, f64) {
        self(x, y)
    }
}

/// Distance-to-nearest-facility grid plus the observed value range
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    pub grid: SampleGrid,
    range: Option<(f64, f64)>,
}

/// Summary of the finite samples of a field
#[derive(Debug, Clone, PartialEq)]
pub struct GridStats {
    pub valid: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample counts per [`HISTOGRAM_BIN_KM`] bin
    pub histogram: [usize; HISTOGRAM_BINS],
}

impl DistanceField {
    pub fn min(&self) -> Option<f64> {
        self.range.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.range.map(|(_, max)| max)
    }

    /// (min, max), or `NoValidSamples` when no cell fell inside the boundary
    pub fn value_range(&self) -> Result<(f64, f64)> {
        self.range.ok_or(PipelineError::NoValidSamples {
            width: self.grid.width(),
            height: self.grid.height(),
        })
    }

    pub fn has_samples(&self) -> bool {
        self.range.is_some()
    }

    pub fn stats(&self) -> Option<GridStats> {
        let (min, max) = self.range?;

        let mut valid = 0;
        let mut sum = 0.0;
        let mut histogram = [0usize; HISTOGRAM_BINS];
        for v in self.grid.values() {
            valid += 1;
            sum += v;
            let bin = ((v / HISTOGRAM_BIN_KM).floor().max(0.0) as usize).min(HISTOGRAM_BINS - 1);
            histogram[bin] += 1;
        }

        Some(GridStats {
            valid,
            min,
            max,
            mean: sum / valid as f64,
            histogram,
        })
    }
}

/// Band windows with fewer samples than this are not contoured
pub const MIN_BAND_SAMPLES: usize = 10;

/// Samples of a field falling in one value window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub count: usize,
    /// `None` when `count` is zero
    pub range: Option<(f64, f64)>,
}

impl DistanceField {
    /// Count and range of the samples in `[lower, upper)`
    pub fn window_stats(&self, lower: f64, upper: f64) -> WindowStats {
        let mut count = 0;
        let mut range = None;
        for v in self.grid.values().filter(|v| *v >= lower && *v < upper) {
            count += 1;
            range = merge_range(range, Some((v, v)));
        }
        WindowStats { count, range }
    }

    /// Window stats per band bound `b`, over `[b, b + w)` where `w` is the
    /// band's own width (`b` minus the previous bound, or `b` for the first)
    pub fn band_windows(&self, bounds: &[f64]) -> Vec<(f64, WindowStats)> {
        let mut lower = 0.0;
        bounds
            .iter()
            .map(|&upper| {
                let width = upper - lower;
                lower = upper;
                (upper, self.window_stats(upper, upper + width))
            })
            .collect()
    }
}

fn merge_range(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
        (a, None) => a,
        (None, b) => b,
    }
}

fn nearest_facility_km(lat: f64, lon: f64, facilities: &[Facility]) -> f64 {
    facilities
        .iter()
        .map(|f| great_circle_distance((lat, lon), f.position))
        .fold(f64::INFINITY, f64::min)
}

/// Compute the distance field for a `width` x `height` grid.
///
/// Each cell inside `boundary` holds the great-circle distance (km) from its
/// coordinate to the nearest facility; cells outside hold `None` and do not
/// contribute to min/max. Rows are computed in parallel and the per-row
/// ranges reduced at the end.
///
/// # Errors
/// `InvalidInput` when `facilities` is empty or malformed. A boundary that
/// covers no cell is not an error here; the returned field has no range and
/// [`DistanceField::value_range`] reports `NoValidSamples`.
pub fn build_distance_field(
    width: usize,
    height: usize,
    mapper: &impl CellMapper,
    boundary: &BoundaryPolygon,
    facilities: &[Facility],
) -> Result<DistanceField> {
    validate_facilities(facilities)?;

    let mut cells = vec![None; width * height];
    if cells.is_empty() {
        return Ok(DistanceField {
            grid: SampleGrid::new(width, height, cells),
            range: None,
        });
    }

    let range = cells
        .par_chunks_mut(width)
        .enumerate()
        .map(|(y, row)| {
            let mut row_range = None;
            for (x, cell) in row.iter_mut().enumerate() {
                let (lon, lat) = mapper.cell_to_lon_lat(x, y);
                if !boundary.contains(lon, lat) {
                    continue;
                }
                let d = nearest_facility_km(lat, lon, facilities);
                *cell = Some(d);
                row_range = merge_range(row_range, Some((d, d)));
            }
            row_range
        })
        .reduce(|| None, merge_range);

    let grid = SampleGrid::new(width, height, cells);
    debug!(
        "Distance field {}x{}: {} samples inside boundary",
        width,
        height,
        grid.valid_count()
    );

    Ok(DistanceField { grid, range })
}
