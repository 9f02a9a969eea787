use crate::error::{PipelineError, Result};

/// Bounding box in geographic degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Create bounds from rings of (lon, lat) vertices
    pub fn from_rings(rings: &[Vec<(f64, f64)>]) -> Option<Self> {
        let mut points = rings.iter().flatten().peekable();
        points.peek()?;

        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;

        for &(lon, lat) in points {
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }

        Some(Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        })
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Affine mapping from grid cell indices to (lon, lat).
///
/// Fractional indices are accepted so contour vertices (which sit between
/// cells) map through the same transform as the samples they came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridExtent {
    pub width: usize,
    pub height: usize,
    origin_lon: f64,
    origin_lat: f64,
    step_lon: f64,
    step_lat: f64,
}

impl GridExtent {
    /// Screen-style grid: `width` x `height` pixels covering `bounds`, row 0 at
    /// the north edge, samples taken at pixel centers.
    pub fn from_size(bounds: &GeoBounds, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid(format!(
                "grid size must be non-zero, got {}x{}",
                width, height
            )));
        }

        let step_lon = bounds.lon_span() / width as f64;
        let step_lat = bounds.lat_span() / height as f64;

        Ok(Self {
            width,
            height,
            origin_lon: bounds.min_lon + step_lon / 2.0,
            origin_lat: bounds.max_lat - step_lat / 2.0,
            step_lon,
            step_lat: -step_lat,
        })
    }

    /// Regular lattice of `step` degrees starting at the south-west corner,
    /// row 0 at the south edge, both edges inclusive.
    pub fn from_step(bounds: &GeoBounds, step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(PipelineError::invalid(format!(
                "grid step must be a positive number of degrees, got {}",
                step
            )));
        }

        let width = (bounds.lon_span() / step).floor() as usize + 1;
        let height = (bounds.lat_span() / step).floor() as usize + 1;

        Ok(Self {
            width,
            height,
            origin_lon: bounds.min_lon,
            origin_lat: bounds.min_lat,
            step_lon: step,
            step_lat: step,
        })
    }

    /// Map a (possibly fractional) cell position to (lon, lat)
    pub fn to_lon_lat(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_lon + x * self.step_lon,
            self.origin_lat + y * self.step_lat,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}
