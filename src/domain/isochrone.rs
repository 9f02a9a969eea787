use geo::{Geometry, MultiPolygon};

/// Seconds per minute; travel-time bands are carried in seconds internally
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert minute bands from configuration into canonical seconds
pub fn minutes_to_seconds(minutes: &[f64]) -> Vec<f64> {
    minutes.iter().map(|m| m * SECONDS_PER_MINUTE).collect()
}

/// A reachability polygon for one source, tagged with its band value
#[derive(Debug, Clone, PartialEq)]
pub struct Isochrone {
    pub value: f64,
    pub geometry: Geometry<f64>,
    /// Originating facility, when the feed says so
    pub source: Option<String>,
}

impl Isochrone {
    pub fn new(value: f64, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            value,
            geometry: geometry.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Union of every isochrone sharing one band value
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBandPolygon {
    /// Canonical band value (the group key, never an input's own tag)
    pub value: f64,
    pub geometry: MultiPolygon<f64>,
    /// Inputs folded into `geometry`
    pub merged: usize,
    /// Inputs dropped because their union step failed or was empty
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_seconds() {
        assert_eq!(
            minutes_to_seconds(&[15.0, 30.0, 45.0, 60.0]),
            vec![900.0, 1800.0, 2700.0, 3600.0]
        );
    }
}
