use crate::error::{PipelineError, Result};

/// One classification band: values up to and including `upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub label: String,
}

impl Band {
    pub fn new(upper: f64, label: impl Into<String>) -> Self {
        Self {
            upper,
            label: label.into(),
        }
    }
}

/// Ordered, strictly increasing band list.
///
/// Bands describe `(0, b1], (b1, b2], ...`; the last band also absorbs every
/// value above its bound, so each finite value falls in exactly one band. The
/// last bound may be `f64::INFINITY` to spell that out.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBands {
    bands: Vec<Band>,
}

impl DistanceBands {
    pub fn new(bands: Vec<Band>) -> Result<Self> {
        if bands.is_empty() {
            return Err(PipelineError::invalid("band list is empty"));
        }

        let last = bands.len() - 1;
        for (i, band) in bands.iter().enumerate() {
            let open_last = i == last && band.upper == f64::INFINITY;
            if !band.upper.is_finite() && !open_last {
                return Err(PipelineError::invalid(format!(
                    "band {} has a non-finite upper bound",
                    band.label
                )));
            }
        }

        for pair in bands.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(PipelineError::invalid(format!(
                    "bands must be strictly increasing: {} is not above {}",
                    pair[1].upper, pair[0].upper
                )));
            }
        }

        Ok(Self { bands })
    }

    /// Build bands from upper bounds, labelled "lo-hi". The last band takes
    /// every value above its lower bound and is labelled "lo+".
    pub fn from_bounds(bounds: &[f64]) -> Result<Self> {
        let mut lower = 0.0;
        let bands = bounds
            .iter()
            .enumerate()
            .map(|(i, &upper)| {
                let label = if i + 1 == bounds.len() {
                    format!("{}+", lower)
                } else {
                    format!("{}-{}", lower, upper)
                };
                lower = upper;
                Band::new(upper, label)
            })
            .collect();
        Self::new(bands)
    }

    /// Index of the first band whose upper bound is >= `value`, or the last
    /// band. `value` must be a defined scalar; see [`Self::checked_classify`].
    pub fn classify(&self, value: f64) -> usize {
        self.bands
            .iter()
            .position(|band| value <= band.upper)
            .unwrap_or(self.bands.len() - 1)
    }

    /// [`Self::classify`] with NaN and infinities rejected as `InvalidInput`
    pub fn checked_classify(&self, value: f64) -> Result<usize> {
        if !value.is_finite() {
            return Err(PipelineError::invalid(format!(
                "cannot classify a non-finite value ({})",
                value
            )));
        }
        Ok(self.classify(value))
    }

    pub fn get(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter()
    }

    pub fn upper_bounds(&self) -> Vec<f64> {
        self.bands.iter().map(|band| band.upper).collect()
    }
}
