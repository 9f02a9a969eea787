use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the analysis pipeline.
///
/// `InvalidInput` always fails the whole call. `NoValidSamples` signals an
/// empty boundary/grid intersection. `DegenerateGeometry` is normally absorbed
/// by the contour filter or the band merger and only surfaces from the
/// `PolygonUnion` seam.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No valid samples: boundary does not intersect the {width}x{height} grid")]
    NoValidSamples { width: usize, height: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Error returned by a single polygon union step
pub type GeometryError = PipelineError;

impl PipelineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PipelineError::InvalidInput(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        PipelineError::DegenerateGeometry(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::invalid("no facilities provided");
        assert_eq!(err.to_string(), "Invalid input: no facilities provided");

        let err = PipelineError::NoValidSamples {
            width: 4,
            height: 3,
        };
        assert!(err.to_string().contains("4x3"));
    }
}
