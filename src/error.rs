use std::ops::Range;

/// Error types for windowed spline construction, fitting and evaluation
#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    /// Rejected fit parameters or sample arrays
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The local least-squares solve of one segment is degenerate or under-determined
    #[error("Fit failed for segment {segment} (samples {samples:?}): {reason}")]
    FitFailure {
        /// Index of the failing segment
        segment: usize,
        /// Sample range the segment was fitted on
        samples: Range<usize>,
        /// What went wrong in the solve
        reason: String,
    },

    /// The bounded proportional search did not find a covering segment
    #[error(
        "Search window too small for x = {x} (scanned {scanned:?}); sampling rate is not constant"
    )]
    SearchWindowTooSmall {
        /// The offending query abscissa
        x: f64,
        /// Segment indices that were scanned
        scanned: Range<usize>,
    },

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading samples
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplineError {
    /// Returns true for errors raised while validating parameters
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, SplineError::InvalidParameter(_))
    }
}

/// Result type for windowed spline operations
pub type Result<T> = std::result::Result<T, SplineError>;
