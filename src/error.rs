//! Error type for image and cost-field construction.
//!
//! Interactive operations (snapping, path search, contour editing) never fail:
//! out-of-range input and unreachable targets come back as `None` or as an
//! outcome variant. Only building a field from caller-supplied buffers can.

use thiserror::Error;

/// Errors raised while validating input images or cost values.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LiveWireError {
    #[error("image must be at least 1x1, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("cost value {value} at index {index} is outside [0, 1]")]
    CostOutOfRange { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, LiveWireError>;
