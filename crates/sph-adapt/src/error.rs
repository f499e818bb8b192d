//! Error types for sph-adapt.

use thiserror::Error;

/// Configuration errors detected at adaptation construction or reset.
///
/// All downstream spacing math divides by the offending values, so these
/// abort setup instead of proceeding; nothing partially configured is ever
/// left behind.
#[derive(Debug, Error)]
pub enum AdaptationError {
    #[error("reference resolution must be positive, got {0}")]
    NonPositiveResolution(f64),

    #[error("smoothing-length spacing ratio must be positive, got {0}")]
    NonPositiveSpacingRatio(f64),

    #[error("refinement ratio must be positive, got {0}")]
    NonPositiveRefinementRatio(f64),

    #[error("unsupported spatial dimension {0}, expected 2 or 3")]
    UnsupportedDimension(usize),

    #[error("shape bounding box is degenerate, minimum extent {0}")]
    DegenerateShapeBounds(f64),
}

pub type Result<T> = std::result::Result<T, AdaptationError>;
