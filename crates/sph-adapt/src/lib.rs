//! Spatial adaptation: how densely a body is discretized into particles.
//!
//! An adaptation derives reference particle spacing and smoothing length
//! from a target resolution, calibrates a reference number density by
//! integrating its kernel over a local lattice, and sizes the background
//! structures (cell-linked lists, level sets) consistently with that
//! resolution. Specializations add locally varying resolution within one
//! body:
//!
//! - [`SpatialAdaptation`]: single resolution, the default for a body
//! - [`LocalRefinement`]: per-particle smoothing-length ratios and
//!   multilevel background structures
//! - [`RefineByShape`]: target spacing driven by distance to a shape
//!   surface, finest at the surface or across the interior
//! - [`SplitAndMerge`]: volume thresholds for dynamically splitting and
//!   merging particles without violating the spacing floor

pub mod adaptation;
pub mod error;
pub mod refinement;
pub mod split_merge;

pub use adaptation::{Adaptation, SpatialAdaptation, DEFAULT_H_SPACING_RATIO};
pub use error::{AdaptationError, Result};
pub use refinement::{LocalRefinement, RefineByShape, RefinementRegion};
pub use split_merge::SplitAndMerge;
