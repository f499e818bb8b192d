//! Math primitives shared across the sph crates.
//!
//! Thin aliases over nalgebra fixed-size vectors, plus the axis-aligned
//! bounds type used to size background grids and level sets.

pub mod bounds;

pub use bounds::Aabb;

use nalgebra as na;

/// Spatial vector of compile-time dimension `D`.
pub type Vecd<const D: usize> = na::SVector<f64, D>;
/// 2D vector alias.
pub type Vec2 = na::Vector2<f64>;
/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;

/// Tolerance for threshold comparisons on particle volumes and spacings.
pub const EPS: f64 = f64::EPSILON;
