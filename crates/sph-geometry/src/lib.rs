//! Signed-distance geometry for shape-aware refinement.
//!
//! Shapes answer two queries: an axis-aligned bounding box and a signed
//! distance to their surface (negative inside). Mesh import and arbitrary
//! geometry live outside this workspace; the shapes here are the concrete
//! primitives used for calibration, containment and tests.

pub mod shapes;

pub use shapes::{Ball, Block};

use sph_math::{Aabb, Vecd};

/// A closed shape queryable by signed distance.
pub trait Shape<const D: usize> {
    /// Axis-aligned bounding box of the shape.
    fn bounds(&self) -> Aabb<D>;

    /// Signed distance from `position` to the surface, negative inside.
    fn signed_distance(&self, position: &Vecd<D>) -> f64;

    /// Whether `position` lies strictly inside the shape.
    fn contains(&self, position: &Vecd<D>) -> bool {
        self.signed_distance(position) < 0.0
    }
}
