//! Background structures sized by the adaptation layer.
//!
//! Cell-linked lists carry the bucket grid the neighbor search walks;
//! level sets carry the signed-distance field that drives shape-aware
//! refinement. Both come in single-level and multilevel forms; the
//! adaptation layer decides level counts and spacings, the query-side
//! algorithms live with the search and field consumers.

pub mod cell_linked_list;
pub mod level_set;

pub use cell_linked_list::{CellLinkedList, MultilevelCellLinkedList};
pub use level_set::{LevelSet, MultilevelLevelSet};

use sph_math::{Aabb, Vecd};

/// A bucket grid (possibly multilevel) the neighbor search can be run on.
pub trait SpatialIndex<const D: usize> {
    /// Domain covered by the index.
    fn bounds(&self) -> &Aabb<D>;

    /// Number of resolution levels.
    fn total_levels(&self) -> usize;

    /// Grid spacing of a level; level 0 is the coarsest.
    fn grid_spacing_at(&self, level: usize) -> f64;
}

/// A signed-distance field (possibly multilevel) over a shape.
pub trait SignedDistanceField<const D: usize> {
    /// Domain covered by the field.
    fn bounds(&self) -> &Aabb<D>;

    /// Data spacing of the finest level.
    fn data_spacing(&self) -> f64;

    /// Number of resolution levels.
    fn total_levels(&self) -> usize;

    /// Signed distance to the underlying shape surface, negative inside.
    fn signed_distance(&self, position: &Vecd<D>) -> f64;
}
