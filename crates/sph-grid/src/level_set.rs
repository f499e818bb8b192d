//! Signed-distance field handles.

use std::sync::Arc;

use sph_geometry::Shape;
use sph_math::{Aabb, Vecd};

use crate::SignedDistanceField;

/// Single-level signed-distance field over a shape.
///
/// Holds the domain and data spacing the field is meshed at, and probes
/// the shape it was built from. Mesh storage and redistancing belong to
/// the field consumer; this handle fixes the sizing.
#[derive(Clone)]
pub struct LevelSet<const D: usize> {
    bounds: Aabb<D>,
    data_spacing: f64,
    shape: Arc<dyn Shape<D>>,
}

impl<const D: usize> LevelSet<D> {
    /// Create a field over `bounds` meshed at `data_spacing`.
    pub fn new(bounds: Aabb<D>, data_spacing: f64, shape: Arc<dyn Shape<D>>) -> Self {
        assert!(data_spacing > 0.0, "data spacing must be positive");
        Self {
            bounds,
            data_spacing,
            shape,
        }
    }

    /// Create the next-finer field from a coarser one, halving its spacing.
    pub fn refined_from(coarser: &LevelSet<D>) -> Self {
        Self {
            bounds: coarser.bounds,
            data_spacing: 0.5 * coarser.data_spacing,
            shape: coarser.shape.clone(),
        }
    }

    /// The shape the field was built from.
    pub fn shape(&self) -> &Arc<dyn Shape<D>> {
        &self.shape
    }
}

impl<const D: usize> SignedDistanceField<D> for LevelSet<D> {
    fn bounds(&self) -> &Aabb<D> {
        &self.bounds
    }

    fn data_spacing(&self) -> f64 {
        self.data_spacing
    }

    fn total_levels(&self) -> usize {
        1
    }

    fn signed_distance(&self, position: &Vecd<D>) -> f64 {
        self.shape.signed_distance(position)
    }
}

/// Coarse-to-fine stack of signed-distance fields.
///
/// Level 0 is the coarsest; each level halves the data spacing. Built as
/// construction scaffolding for a refined finest level, or kept whole for
/// locally refined bodies.
#[derive(Clone)]
pub struct MultilevelLevelSet<const D: usize> {
    bounds: Aabb<D>,
    levels: Vec<LevelSet<D>>,
}

impl<const D: usize> MultilevelLevelSet<D> {
    /// Create `total_levels` fields over the shape's bounds, halving `coarsest_spacing` per level.
    pub fn new(
        bounds: Aabb<D>,
        coarsest_spacing: f64,
        total_levels: usize,
        shape: Arc<dyn Shape<D>>,
    ) -> Self {
        assert!(total_levels >= 1, "at least one level is required");
        log::debug!("multilevel level set: {total_levels} levels, coarsest spacing {coarsest_spacing}");
        let mut levels = Vec::with_capacity(total_levels);
        levels.push(LevelSet::new(bounds, coarsest_spacing, shape));
        for _ in 1..total_levels {
            let finer = LevelSet::refined_from(levels.last().expect("stack is non-empty"));
            levels.push(finer);
        }
        Self { bounds, levels }
    }

    /// The field at a level; level 0 is the coarsest.
    pub fn level(&self, level: usize) -> &LevelSet<D> {
        &self.levels[level]
    }

    /// The finest field in the stack.
    pub fn finest(&self) -> &LevelSet<D> {
        self.levels.last().expect("stack is non-empty")
    }

    /// Consume the stack, keeping only the finest field.
    ///
    /// The coarser levels only existed to scaffold the construction.
    pub fn into_finest(mut self) -> LevelSet<D> {
        self.levels.pop().expect("stack is non-empty")
    }
}

impl<const D: usize> SignedDistanceField<D> for MultilevelLevelSet<D> {
    fn bounds(&self) -> &Aabb<D> {
        &self.bounds
    }

    fn data_spacing(&self) -> f64 {
        self.finest().data_spacing()
    }

    fn total_levels(&self) -> usize {
        self.levels.len()
    }

    fn signed_distance(&self, position: &Vecd<D>) -> f64 {
        self.finest().signed_distance(position)
    }
}
