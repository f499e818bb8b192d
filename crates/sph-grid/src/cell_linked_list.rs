//! Cell-linked-list bucket grids.

use sph_math::{Aabb, Vecd};

use crate::SpatialIndex;

/// Number of buffer cells added on each side of the domain.
const BUFFER_CELLS: usize = 2;

/// Single-level bucket grid sized to a kernel cutoff radius.
#[derive(Debug, Clone)]
pub struct CellLinkedList<const D: usize> {
    bounds: Aabb<D>,
    grid_spacing: f64,
    cells: [usize; D],
}

impl<const D: usize> CellLinkedList<D> {
    /// Create a grid over `bounds` with cells of size `grid_spacing`.
    pub fn new(bounds: Aabb<D>, grid_spacing: f64) -> Self {
        assert!(grid_spacing > 0.0, "grid spacing must be positive");
        let extent = bounds.extent();
        let mut cells = [0usize; D];
        for (i, count) in cells.iter_mut().enumerate() {
            *count = (extent[i] / grid_spacing).ceil().max(1.0) as usize + 2 * BUFFER_CELLS;
        }
        log::debug!(
            "cell linked list: spacing {grid_spacing}, {} cells",
            cells.iter().product::<usize>()
        );
        Self {
            bounds,
            grid_spacing,
            cells,
        }
    }

    /// Cell size.
    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    /// Cell counts per axis, including buffer cells.
    pub fn cells(&self) -> &[usize; D] {
        &self.cells
    }

    /// Total number of cells.
    pub fn total_cells(&self) -> usize {
        self.cells.iter().product()
    }

    /// Cell coordinate of a position, clamped to the grid.
    pub fn cell_of(&self, position: &Vecd<D>) -> [usize; D] {
        let mut cell = [0usize; D];
        for (i, c) in cell.iter_mut().enumerate() {
            let offset = (position[i] - self.bounds.min[i]) / self.grid_spacing;
            let index = offset.floor() as i64 + BUFFER_CELLS as i64;
            *c = index.clamp(0, self.cells[i] as i64 - 1) as usize;
        }
        cell
    }
}

impl<const D: usize> SpatialIndex<D> for CellLinkedList<D> {
    fn bounds(&self) -> &Aabb<D> {
        &self.bounds
    }

    fn total_levels(&self) -> usize {
        1
    }

    fn grid_spacing_at(&self, _level: usize) -> f64 {
        self.grid_spacing
    }
}

/// Stack of bucket grids, one per refinement level.
///
/// Level 0 uses the reference spacing; each finer level halves it, so a
/// particle refined `l` times is searched on a grid matched to its support.
#[derive(Debug, Clone)]
pub struct MultilevelCellLinkedList<const D: usize> {
    bounds: Aabb<D>,
    levels: Vec<CellLinkedList<D>>,
}

impl<const D: usize> MultilevelCellLinkedList<D> {
    /// Create `total_levels` grids over `bounds`, halving `reference_grid_spacing` per level.
    pub fn new(bounds: Aabb<D>, reference_grid_spacing: f64, total_levels: usize) -> Self {
        assert!(total_levels >= 1, "at least one level is required");
        let levels = (0..total_levels)
            .map(|l| CellLinkedList::new(bounds, reference_grid_spacing / f64::powi(2.0, l as i32)))
            .collect();
        Self { bounds, levels }
    }

    /// The grid at a level; level 0 is the coarsest.
    pub fn level(&self, level: usize) -> &CellLinkedList<D> {
        &self.levels[level]
    }
}

impl<const D: usize> SpatialIndex<D> for MultilevelCellLinkedList<D> {
    fn bounds(&self) -> &Aabb<D> {
        &self.bounds
    }

    fn total_levels(&self) -> usize {
        self.levels.len()
    }

    fn grid_spacing_at(&self, level: usize) -> f64 {
        self.levels[level].grid_spacing()
    }
}
