//! Locally refined resolution within one body.

use std::sync::Arc;

use sph_geometry::Shape;
use sph_grid::{MultilevelCellLinkedList, MultilevelLevelSet, SignedDistanceField, SpatialIndex};
use sph_kernel::SmoothingKernel;
use sph_math::{Aabb, Vecd};
use sph_particles::{ParticleStore, RealBody, SMOOTHING_LENGTH_RATIO};

use crate::adaptation::{most_refined_spacing, Adaptation, SpatialAdaptation};
use crate::error::{AdaptationError, Result};

/// Adaptation with a per-particle smoothing-length ratio and multilevel
/// background structures.
///
/// The spacing floor is `spacing_ref / 2^level`; how target spacing varies
/// in space is decided by further specializations.
pub struct LocalRefinement<const D: usize> {
    pub(crate) base: SpatialAdaptation<D>,
}

impl<const D: usize> LocalRefinement<D> {
    /// Create a locally refined adaptation.
    pub fn new(
        resolution_ref: f64,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
        local_refinement_level: u32,
    ) -> Result<Self> {
        let mut base =
            SpatialAdaptation::with_ratios(resolution_ref, h_spacing_ratio, system_refinement_ratio)?;
        base.local_refinement_level = local_refinement_level;
        base.spacing_min = most_refined_spacing(base.spacing_ref, local_refinement_level);
        base.h_ratio_max = f64::powi(2.0, local_refinement_level as i32);
        Ok(Self { base })
    }

    /// Create a locally refined adaptation for a body.
    pub fn for_body(
        body: &RealBody<D>,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
        local_refinement_level: u32,
    ) -> Result<Self> {
        Self::new(
            body.resolution_ref(),
            h_spacing_ratio,
            system_refinement_ratio,
            local_refinement_level,
        )
    }

    /// The shared single-resolution state.
    pub fn base(&self) -> &SpatialAdaptation<D> {
        &self.base
    }

    /// Refinement level relative to the reference spacing.
    pub fn local_refinement_level(&self) -> u32 {
        self.base.local_refinement_level
    }

    /// Number of cell-linked-list levels the body needs.
    pub fn cell_linked_list_total_level(&self) -> usize {
        self.base.local_refinement_level as usize
    }

    /// Number of level-set levels the body needs.
    pub fn level_set_total_level(&self) -> usize {
        self.cell_linked_list_total_level() + 1
    }

    /// Register the per-particle smoothing-length ratio on a body's store,
    /// defaulted to 1.0 and carried through particle reordering.
    pub fn register_smoothing_length_ratio(&self, particles: &mut ParticleStore<D>) {
        particles.register_scalar_variable(SMOOTHING_LENGTH_RATIO, 1.0);
        particles.register_sortable_scalar(SMOOTHING_LENGTH_RATIO);
    }

    /// Replace the kernel, recalibrating the reference number density.
    pub fn reset_kernel<K, F>(&mut self, build: F)
    where
        K: SmoothingKernel + 'static,
        F: Fn(f64) -> K + 'static,
    {
        self.base.reset_kernel(build);
    }
}

impl<const D: usize> Adaptation<D> for LocalRefinement<D> {
    fn reference_spacing(&self) -> f64 {
        self.base.spacing_ref
    }

    fn minimum_spacing(&self) -> f64 {
        self.base.spacing_min
    }

    fn reference_smoothing_length(&self) -> f64 {
        self.base.h_ref
    }

    fn h_ratio_max(&self) -> f64 {
        self.base.h_ratio_max
    }

    fn kernel(&self) -> &dyn SmoothingKernel {
        self.base.kernel.as_ref()
    }

    fn smoothing_length_ratio(&self, particles: &ParticleStore<D>, index: usize) -> f64 {
        particles
            .scalar(SMOOTHING_LENGTH_RATIO)
            .map_or(1.0, |ratios| ratios[index])
    }

    fn create_cell_linked_list(
        &self,
        domain_bounds: &Aabb<D>,
        body: &RealBody<D>,
    ) -> Box<dyn SpatialIndex<D>> {
        let total_levels = self.cell_linked_list_total_level().max(1);
        log::debug!(
            "multilevel cell linked list for body {}: {total_levels} levels",
            body.name()
        );
        Box::new(MultilevelCellLinkedList::new(
            *domain_bounds,
            self.base.kernel.cutoff_radius(),
            total_levels,
        ))
    }

    fn create_level_set(
        &self,
        shape: Arc<dyn Shape<D>>,
        refinement_ratio: f64,
    ) -> Result<Box<dyn SignedDistanceField<D>>> {
        if refinement_ratio <= 0.0 {
            return Err(AdaptationError::NonPositiveRefinementRatio(refinement_ratio));
        }
        let bounds = shape.bounds();
        let min_dimension = bounds.min_dimension();
        if min_dimension <= 0.0 {
            return Err(AdaptationError::DegenerateShapeBounds(min_dimension));
        }
        Ok(Box::new(MultilevelLevelSet::new(
            bounds,
            self.base.spacing_ref / refinement_ratio,
            self.level_set_total_level(),
            shape,
        )))
    }

    fn reset_adaptation_ratios(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()> {
        self.base
            .reset_ratios_impl(h_spacing_ratio, system_refinement_ratio)
    }
}

/// Where a shape-driven adaptation concentrates resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementRegion {
    /// Finest at the surface, coarsening symmetrically on both sides.
    NearSurface,
    /// Finest across the whole interior, with the same falloff outside.
    WithinShape,
}

/// Local refinement whose target spacing is driven by the distance to a
/// target shape's surface.
pub struct RefineByShape<const D: usize> {
    refinement: LocalRefinement<D>,
    target_shape: Arc<dyn Shape<D>>,
    region: RefinementRegion,
}

impl<const D: usize> RefineByShape<D> {
    /// Create a shape-driven adaptation around `target_shape`.
    pub fn new(
        resolution_ref: f64,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
        local_refinement_level: u32,
        target_shape: Arc<dyn Shape<D>>,
        region: RefinementRegion,
    ) -> Result<Self> {
        Ok(Self {
            refinement: LocalRefinement::new(
                resolution_ref,
                h_spacing_ratio,
                system_refinement_ratio,
                local_refinement_level,
            )?,
            target_shape,
            region,
        })
    }

    /// Create a shape-driven adaptation for a body, targeting its own shape.
    pub fn for_body(
        body: &RealBody<D>,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
        local_refinement_level: u32,
        region: RefinementRegion,
    ) -> Result<Self> {
        Self::new(
            body.resolution_ref(),
            h_spacing_ratio,
            system_refinement_ratio,
            local_refinement_level,
            body.shape().clone(),
            region,
        )
    }

    /// The embedded local refinement.
    pub fn refinement(&self) -> &LocalRefinement<D> {
        &self.refinement
    }

    /// The shape driving the target spacing.
    pub fn target_shape(&self) -> &Arc<dyn Shape<D>> {
        &self.target_shape
    }

    pub fn region(&self) -> RefinementRegion {
        self.region
    }

    /// Blend between minimum and reference spacing over a distance measure.
    ///
    /// Within the kernel's support of the scaled measure, the 1-D kernel
    /// profile weights the two spacings, so the transition stays continuous
    /// across the refinement boundary; beyond it the reference spacing is
    /// returned unmodified.
    pub fn smoothed_spacing(&self, measure: f64, transition_thickness: f64) -> f64 {
        let base = &self.refinement.base;
        let ratio_ref = measure / (2.0 * transition_thickness);
        if ratio_ref < base.kernel.kernel_size() {
            let weight = base.kernel.w_1d(ratio_ref) / base.kernel.w_1d(0.0);
            weight * base.spacing_min + (1.0 - weight) * base.spacing_ref
        } else {
            base.spacing_ref
        }
    }
}

impl<const D: usize> Adaptation<D> for RefineByShape<D> {
    fn reference_spacing(&self) -> f64 {
        self.refinement.reference_spacing()
    }

    fn minimum_spacing(&self) -> f64 {
        self.refinement.minimum_spacing()
    }

    fn reference_smoothing_length(&self) -> f64 {
        self.refinement.reference_smoothing_length()
    }

    fn h_ratio_max(&self) -> f64 {
        self.refinement.h_ratio_max()
    }

    fn kernel(&self) -> &dyn SmoothingKernel {
        self.refinement.kernel()
    }

    fn smoothing_length_ratio(&self, particles: &ParticleStore<D>, index: usize) -> f64 {
        self.refinement.smoothing_length_ratio(particles, index)
    }

    fn local_spacing(&self, position: &Vecd<D>) -> f64 {
        let spacing_ref = self.refinement.base.spacing_ref;
        let phi = self.target_shape.signed_distance(position);
        match self.region {
            RefinementRegion::NearSurface => self.smoothed_spacing(phi.abs(), spacing_ref),
            RefinementRegion::WithinShape => {
                if phi < 0.0 {
                    self.refinement.base.spacing_min
                } else {
                    self.smoothed_spacing(phi, spacing_ref)
                }
            }
        }
    }

    fn create_cell_linked_list(
        &self,
        domain_bounds: &Aabb<D>,
        body: &RealBody<D>,
    ) -> Box<dyn SpatialIndex<D>> {
        self.refinement.create_cell_linked_list(domain_bounds, body)
    }

    fn create_level_set(
        &self,
        shape: Arc<dyn Shape<D>>,
        refinement_ratio: f64,
    ) -> Result<Box<dyn SignedDistanceField<D>>> {
        self.refinement.create_level_set(shape, refinement_ratio)
    }

    fn reset_adaptation_ratios(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()> {
        self.refinement
            .reset_adaptation_ratios(h_spacing_ratio, system_refinement_ratio)
    }
}
