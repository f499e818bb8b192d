//! Dynamic resolution through particle splitting and merging.

use std::sync::Arc;

use sph_geometry::Shape;
use sph_grid::{MultilevelCellLinkedList, MultilevelLevelSet, SignedDistanceField, SpatialIndex};
use sph_kernel::SmoothingKernel;
use sph_math::{Aabb, Vecd, EPS};
use sph_particles::{ParticleStore, RealBody};

use crate::adaptation::{Adaptation, SpatialAdaptation};
use crate::error::{AdaptationError, Result};
use crate::refinement::LocalRefinement;

/// Local refinement realized by splitting particles into children and
/// merging under-volume particles back together.
///
/// The refinement level counts volume halvings rather than spacing
/// halvings, so the spacing floor is `spacing_ref / (2^level)^(1/D)` and
/// the volume thresholds keep children at or above the finest allowed
/// volume.
pub struct SplitAndMerge<const D: usize> {
    refinement: LocalRefinement<D>,
    minimum_volume: f64,
    maximum_volume: f64,
}

impl<const D: usize> SplitAndMerge<D> {
    /// Create a split-and-merge adaptation.
    pub fn new(
        resolution_ref: f64,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
        local_refinement_level: u32,
    ) -> Result<Self> {
        let mut refinement = LocalRefinement::new(
            resolution_ref,
            h_spacing_ratio,
            system_refinement_ratio,
            local_refinement_level,
        )?;
        Self::rederive_spacing_floor(&mut refinement);
        let spacing_ref = refinement.base.spacing_ref;
        let spacing_min = refinement.base.spacing_min;
        Ok(Self {
            refinement,
            minimum_volume: spacing_min.powi(D as i32),
            maximum_volume: spacing_ref.powi(D as i32),
        })
    }

    /// Create a split-and-merge adaptation for a body.
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

    /// The embedded local refinement.
    pub fn refinement(&self) -> &LocalRefinement<D> {
        &self.refinement
    }

    /// The shared single-resolution state.
    pub fn base(&self) -> &SpatialAdaptation<D> {
        self.refinement.base()
    }

    /// Volume of a particle at the finest allowed spacing.
    pub fn minimum_volume(&self) -> f64 {
        self.minimum_volume
    }

    /// Volume of a particle at the reference spacing.
    pub fn maximum_volume(&self) -> f64 {
        self.maximum_volume
    }

    /// Whether a particle of `current_volume` may split without its
    /// children dropping below the finest allowed volume.
    pub fn is_split_allowed(&self, current_volume: f64) -> bool {
        current_volume - 2.0 * self.minimum_volume > -EPS
    }

    /// Whether a particle of `volume` is small enough to be a merge
    /// candidate (already near the finest resolution).
    pub fn merge_resolution_check(&self, volume: f64) -> bool {
        volume - 1.2 * self.minimum_volume < EPS
    }

    /// Position of one child when splitting a particle.
    ///
    /// The child sits half the local spacing away along the direction given
    /// by `angle`; any further axes are left unchanged. Callers place each
    /// child individually, choosing distinct angles for the wanted
    /// multiplicity.
    pub fn splitting_pattern(
        &self,
        position: Vecd<D>,
        particle_spacing: f64,
        angle: f64,
    ) -> Vecd<D> {
        let mut child = position;
        child[0] += 0.5 * particle_spacing * angle.cos();
        child[1] += 0.5 * particle_spacing * angle.sin();
        child
    }

    /// Number of cell-linked-list levels, from the attainable spacing ratio.
    pub fn cell_linked_list_total_level(&self) -> usize {
        let spacing_ratio = self.refinement.base.spacing_ref / self.refinement.base.spacing_min;
        1 + spacing_ratio.log2().floor() as usize
    }

    /// Number of level-set levels.
    pub fn level_set_total_level(&self) -> usize {
        self.cell_linked_list_total_level() + 1
    }

    /// Register the per-particle smoothing-length ratio on a body's store.
    pub fn register_smoothing_length_ratio(&self, particles: &mut ParticleStore<D>) {
        self.refinement.register_smoothing_length_ratio(particles);
    }

    /// Replace the kernel, recalibrating the reference number density.
    pub fn reset_kernel<K, F>(&mut self, build: F)
    where
        K: SmoothingKernel + 'static,
        F: Fn(f64) -> K + 'static,
    {
        self.refinement.reset_kernel(build);
    }

    fn rederive_spacing_floor(refinement: &mut LocalRefinement<D>) {
        let base = &mut refinement.base;
        base.spacing_min =
            Self::most_refined_spacing(base.spacing_ref, base.local_refinement_level);
        base.h_ratio_max = base.spacing_ref / base.spacing_min;
    }

    /// Spacing after `level` volume halvings.
    fn most_refined_spacing(coarse_spacing: f64, level: u32) -> f64 {
        let finest_particle_count = f64::powi(2.0, level as i32);
        coarse_spacing / finest_particle_count.powf(1.0 / D as f64)
    }
}

impl<const D: usize> Adaptation<D> for SplitAndMerge<D> {
    fn reference_spacing(&self) -> f64 {
        self.refinement.base.spacing_ref
    }

    fn minimum_spacing(&self) -> f64 {
        self.refinement.base.spacing_min
    }

    fn reference_smoothing_length(&self) -> f64 {
        self.refinement.base.h_ref
    }

    fn h_ratio_max(&self) -> f64 {
        self.refinement.base.h_ratio_max
    }

    fn kernel(&self) -> &dyn SmoothingKernel {
        self.refinement.base.kernel.as_ref()
    }

    fn smoothing_length_ratio(&self, particles: &ParticleStore<D>, index: usize) -> f64 {
        self.refinement.smoothing_length_ratio(particles, index)
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
            self.refinement.base.kernel.cutoff_radius(),
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
            self.refinement.base.spacing_ref / refinement_ratio,
            self.level_set_total_level(),
            shape,
        )))
    }

    fn reset_adaptation_ratios(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()> {
        self.refinement
            .reset_adaptation_ratios(h_spacing_ratio, system_refinement_ratio)?;
        Self::rederive_spacing_floor(&mut self.refinement);
        self.minimum_volume = self.refinement.base.spacing_min.powi(D as i32);
        self.maximum_volume = self.refinement.base.spacing_ref.powi(D as i32);
        Ok(())
    }
}
