//! Base adaptation: single-resolution bodies.

use std::sync::Arc;

use sph_geometry::Shape;
use sph_grid::{CellLinkedList, LevelSet, MultilevelLevelSet, SignedDistanceField, SpatialIndex};
use sph_kernel::{SmoothingKernel, WendlandC2};
use sph_math::{Aabb, Vec2, Vec3, Vecd};
use sph_particles::{ParticleStore, RealBody};

use crate::error::{AdaptationError, Result};

/// Default ratio of smoothing length to particle spacing.
pub const DEFAULT_H_SPACING_RATIO: f64 = 1.3;

pub(crate) type KernelBuilder = Box<dyn Fn(f64) -> Box<dyn SmoothingKernel>>;

/// Capability every adaptation variant offers: spacing accessors, local
/// target spacing, background-structure factories and ratio resets.
pub trait Adaptation<const D: usize> {
    /// Reference particle spacing of the body.
    fn reference_spacing(&self) -> f64;

    /// Finest particle spacing local refinement may reach.
    fn minimum_spacing(&self) -> f64;

    /// Smoothing length at the reference spacing.
    fn reference_smoothing_length(&self) -> f64;

    /// Ratio of the reference smoothing length to the minimum one.
    fn h_ratio_max(&self) -> f64;

    /// Smoothing length at the finest local resolution.
    fn minimum_smoothing_length(&self) -> f64 {
        self.reference_smoothing_length() / self.h_ratio_max()
    }

    /// The kernel the adaptation is calibrated against.
    fn kernel(&self) -> &dyn SmoothingKernel;

    /// Smoothing-length ratio of one particle; 1.0 for uniform resolution.
    fn smoothing_length_ratio(&self, particles: &ParticleStore<D>, index: usize) -> f64 {
        let _ = (particles, index);
        1.0
    }

    /// Desired local particle spacing at a position.
    fn local_spacing(&self, position: &Vecd<D>) -> f64 {
        let _ = position;
        self.reference_spacing()
    }

    /// Build the bucket grid the neighbor search runs on for `body`.
    fn create_cell_linked_list(
        &self,
        domain_bounds: &Aabb<D>,
        body: &RealBody<D>,
    ) -> Box<dyn SpatialIndex<D>>;

    /// Build the signed-distance field resolving `shape` at this resolution.
    fn create_level_set(
        &self,
        shape: Arc<dyn Shape<D>>,
        refinement_ratio: f64,
    ) -> Result<Box<dyn SignedDistanceField<D>>>;

    /// Re-derive every resolution parameter from new ratios.
    fn reset_adaptation_ratios(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()>;
}

/// Single-resolution adaptation, and the state every specialization builds on.
pub struct SpatialAdaptation<const D: usize> {
    pub(crate) h_spacing_ratio: f64,
    pub(crate) system_refinement_ratio: f64,
    pub(crate) local_refinement_level: u32,
    pub(crate) spacing_ref: f64,
    pub(crate) h_ref: f64,
    pub(crate) kernel: Box<dyn SmoothingKernel>,
    pub(crate) kernel_builder: KernelBuilder,
    pub(crate) sigma0_ref: f64,
    pub(crate) spacing_min: f64,
    pub(crate) h_ratio_max: f64,
}

impl<const D: usize> SpatialAdaptation<D> {
    /// Create a single-resolution adaptation with the default ratios.
    pub fn new(resolution_ref: f64) -> Result<Self> {
        Self::with_ratios(resolution_ref, DEFAULT_H_SPACING_RATIO, 1.0)
    }

    /// Create an adaptation for a body, from its system reference resolution.
    pub fn for_body(body: &RealBody<D>) -> Result<Self> {
        Self::new(body.resolution_ref())
    }

    /// Create an adaptation with explicit ratios.
    ///
    /// `system_refinement_ratio` relates the body resolution to the system
    /// reference resolution: `spacing_ref = resolution_ref / ratio`.
    pub fn with_ratios(
        resolution_ref: f64,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<Self> {
        if !matches!(D, 2 | 3) {
            return Err(AdaptationError::UnsupportedDimension(D));
        }
        if resolution_ref <= 0.0 {
            return Err(AdaptationError::NonPositiveResolution(resolution_ref));
        }
        validate_ratios(h_spacing_ratio, system_refinement_ratio)?;

        let spacing_ref = resolution_ref / system_refinement_ratio;
        let h_ref = h_spacing_ratio * spacing_ref;
        let kernel_builder: KernelBuilder = Box::new(|h| Box::new(WendlandC2::<D>::new(h)));
        let kernel = kernel_builder(h_ref);
        let sigma0_ref = reference_number_density::<D>(kernel.as_ref(), spacing_ref);
        Ok(Self {
            h_spacing_ratio,
            system_refinement_ratio,
            local_refinement_level: 0,
            spacing_ref,
            h_ref,
            kernel,
            kernel_builder,
            sigma0_ref,
            spacing_min: most_refined_spacing(spacing_ref, 0),
            h_ratio_max: 1.0,
        })
    }

    /// Refinement level relative to the reference spacing.
    pub fn local_refinement_level(&self) -> u32 {
        self.local_refinement_level
    }

    /// Reference number density at the reference smoothing length.
    pub fn sigma0_ref(&self) -> f64 {
        self.sigma0_ref
    }

    /// Number density at a local smoothing-length ratio.
    pub fn reference_number_density(&self, h_ratio: f64) -> f64 {
        self.sigma0_ref * h_ratio.powi(D as i32)
    }

    /// Replace the kernel, recalibrating the reference number density.
    ///
    /// The builder is retained so later ratio resets rebuild the same
    /// kernel type at the updated smoothing length.
    pub fn reset_kernel<K, F>(&mut self, build: F)
    where
        K: SmoothingKernel + 'static,
        F: Fn(f64) -> K + 'static,
    {
        self.kernel_builder = Box::new(move |h| Box::new(build(h)));
        self.kernel = (self.kernel_builder)(self.h_ref);
        self.sigma0_ref = reference_number_density::<D>(self.kernel.as_ref(), self.spacing_ref);
    }

    pub(crate) fn reset_ratios_impl(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()> {
        // validate before touching anything; a failed reset is invisible
        validate_ratios(h_spacing_ratio, system_refinement_ratio)?;
        self.spacing_ref *= self.system_refinement_ratio / system_refinement_ratio;
        self.h_spacing_ratio = h_spacing_ratio;
        self.system_refinement_ratio = system_refinement_ratio;
        self.h_ref = h_spacing_ratio * self.spacing_ref;
        self.kernel = (self.kernel_builder)(self.h_ref);
        self.sigma0_ref = reference_number_density::<D>(self.kernel.as_ref(), self.spacing_ref);
        self.spacing_min = most_refined_spacing(self.spacing_ref, self.local_refinement_level);
        self.h_ratio_max = f64::powi(2.0, self.local_refinement_level as i32);
        log::debug!(
            "adaptation ratios reset: spacing_ref {}, h_ref {}",
            self.spacing_ref,
            self.h_ref
        );
        Ok(())
    }

    pub(crate) fn create_level_set_impl(
        &self,
        shape: Arc<dyn Shape<D>>,
        refinement_ratio: f64,
    ) -> Result<Box<dyn SignedDistanceField<D>>> {
        let bounds = shape.bounds();
        let total_levels = self.level_set_level_estimate(&bounds, refinement_ratio)?;
        let coarsest_spacing = self.spacing_ref * f64::powi(2.0, total_levels as i32 - 1);
        // build coarse-to-fine, then keep only the finest level
        let scaffold = MultilevelLevelSet::new(
            bounds,
            coarsest_spacing / refinement_ratio,
            total_levels.saturating_sub(1).max(1),
            shape,
        );
        Ok(Box::new(LevelSet::refined_from(scaffold.finest())))
    }

    /// Levels needed to resolve the shape's bounding box at this spacing.
    pub(crate) fn level_set_level_estimate(
        &self,
        bounds: &Aabb<D>,
        refinement_ratio: f64,
    ) -> Result<usize> {
        if refinement_ratio <= 0.0 {
            return Err(AdaptationError::NonPositiveRefinementRatio(refinement_ratio));
        }
        let min_dimension = bounds.min_dimension();
        if min_dimension <= 0.0 {
            return Err(AdaptationError::DegenerateShapeBounds(min_dimension));
        }
        let levels = (min_dimension / self.spacing_ref).log10() as i32 + 2;
        Ok(levels.max(1) as usize)
    }
}

impl<const D: usize> Adaptation<D> for SpatialAdaptation<D> {
    fn reference_spacing(&self) -> f64 {
        self.spacing_ref
    }

    fn minimum_spacing(&self) -> f64 {
        self.spacing_min
    }

    fn reference_smoothing_length(&self) -> f64 {
        self.h_ref
    }

    fn h_ratio_max(&self) -> f64 {
        self.h_ratio_max
    }

    fn kernel(&self) -> &dyn SmoothingKernel {
        self.kernel.as_ref()
    }

    fn create_cell_linked_list(
        &self,
        domain_bounds: &Aabb<D>,
        body: &RealBody<D>,
    ) -> Box<dyn SpatialIndex<D>> {
        log::debug!("single-level cell linked list for body {}", body.name());
        Box::new(CellLinkedList::new(
            *domain_bounds,
            self.kernel.cutoff_radius(),
        ))
    }

    fn create_level_set(
        &self,
        shape: Arc<dyn Shape<D>>,
        refinement_ratio: f64,
    ) -> Result<Box<dyn SignedDistanceField<D>>> {
        self.create_level_set_impl(shape, refinement_ratio)
    }

    fn reset_adaptation_ratios(
        &mut self,
        h_spacing_ratio: f64,
        system_refinement_ratio: f64,
    ) -> Result<()> {
        self.reset_ratios_impl(h_spacing_ratio, system_refinement_ratio)
    }
}

fn validate_ratios(h_spacing_ratio: f64, system_refinement_ratio: f64) -> Result<()> {
    if h_spacing_ratio <= 0.0 {
        return Err(AdaptationError::NonPositiveSpacingRatio(h_spacing_ratio));
    }
    if system_refinement_ratio <= 0.0 {
        return Err(AdaptationError::NonPositiveRefinementRatio(
            system_refinement_ratio,
        ));
    }
    Ok(())
}

/// Spacing after `level` halvings.
pub(crate) fn most_refined_spacing(coarse_spacing: f64, level: u32) -> f64 {
    coarse_spacing / f64::powi(2.0, level as i32)
}

/// Kernel weight summed over a regular lattice around the origin.
///
/// This is the calibration constant translating particle counts into
/// number density: every lattice offset strictly inside the cutoff radius
/// contributes its kernel weight. The loop nest depth depends on the
/// spatial dimension.
pub(crate) fn reference_number_density<const D: usize>(
    kernel: &dyn SmoothingKernel,
    particle_spacing: f64,
) -> f64 {
    match D {
        2 => reference_number_density_2d(kernel, particle_spacing),
        3 => reference_number_density_3d(kernel, particle_spacing),
        _ => unreachable!("dimension is validated at construction"),
    }
}

fn reference_number_density_2d(kernel: &dyn SmoothingKernel, particle_spacing: f64) -> f64 {
    let cutoff_radius = kernel.cutoff_radius();
    let search_depth = (cutoff_radius / particle_spacing) as i32 + 1;
    let mut sigma = 0.0;
    for j in -search_depth..=search_depth {
        for i in -search_depth..=search_depth {
            let offset = Vec2::new(i as f64 * particle_spacing, j as f64 * particle_spacing);
            let distance = offset.norm();
            if distance < cutoff_radius {
                sigma += kernel.w(distance);
            }
        }
    }
    sigma
}

fn reference_number_density_3d(kernel: &dyn SmoothingKernel, particle_spacing: f64) -> f64 {
    let cutoff_radius = kernel.cutoff_radius();
    let search_depth = (cutoff_radius / particle_spacing) as i32 + 1;
    let mut sigma = 0.0;
    for k in -search_depth..=search_depth {
        for j in -search_depth..=search_depth {
            for i in -search_depth..=search_depth {
                let offset = Vec3::new(
                    i as f64 * particle_spacing,
                    j as f64 * particle_spacing,
                    k as f64 * particle_spacing,
                );
                let distance = offset.norm();
                if distance < cutoff_radius {
                    sigma += kernel.w(distance);
                }
            }
        }
    }
    sigma
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sph_geometry::Ball;
    use sph_kernel::CubicSpline;

    #[test]
    fn test_reference_scenario_2d() {
        let adaptation = SpatialAdaptation::<2>::new(0.1).unwrap();
        assert_relative_eq!(adaptation.reference_spacing(), 0.1);
        assert_relative_eq!(adaptation.reference_smoothing_length(), 0.13);
        assert_relative_eq!(adaptation.minimum_spacing(), 0.1);
        assert_relative_eq!(adaptation.h_ratio_max(), 1.0);
        let sigma = adaptation.sigma0_ref();
        assert!(sigma.is_finite() && sigma > 0.0);
        // reproducible across runs
        let again = SpatialAdaptation::<2>::new(0.1).unwrap();
        assert_eq!(sigma, again.sigma0_ref());
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(SpatialAdaptation::<2>::new(0.0).is_err());
        assert!(SpatialAdaptation::<2>::with_ratios(0.1, -1.3, 1.0).is_err());
        assert!(SpatialAdaptation::<2>::with_ratios(0.1, 1.3, 0.0).is_err());
        assert!(SpatialAdaptation::<4>::new(0.1).is_err());
    }

    #[test]
    fn test_number_density_grows_with_smoothing_ratio() {
        // denser kernel support covers more lattice points
        let mut previous = 0.0;
        for h_spacing_ratio in [1.0, 1.15, 1.3, 1.6, 2.0] {
            let adaptation =
                SpatialAdaptation::<2>::with_ratios(0.1, h_spacing_ratio, 1.0).unwrap();
            assert!(adaptation.sigma0_ref() >= previous);
            previous = adaptation.sigma0_ref();
        }
    }

    #[test]
    fn test_number_density_scales_with_h_ratio() {
        let adaptation = SpatialAdaptation::<3>::new(0.1).unwrap();
        let sigma = adaptation.sigma0_ref();
        assert_relative_eq!(adaptation.reference_number_density(1.0), sigma);
        assert_relative_eq!(adaptation.reference_number_density(2.0), sigma * 8.0);
    }

    #[test]
    fn test_reset_matches_fresh_construction() {
        let mut adaptation = SpatialAdaptation::<2>::with_ratios(0.1, 1.3, 1.0).unwrap();
        adaptation.reset_adaptation_ratios(1.2, 2.0).unwrap();
        let fresh = SpatialAdaptation::<2>::with_ratios(0.1, 1.2, 2.0).unwrap();
        assert_relative_eq!(adaptation.reference_spacing(), fresh.reference_spacing());
        assert_relative_eq!(
            adaptation.reference_smoothing_length(),
            fresh.reference_smoothing_length()
        );
        assert_relative_eq!(adaptation.sigma0_ref(), fresh.sigma0_ref());
        assert_relative_eq!(adaptation.minimum_spacing(), fresh.minimum_spacing());
        assert_relative_eq!(adaptation.h_ratio_max(), fresh.h_ratio_max());

        // idempotent under repeated identical calls
        let spacing = adaptation.reference_spacing();
        adaptation.reset_adaptation_ratios(1.2, 2.0).unwrap();
        assert_relative_eq!(adaptation.reference_spacing(), spacing);
    }

    #[test]
    fn test_failed_reset_leaves_state_untouched() {
        let mut adaptation = SpatialAdaptation::<2>::new(0.1).unwrap();
        let spacing = adaptation.reference_spacing();
        let sigma = adaptation.sigma0_ref();
        assert!(adaptation.reset_adaptation_ratios(-1.0, 1.0).is_err());
        assert_eq!(adaptation.reference_spacing(), spacing);
        assert_eq!(adaptation.sigma0_ref(), sigma);
    }

    #[test]
    fn test_reset_kernel_recalibrates() {
        let mut adaptation = SpatialAdaptation::<2>::new(0.1).unwrap();
        let wendland_sigma = adaptation.sigma0_ref();
        adaptation.reset_kernel(CubicSpline::<2>::new);
        let spline_sigma = adaptation.sigma0_ref();
        assert!(spline_sigma.is_finite() && spline_sigma > 0.0);
        assert!(spline_sigma != wendland_sigma);
        // ratio resets now rebuild the replacement kernel type
        adaptation.reset_adaptation_ratios(1.3, 1.0).unwrap();
        assert_relative_eq!(adaptation.sigma0_ref(), spline_sigma);
    }

    #[test]
    fn test_level_set_of_degenerate_shape_is_rejected() {
        #[derive(Clone, Copy)]
        struct FlatShape;
        impl Shape<2> for FlatShape {
            fn bounds(&self) -> Aabb<2> {
                Aabb::new(Vec2::new(0.0, 1.0), Vec2::new(2.0, 1.0))
            }
            fn signed_distance(&self, position: &Vec2) -> f64 {
                position.y - 1.0
            }
        }
        let adaptation = SpatialAdaptation::<2>::new(0.1).unwrap();
        let result = adaptation.create_level_set(Arc::new(FlatShape), 1.0);
        assert!(matches!(
            result,
            Err(AdaptationError::DegenerateShapeBounds(_))
        ));
    }

    #[test]
    fn test_level_set_returns_finest_level_only() {
        let adaptation = SpatialAdaptation::<2>::new(0.1).unwrap();
        let shape: Arc<dyn Shape<2>> = Arc::new(Ball::new(Vec2::zeros(), 1.0));
        // min dimension 2.0, spacing 0.1: log10(20) + 2 = 3 levels
        let field = adaptation.create_level_set(shape, 1.0).unwrap();
        assert_eq!(field.total_levels(), 1);
        // coarsest = 0.1 * 2^2 = 0.4, scaffold finest = 0.2, refined = 0.1
        assert_relative_eq!(field.data_spacing(), 0.1);
        assert_relative_eq!(field.signed_distance(&Vec2::new(0.0, 0.0)), -1.0);
    }
}
