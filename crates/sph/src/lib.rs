//! Spatial discretization core for smoothed-particle hydrodynamics.
//!
//! This is the umbrella crate re-exporting the public surface of the
//! sub-crates: resolution/refinement/split-merge adaptations, smoothing
//! kernels, signed-distance geometry, background grids, particle storage
//! and neighbor relations.

pub use sph_math::{self, Aabb, Vec2, Vec3, Vecd, EPS};

pub use sph_kernel::{self, CubicSpline, SmoothingKernel, WendlandC2};

pub use sph_geometry::{self, Ball, Block, Shape};

pub use sph_grid::{
    self, CellLinkedList, LevelSet, MultilevelCellLinkedList, MultilevelLevelSet,
    SignedDistanceField, SpatialIndex,
};

pub use sph_particles::{
    self, body_parts_to_real_bodies, BodyPart, BodyRef, ConfigurationMemories, ParticleStore,
    RealBody, SharedBody, SphSystem, POSITION, SMOOTHING_LENGTH_RATIO,
};

pub use sph_adapt::{
    self, Adaptation, AdaptationError, LocalRefinement, RefineByShape, RefinementRegion,
    SpatialAdaptation, SplitAndMerge, DEFAULT_H_SPACING_RATIO,
};

pub use sph_relation::{self, ContactRelation, InnerRelation, NeighborRecord, Neighborhood};
