//! Particle storage and bodies.
//!
//! A particle store keeps named per-particle arrays (scalar and vector)
//! with defaults, a sortable-variable registry that carries arrays through
//! particle reordering, and the real-particle counts every consumer sizes
//! against. Real bodies own one store each and fan particle-bound changes
//! out to subscribed configuration memories.

pub mod body;
pub mod store;

pub use body::{
    body_parts_to_real_bodies, BodyPart, BodyRef, ConfigurationMemories, RealBody, SharedBody,
    SphSystem,
};
pub use store::ParticleStore;

/// Name of the per-particle position variable every real body registers.
pub const POSITION: &str = "position";

/// Name of the per-particle smoothing-length-ratio variable registered by
/// locally refined adaptations.
pub const SMOOTHING_LENGTH_RATIO: &str = "smoothing_length_ratio";
