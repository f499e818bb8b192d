//! Neighbor-relation storage.
//!
//! Relations own the per-particle neighbor lists the external search fills
//! each step and every interaction kernel reads: one list per particle for
//! within-body ("inner") interactions, one list array per contact body for
//! cross-body interactions. The relation tracks its body's particle bound
//! reactively and resets list sizes in parallel before each search pass.

pub mod neighborhood;
pub mod relation;

pub use neighborhood::{NeighborRecord, Neighborhood};
pub use relation::{ContactRelation, InnerRelation};

pub use sph_particles::ConfigurationMemories;
