//! Bodies, body parts and particle-bound subscriptions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use sph_geometry::Shape;
use sph_math::{Aabb, Vecd};

use crate::{ParticleStore, POSITION};

/// Observer contract for storage sized against a body's particle bound.
///
/// Bodies invoke this synchronously whenever their bound changes; the new
/// bound is passed by value so observers never need to touch the body
/// mid-notification.
pub trait ConfigurationMemories {
    /// Resize internal per-particle storage to the new particle bound,
    /// preserving existing entries.
    fn update_configuration_memories(&mut self, particles_bound: usize);
}

/// Setup-wide context bodies are created in.
#[derive(Debug, Clone, Copy)]
pub struct SphSystem<const D: usize> {
    /// Reference resolution bodies inherit by default.
    pub resolution_ref: f64,
    /// Computational domain.
    pub domain_bounds: Aabb<D>,
}

impl<const D: usize> SphSystem<D> {
    /// Create a system with a reference resolution over a domain.
    pub fn new(resolution_ref: f64, domain_bounds: Aabb<D>) -> Self {
        assert!(resolution_ref > 0.0, "reference resolution must be positive");
        Self {
            resolution_ref,
            domain_bounds,
        }
    }
}

/// Shared handle to a real body, as kept by relations.
pub type SharedBody<const D: usize> = Rc<RefCell<RealBody<D>>>;

/// A particle-carrying body.
pub struct RealBody<const D: usize> {
    name: String,
    shape: Arc<dyn Shape<D>>,
    particles: ParticleStore<D>,
    resolution_ref: f64,
    observers: Vec<Weak<RefCell<dyn ConfigurationMemories>>>,
}

impl<const D: usize> RealBody<D> {
    /// Create a body in a system; registers the position variable.
    pub fn new(system: &SphSystem<D>, name: impl Into<String>, shape: Arc<dyn Shape<D>>) -> Self {
        let mut particles = ParticleStore::new();
        particles.register_vector_variable(POSITION, Vecd::<D>::zeros());
        Self {
            name: name.into(),
            shape,
            particles,
            resolution_ref: system.resolution_ref,
            observers: Vec::new(),
        }
    }

    /// Create a body wrapped in the shared handle relations keep.
    pub fn shared(
        system: &SphSystem<D>,
        name: impl Into<String>,
        shape: Arc<dyn Shape<D>>,
    ) -> SharedBody<D> {
        Rc::new(RefCell::new(Self::new(system, name, shape)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The body's own shape.
    pub fn shape(&self) -> &Arc<dyn Shape<D>> {
        &self.shape
    }

    /// System reference resolution the body inherited.
    pub fn resolution_ref(&self) -> f64 {
        self.resolution_ref
    }

    pub fn particles(&self) -> &ParticleStore<D> {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleStore<D> {
        &mut self.particles
    }

    /// Subscribe storage to this body's particle-bound changes.
    pub fn subscribe(&mut self, observer: Weak<RefCell<dyn ConfigurationMemories>>) {
        self.observers.push(observer);
    }

    /// Add alive particles, notifying subscribers if the bound grew.
    pub fn add_real_particles(&mut self, count: usize) {
        if self.particles.add_real_particles(count) {
            self.notify_configuration_memories();
        }
    }

    /// Grow the particle bound, notifying subscribers on change.
    pub fn reserve_real_particles(&mut self, bound: usize) {
        if self.particles.resize_real_particles_bound(bound) {
            self.notify_configuration_memories();
        }
    }

    fn notify_configuration_memories(&mut self) {
        let bound = self.particles.real_particles_bound();
        log::debug!("body {}: particle bound changed to {bound}", self.name);
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                observer.borrow_mut().update_configuration_memories(bound);
                true
            }
            None => false,
        });
    }
}

/// Handle to any body a relation may be pointed at.
///
/// Only real bodies carry particles; virtual bodies are geometry-only
/// stand-ins (probes, fixtures) that relations must not bind to.
#[derive(Clone)]
pub enum BodyRef<const D: usize> {
    Real(SharedBody<D>),
    Virtual(String),
}

impl<const D: usize> BodyRef<D> {
    /// The real body behind this handle, if it carries particles.
    pub fn as_real(&self) -> Option<&SharedBody<D>> {
        match self {
            BodyRef::Real(body) => Some(body),
            BodyRef::Virtual(_) => None,
        }
    }
}

/// A named region of an owning body.
#[derive(Clone)]
pub struct BodyPart<const D: usize> {
    pub name: String,
    pub owner: BodyRef<D>,
}

impl<const D: usize> BodyPart<D> {
    /// Create a part of an owning body.
    pub fn new(name: impl Into<String>, owner: BodyRef<D>) -> Self {
        Self {
            name: name.into(),
            owner,
        }
    }
}

/// Map body parts to the real bodies that own them.
///
/// Parts owned by virtual bodies are dropped, so a mixed list never turns
/// into a runtime fault downstream.
pub fn body_parts_to_real_bodies<const D: usize>(parts: &[BodyPart<D>]) -> Vec<SharedBody<D>> {
    parts
        .iter()
        .filter_map(|part| part.owner.as_real().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sph_geometry::Ball;
    use sph_math::Vec2;

    fn test_system() -> SphSystem<2> {
        SphSystem::new(
            0.1,
            Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
        )
    }

    fn test_shape() -> Arc<dyn Shape<2>> {
        Arc::new(Ball::new(Vec2::zeros(), 0.5))
    }

    struct CountingMemories {
        bound_seen: usize,
        calls: usize,
    }

    impl ConfigurationMemories for CountingMemories {
        fn update_configuration_memories(&mut self, particles_bound: usize) {
            self.bound_seen = particles_bound;
            self.calls += 1;
        }
    }

    #[test]
    fn test_body_inherits_system_resolution() {
        let body = RealBody::new(&test_system(), "water", test_shape());
        assert_eq!(body.resolution_ref(), 0.1);
        assert!(body.particles().vector(POSITION).is_some());
    }

    #[test]
    fn test_subscribers_notified_on_growth() {
        let mut body = RealBody::new(&test_system(), "water", test_shape());
        let memories = Rc::new(RefCell::new(CountingMemories {
            bound_seen: 0,
            calls: 0,
        }));
        let memories_dyn: Rc<RefCell<dyn ConfigurationMemories>> = memories.clone();
        body.subscribe(Rc::downgrade(&memories_dyn));

        body.add_real_particles(4);
        assert_eq!(memories.borrow().bound_seen, 4);
        assert_eq!(memories.borrow().calls, 1);

        // no growth, no notification
        body.reserve_real_particles(2);
        assert_eq!(memories.borrow().calls, 1);

        body.reserve_real_particles(10);
        assert_eq!(memories.borrow().bound_seen, 10);
        assert_eq!(memories.borrow().calls, 2);
    }

    #[test]
    fn test_dead_subscribers_are_pruned() {
        let mut body = RealBody::new(&test_system(), "water", test_shape());
        let memories = Rc::new(RefCell::new(CountingMemories {
            bound_seen: 0,
            calls: 0,
        }));
        let memories_dyn: Rc<RefCell<dyn ConfigurationMemories>> = memories.clone();
        body.subscribe(Rc::downgrade(&memories_dyn));
        drop(memories_dyn);
        drop(memories);
        // must not panic on the dangling observer
        body.add_real_particles(1);
    }

    #[test]
    fn test_body_parts_filter_to_real_bodies() {
        let system = test_system();
        let water = RealBody::shared(&system, "water", test_shape());
        let parts = vec![
            BodyPart::new("inlet", BodyRef::Real(water.clone())),
            BodyPart::new("probe", BodyRef::Virtual("gauge".to_string())),
            BodyPart::new("outlet", BodyRef::Real(water.clone())),
        ];
        let real = body_parts_to_real_bodies(&parts);
        assert_eq!(real.len(), 2);
        assert!(Rc::ptr_eq(&real[0], &water));
    }
}
