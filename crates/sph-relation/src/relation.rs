//! Inner and contact relations.

use std::cell::RefCell;
use std::rc::Rc;

use rayon::prelude::*;

use sph_particles::{body_parts_to_real_bodies, BodyPart, ConfigurationMemories, SharedBody};

use crate::neighborhood::Neighborhood;

/// Within-body neighbor relation.
///
/// Owns one neighborhood per particle of its body, sized to the body's
/// particle bound. Subscribes to the body on construction so the storage
/// follows every bound change.
pub struct InnerRelation<const D: usize> {
    body: SharedBody<D>,
    inner_configuration: Vec<Neighborhood<D>>,
}

impl<const D: usize> InnerRelation<D> {
    /// Create the relation, subscribe it to the body and size its storage.
    pub fn new(body: &SharedBody<D>) -> Rc<RefCell<Self>> {
        let relation = Rc::new(RefCell::new(Self {
            body: body.clone(),
            inner_configuration: Vec::new(),
        }));
        let bound = {
            let mut body_mut = body.borrow_mut();
            let relation_dyn: Rc<RefCell<dyn ConfigurationMemories>> = relation.clone();
            body_mut.subscribe(Rc::downgrade(&relation_dyn));
            body_mut.particles().real_particles_bound()
        };
        relation.borrow_mut().update_configuration_memories(bound);
        relation
    }

    /// The body this relation belongs to.
    pub fn body(&self) -> &SharedBody<D> {
        &self.body
    }

    /// Neighbor list of one particle.
    pub fn neighborhood(&self, index: usize) -> &Neighborhood<D> {
        &self.inner_configuration[index]
    }

    /// Mutable neighbor list of one particle, for the search routine.
    pub fn neighborhood_mut(&mut self, index: usize) -> &mut Neighborhood<D> {
        &mut self.inner_configuration[index]
    }

    /// All neighbor lists, one per particle bound slot.
    pub fn inner_configuration(&self) -> &[Neighborhood<D>] {
        &self.inner_configuration
    }

    /// Invalidate every alive particle's neighbor list for this step.
    ///
    /// Runs in parallel over contiguous index partitions; each partition
    /// writes only its own entries, so the pass needs no locking. Returns
    /// after the implicit barrier, before the search pass starts.
    pub fn reset_neighborhood_current_size(&mut self) {
        let total_real = self.body.borrow().particles().total_real_particles();
        self.inner_configuration[..total_real]
            .par_iter_mut()
            .for_each(Neighborhood::reset);
    }
}

impl<const D: usize> ConfigurationMemories for InnerRelation<D> {
    fn update_configuration_memories(&mut self, particles_bound: usize) {
        if particles_bound > self.inner_configuration.len() {
            // the body may still be mutably borrowed mid-notification,
            // so only local state is touched here
            log::debug!(
                "inner relation: {} -> {particles_bound} neighborhoods",
                self.inner_configuration.len()
            );
            self.inner_configuration
                .resize_with(particles_bound, Neighborhood::default);
        }
    }
}

/// Cross-body neighbor relation.
///
/// Binds an owning body to an ordered list of contact bodies and owns one
/// neighborhood array per contact body, each sized to the owner's particle
/// bound.
pub struct ContactRelation<const D: usize> {
    body: SharedBody<D>,
    contact_bodies: Vec<SharedBody<D>>,
    contact_configuration: Vec<Vec<Neighborhood<D>>>,
}

impl<const D: usize> ContactRelation<D> {
    /// Create the relation, subscribe it to the owning body and size its
    /// storage. Only real bodies may appear in `contact_bodies`.
    pub fn new(body: &SharedBody<D>, contact_bodies: Vec<SharedBody<D>>) -> Rc<RefCell<Self>> {
        let contact_count = contact_bodies.len();
        let relation = Rc::new(RefCell::new(Self {
            body: body.clone(),
            contact_bodies,
            contact_configuration: vec![Vec::new(); contact_count],
        }));
        let bound = {
            let mut body_mut = body.borrow_mut();
            let relation_dyn: Rc<RefCell<dyn ConfigurationMemories>> = relation.clone();
            body_mut.subscribe(Rc::downgrade(&relation_dyn));
            body_mut.particles().real_particles_bound()
        };
        relation.borrow_mut().update_configuration_memories(bound);
        relation
    }

    /// Create the relation against body parts, keeping only the real
    /// bodies among their owners.
    pub fn from_body_parts(body: &SharedBody<D>, parts: &[BodyPart<D>]) -> Rc<RefCell<Self>> {
        Self::new(body, body_parts_to_real_bodies(parts))
    }

    /// The owning body.
    pub fn body(&self) -> &SharedBody<D> {
        &self.body
    }

    /// The contact bodies, in relation order.
    pub fn contact_bodies(&self) -> &[SharedBody<D>] {
        &self.contact_bodies
    }

    /// Neighbor lists against one contact body, one per owner bound slot.
    pub fn contact_configuration(&self, contact_index: usize) -> &[Neighborhood<D>] {
        &self.contact_configuration[contact_index]
    }

    /// Mutable neighbor list of one owner particle against one contact
    /// body, for the search routine.
    pub fn neighborhood_mut(
        &mut self,
        contact_index: usize,
        particle_index: usize,
    ) -> &mut Neighborhood<D> {
        &mut self.contact_configuration[contact_index][particle_index]
    }

    /// Invalidate every alive owner particle's neighbor lists, per contact
    /// body, for this step.
    pub fn reset_neighborhood_current_size(&mut self) {
        let total_real = self.body.borrow().particles().total_real_particles();
        for configuration in &mut self.contact_configuration {
            configuration[..total_real]
                .par_iter_mut()
                .for_each(Neighborhood::reset);
        }
    }
}

impl<const D: usize> ConfigurationMemories for ContactRelation<D> {
    fn update_configuration_memories(&mut self, particles_bound: usize) {
        for configuration in &mut self.contact_configuration {
            if particles_bound > configuration.len() {
                configuration.resize_with(particles_bound, Neighborhood::default);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighborhood::NeighborRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    use sph_geometry::{Ball, Shape};
    use sph_math::{Aabb, Vec2};
    use sph_particles::{BodyRef, RealBody, SphSystem};

    fn test_system() -> SphSystem<2> {
        SphSystem::new(
            0.1,
            Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
        )
    }

    fn shared_body(name: &str, particles: usize) -> SharedBody<2> {
        let shape: Arc<dyn Shape<2>> = Arc::new(Ball::new(Vec2::zeros(), 0.5));
        let body = RealBody::shared(&test_system(), name, shape);
        body.borrow_mut().add_real_particles(particles);
        body
    }

    fn record(index: usize) -> NeighborRecord<2> {
        NeighborRecord {
            index,
            distance: 0.05,
            weight: 2.0,
            weight_gradient: Vec2::new(0.0, 1.0),
        }
    }

    #[test]
    fn test_inner_relation_sizes_to_body() {
        let body = shared_body("water", 5);
        let relation = InnerRelation::new(&body);
        assert_eq!(relation.borrow().inner_configuration().len(), 5);
    }

    #[test]
    fn test_inner_relation_follows_particle_growth() {
        let body = shared_body("water", 3);
        let relation = InnerRelation::new(&body);

        relation.borrow_mut().neighborhood_mut(0).push(record(1));
        body.borrow_mut().add_real_particles(4);

        let relation = relation.borrow();
        assert_eq!(relation.inner_configuration().len(), 7);
        // old entries keep their storage, new ones start empty
        assert_eq!(relation.neighborhood(0).current_size(), 1);
        for index in 3..7 {
            assert_eq!(relation.neighborhood(index).current_size(), 0);
            assert_eq!(relation.neighborhood(index).capacity(), 0);
        }
    }

    #[test]
    fn test_reset_zeroes_every_alive_neighborhood() {
        let body = shared_body("water", 64);
        let relation = InnerRelation::new(&body);

        let mut rng = StdRng::seed_from_u64(7);
        {
            let mut relation = relation.borrow_mut();
            for index in 0..64 {
                for neighbor in 0..rng.random_range(0..8) {
                    relation.neighborhood_mut(index).push(record(neighbor));
                }
            }
        }

        relation.borrow_mut().reset_neighborhood_current_size();
        let relation = relation.borrow();
        assert!(relation
            .inner_configuration()
            .iter()
            .all(|neighborhood| neighborhood.current_size() == 0));
    }

    #[test]
    fn test_contact_relation_one_array_per_contact_body() {
        let owner = shared_body("water", 4);
        let wall = shared_body("wall", 9);
        let lid = shared_body("lid", 2);
        let relation = ContactRelation::new(&owner, vec![wall, lid]);

        let relation = relation.borrow();
        assert_eq!(relation.contact_bodies().len(), 2);
        // both arrays sized to the owner's bound, not the contact bodies'
        assert_eq!(relation.contact_configuration(0).len(), 4);
        assert_eq!(relation.contact_configuration(1).len(), 4);
    }

    #[test]
    fn test_contact_relation_filters_virtual_owners() {
        let owner = shared_body("water", 4);
        let wall = shared_body("wall", 3);
        let parts = vec![
            BodyPart::new("wall surface", BodyRef::Real(wall.clone())),
            BodyPart::new("gauge", BodyRef::Virtual("probe".to_string())),
        ];
        let relation = ContactRelation::from_body_parts(&owner, &parts);
        assert_eq!(relation.borrow().contact_bodies().len(), 1);
        assert!(Rc::ptr_eq(&relation.borrow().contact_bodies()[0], &wall));
    }

    #[test]
    fn test_contact_relation_growth_and_reset() {
        let owner = shared_body("water", 2);
        let wall = shared_body("wall", 3);
        let relation = ContactRelation::new(&owner, vec![wall]);

        relation.borrow_mut().neighborhood_mut(0, 1).push(record(0));
        owner.borrow_mut().add_real_particles(3);
        assert_eq!(relation.borrow().contact_configuration(0).len(), 5);

        relation.borrow_mut().reset_neighborhood_current_size();
        let relation = relation.borrow();
        assert!(relation
            .contact_configuration(0)
            .iter()
            .all(|neighborhood| neighborhood.current_size() == 0));
        // capacity survives the reset
        assert_eq!(relation.contact_configuration(0)[1].capacity(), 1);
    }
}
