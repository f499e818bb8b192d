//! Named per-particle variable storage.

use std::collections::HashMap;

use sph_math::Vecd;

#[derive(Debug, Clone)]
struct ScalarVariable {
    values: Vec<f64>,
    default: f64,
}

#[derive(Debug, Clone)]
struct VectorVariable<const D: usize> {
    values: Vec<Vecd<D>>,
    default: Vecd<D>,
}

/// Per-particle arrays for one body.
///
/// `total_real_particles` counts the particles currently alive;
/// `real_particles_bound` is the array length everything is sized to and
/// only ever grows. Registered variables are keyed by name; variables
/// marked sortable are permuted together whenever particles are reordered,
/// so they stay attached to the particle they describe.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore<const D: usize> {
    total_real_particles: usize,
    real_particles_bound: usize,
    scalars: HashMap<String, ScalarVariable>,
    vectors: HashMap<String, VectorVariable<D>>,
    sortable_scalars: Vec<String>,
    sortable_vectors: Vec<String>,
}

impl<const D: usize> ParticleStore<D> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particles currently alive.
    pub fn total_real_particles(&self) -> usize {
        self.total_real_particles
    }

    /// Length every per-particle array is sized to.
    pub fn real_particles_bound(&self) -> usize {
        self.real_particles_bound
    }

    /// Register a scalar variable filled with `default`. Registering an
    /// existing name keeps the stored values untouched.
    pub fn register_scalar_variable(&mut self, name: &str, default: f64) {
        self.scalars.entry(name.to_string()).or_insert_with(|| ScalarVariable {
            values: vec![default; self.real_particles_bound],
            default,
        });
    }

    /// Register a vector variable filled with `default`. Registering an
    /// existing name keeps the stored values untouched.
    pub fn register_vector_variable(&mut self, name: &str, default: Vecd<D>) {
        self.vectors.entry(name.to_string()).or_insert_with(|| VectorVariable {
            values: vec![default; self.real_particles_bound],
            default,
        });
    }

    /// Mark a registered scalar variable to be carried through reordering.
    pub fn register_sortable_scalar(&mut self, name: &str) {
        assert!(
            self.scalars.contains_key(name),
            "unknown scalar variable {name}"
        );
        if !self.sortable_scalars.iter().any(|n| n == name) {
            self.sortable_scalars.push(name.to_string());
        }
    }

    /// Mark a registered vector variable to be carried through reordering.
    pub fn register_sortable_vector(&mut self, name: &str) {
        assert!(
            self.vectors.contains_key(name),
            "unknown vector variable {name}"
        );
        if !self.sortable_vectors.iter().any(|n| n == name) {
            self.sortable_vectors.push(name.to_string());
        }
    }

    /// Values of a scalar variable, `real_particles_bound` entries.
    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(|v| v.values.as_slice())
    }

    /// Mutable values of a scalar variable.
    pub fn scalar_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        self.scalars.get_mut(name).map(|v| v.values.as_mut_slice())
    }

    /// Values of a vector variable, `real_particles_bound` entries.
    pub fn vector(&self, name: &str) -> Option<&[Vecd<D>]> {
        self.vectors.get(name).map(|v| v.values.as_slice())
    }

    /// Mutable values of a vector variable.
    pub fn vector_mut(&mut self, name: &str) -> Option<&mut [Vecd<D>]> {
        self.vectors.get_mut(name).map(|v| v.values.as_mut_slice())
    }

    /// Grow every per-particle array to `bound` with its default.
    ///
    /// Returns true if the bound changed; shrinking is never performed.
    pub fn resize_real_particles_bound(&mut self, bound: usize) -> bool {
        if bound <= self.real_particles_bound {
            return false;
        }
        for variable in self.scalars.values_mut() {
            variable.values.resize(bound, variable.default);
        }
        for variable in self.vectors.values_mut() {
            variable.values.resize(bound, variable.default);
        }
        log::debug!(
            "particle store bound grown {} -> {bound}",
            self.real_particles_bound
        );
        self.real_particles_bound = bound;
        true
    }

    /// Add `count` alive particles, growing the bound when exceeded.
    ///
    /// Returns true if the bound grew.
    pub fn add_real_particles(&mut self, count: usize) -> bool {
        self.total_real_particles += count;
        let total = self.total_real_particles;
        self.resize_real_particles_bound(total)
    }

    /// Reorder the alive range of every sortable variable.
    ///
    /// `permutation[i]` names the old slot whose values end up in slot `i`;
    /// all sortable arrays move together so particle identity survives.
    pub fn apply_permutation(&mut self, permutation: &[usize]) {
        debug_assert_eq!(permutation.len(), self.total_real_particles);
        for name in &self.sortable_scalars {
            let variable = self
                .scalars
                .get_mut(name)
                .expect("sortable names are registered");
            let reordered: Vec<f64> = permutation.iter().map(|&j| variable.values[j]).collect();
            variable.values[..reordered.len()].copy_from_slice(&reordered);
        }
        for name in &self.sortable_vectors {
            let variable = self
                .vectors
                .get_mut(name)
                .expect("sortable names are registered");
            let reordered: Vec<Vecd<D>> = permutation.iter().map(|&j| variable.values[j]).collect();
            variable.values[..reordered.len()].copy_from_slice(&reordered);
        }
    }
}
