//! Wendland C2 kernel.

use std::f64::consts::PI;

use crate::SmoothingKernel;

const KERNEL_SIZE: f64 = 2.0;

/// Wendland C2 kernel with support `2h`, profile `(1 - q/2)^4 (1 + 2q)`.
///
/// The default kernel for adaptive discretizations: positive definite,
/// free of the pairing instability, and cheap to evaluate.
#[derive(Debug, Clone, Copy)]
pub struct WendlandC2<const D: usize> {
    h: f64,
    inv_h: f64,
    factor: f64,
}

impl<const D: usize> WendlandC2<D> {
    /// Create the kernel for smoothing length `h`.
    pub fn new(h: f64) -> Self {
        assert!(h > 0.0, "smoothing length must be positive");
        let inv_h = 1.0 / h;
        let factor = match D {
            1 => 3.0 / 4.0 * inv_h,
            2 => 7.0 / (4.0 * PI) * inv_h * inv_h,
            3 => 21.0 / (16.0 * PI) * inv_h * inv_h * inv_h,
            _ => panic!("Wendland C2 kernel supports dimensions 1 to 3"),
        };
        Self { h, inv_h, factor }
    }

    fn profile(q: f64) -> f64 {
        if q < KERNEL_SIZE {
            let base = 1.0 - 0.5 * q;
            base.powi(4) * (1.0 + 2.0 * q)
        } else {
            0.0
        }
    }

    fn profile_derivative(q: f64) -> f64 {
        if q < KERNEL_SIZE {
            let base = 1.0 - 0.5 * q;
            -5.0 * q * base.powi(3)
        } else {
            0.0
        }
    }
}

impl<const D: usize> SmoothingKernel for WendlandC2<D> {
    fn smoothing_length(&self) -> f64 {
        self.h
    }

    fn kernel_size(&self) -> f64 {
        KERNEL_SIZE
    }

    fn w(&self, r: f64) -> f64 {
        self.factor * Self::profile(r * self.inv_h)
    }

    fn dw(&self, r: f64) -> f64 {
        self.factor * self.inv_h * Self::profile_derivative(r * self.inv_h)
    }

    fn w_1d(&self, q: f64) -> f64 {
        Self::profile(q)
    }
}
