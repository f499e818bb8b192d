//! Cubic B-spline (M4) kernel.

use std::f64::consts::PI;

use crate::SmoothingKernel;

const KERNEL_SIZE: f64 = 2.0;

/// Cubic B-spline kernel with support `2h`.
///
/// The classic piecewise-cubic SPH kernel; shipped as an alternative
/// compact-support kernel that can be swapped into an adaptation.
#[derive(Debug, Clone, Copy)]
pub struct CubicSpline<const D: usize> {
    h: f64,
    inv_h: f64,
    factor: f64,
}

impl<const D: usize> CubicSpline<D> {
    /// Create the kernel for smoothing length `h`.
    pub fn new(h: f64) -> Self {
        assert!(h > 0.0, "smoothing length must be positive");
        let inv_h = 1.0 / h;
        let factor = match D {
            1 => inv_h,
            2 => 15.0 / (7.0 * PI) * inv_h * inv_h,
            3 => 3.0 / (2.0 * PI) * inv_h * inv_h * inv_h,
            _ => panic!("cubic spline kernel supports dimensions 1 to 3"),
        };
        Self { h, inv_h, factor }
    }

    fn profile(q: f64) -> f64 {
        if q < 1.0 {
            2.0 / 3.0 - q * q + 0.5 * q * q * q
        } else if q < KERNEL_SIZE {
            let base = 2.0 - q;
            base * base * base / 6.0
        } else {
            0.0
        }
    }

    fn profile_derivative(q: f64) -> f64 {
        if q < 1.0 {
            -2.0 * q + 1.5 * q * q
        } else if q < KERNEL_SIZE {
            let base = 2.0 - q;
            -0.5 * base * base
        } else {
            0.0
        }
    }
}

impl<const D: usize> SmoothingKernel for CubicSpline<D> {
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
