//! Smoothing kernels for particle discretizations.
//!
//! All shipped kernels are radially symmetric with compact support
//! `kernel_size * h`, and their weights are normalized per spatial
//! dimension so the kernel integrates to one over its support.

pub mod cubic;
pub mod wendland;

pub use cubic::CubicSpline;
pub use wendland::WendlandC2;

/// Radially symmetric smoothing weight function.
///
/// The weight is exactly zero at and beyond the cutoff radius; callers may
/// still skip evaluation outside the cutoff for speed.
pub trait SmoothingKernel {
    /// Smoothing length h.
    fn smoothing_length(&self) -> f64;

    /// Support radius in units of the smoothing length.
    fn kernel_size(&self) -> f64;

    /// Physical support radius, `kernel_size * h`.
    fn cutoff_radius(&self) -> f64 {
        self.kernel_size() * self.smoothing_length()
    }

    /// Weight at distance `r`.
    fn w(&self, r: f64) -> f64;

    /// Radial derivative dW/dr at distance `r`.
    fn dw(&self, r: f64) -> f64;

    /// Dimensionless 1-D profile at normalized distance `q = r / h`.
    ///
    /// `w_1d(q) / w_1d(0.0)` decays smoothly from one at the origin to
    /// zero at the support boundary, independent of the smoothing length.
    fn w_1d(&self, q: f64) -> f64;
}
