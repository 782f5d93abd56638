//! Trait for probability densities that samplers and grid
//! evaluators can consume without knowing the orbital kind.

use nalgebra::Vector3;

/// A normalized single-particle probability density |psi|^2 over R^3.
pub trait Density {
    /// Probability density at a position, in Bohr coordinates.
    fn probability_density(&self, position: &Vector3<f64>) -> f64;

    /// Radius of the region where most of the density lives. Samplers
    /// scale proposal steps and initial placement to this length.
    fn characteristic_radius(&self) -> f64;

    /// True when a position is close enough to a nucleus that the
    /// density is numerically unreliable there.
    fn excluded(&self, position: &Vector3<f64>) -> bool;

    /// Estimate of the global density maximum, used to normalize
    /// grid fields. Implementations scan their own geometry.
    fn max_density(&self) -> f64;
}
