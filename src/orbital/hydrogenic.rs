//! Hydrogen-like orbitals under an effective nuclear charge.
//!
//! Exact bound-state solutions psi_{nlm} = R_{nl}(r) * Y_{lm}(theta, phi)
//! in Hartree atomic units, with real-valued spherical harmonics.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

use crate::error::ValidationError;
use crate::orbital::quantum::QuantumState;
use crate::orbital::traits::Density;
use crate::special::{associated_legendre, factorial, generalized_laguerre};

/// Bound-state energy in Hartree: E = -Z^2 / (2 n^2).
#[inline]
pub fn energy(effective_charge: f64, n: u32) -> f64 {
    let n = f64::from(n);
    -(effective_charge * effective_charge) / (2.0 * n * n)
}

/// A single hydrogen-like orbital with its screening-adjusted charge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HydrogenicOrbital {
    effective_charge: f64,
    state: QuantumState,
}

impl HydrogenicOrbital {
    pub fn new(effective_charge: f64, state: QuantumState) -> Result<Self, ValidationError> {
        state.validate()?;
        if effective_charge <= 0.0 {
            return Err(ValidationError::NonPositiveEffectiveCharge(effective_charge));
        }
        Ok(Self { effective_charge, state })
    }

    pub fn state(&self) -> QuantumState {
        self.state
    }

    pub fn effective_charge(&self) -> f64 {
        self.effective_charge
    }

    /// Orbital energy in Hartree.
    pub fn energy(&self) -> f64 {
        energy(self.effective_charge, self.state.n)
    }

    /// Radial part R_{nl}(r), r in Bohr radii.
    ///
    /// R = N * rho^l * exp(-rho/2) * L_{n-l-1}^{2l+1}(rho) with
    /// rho = 2 Z r / n and the standard normalization
    /// N = sqrt((2Z/n)^3 (n-l-1)! / (2n (n+l)!)).
    pub fn radial(&self, r: f64) -> f64 {
        let z = self.effective_charge;
        let n = f64::from(self.state.n);
        let l = self.state.l;
        let rho = 2.0 * z * r / n;

        let norm = ((2.0 * z / n).powi(3) * factorial((self.state.n - l - 1) as i32)
            / (2.0 * n * factorial((self.state.n + l) as i32)))
        .sqrt();
        let laguerre =
            generalized_laguerre(self.state.n - l - 1, 2.0 * f64::from(l) + 1.0, rho);

        norm * rho.powi(l as i32) * (-rho / 2.0).exp() * laguerre
    }

    /// Real spherical harmonic Y_{lm}(theta, phi).
    ///
    /// m = 0 uses P_l^0 directly; m > 0 and m < 0 pick the cos(m phi)
    /// and sin(|m| phi) combinations with a sqrt(2) factor. The
    /// Condon-Shortley phase is carried by the Legendre recurrence.
    pub fn angular(&self, theta: f64, phi: f64) -> f64 {
        let l = self.state.l;
        let m = self.state.m;
        let m_abs = m.unsigned_abs();

        let norm = ((f64::from(2 * l + 1) / (4.0 * PI))
            * (factorial((l - m_abs) as i32) / factorial((l + m_abs) as i32)))
        .sqrt();
        let legendre = associated_legendre(l, m_abs as i32, theta.cos());

        if m == 0 {
            norm * legendre
        } else if m > 0 {
            SQRT_2 * norm * legendre * (f64::from(m_abs) * phi).cos()
        } else {
            SQRT_2 * norm * legendre * (f64::from(m_abs) * phi).sin()
        }
    }

    /// Wavefunction value at a Cartesian position (Bohr radii).
    ///
    /// At the origin the polar angle is taken as 0 so that s orbitals
    /// keep their finite on-nucleus value.
    pub fn evaluate(&self, position: &Vector3<f64>) -> f64 {
        let r = position.norm();
        let theta = if r > 0.0 {
            (position.z / r).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        let phi = position.y.atan2(position.x);
        self.radial(r) * self.angular(theta, phi)
    }

    /// |psi|^2 at a Cartesian position.
    pub fn probability_density(&self, position: &Vector3<f64>) -> f64 {
        self.evaluate(position).powi(2)
    }

    /// Radius below which density evaluation is considered unstable.
    pub fn exclusion_radius(&self) -> f64 {
        0.02 * f64::from(self.state.n) + 0.01 * (2.0 * self.effective_charge).cbrt()
    }

    fn density_spherical(&self, r: f64, theta: f64, phi: f64) -> f64 {
        (self.radial(r) * self.angular(theta, phi)).powi(2)
    }
}

impl Density for HydrogenicOrbital {
    fn probability_density(&self, position: &Vector3<f64>) -> f64 {
        HydrogenicOrbital::probability_density(self, position)
    }

    fn characteristic_radius(&self) -> f64 {
        f64::from(self.state.n * self.state.n) / self.effective_charge
    }

    fn excluded(&self, position: &Vector3<f64>) -> bool {
        position.norm() < self.exclusion_radius()
    }

    /// Scan an (r, theta) grid with quadratic radial spacing, at the
    /// azimuth where the |m|-dependent factor peaks. The azimuthal
    /// factor is bounded by 1, so this covers the global maximum.
    fn max_density(&self) -> f64 {
        const RADIAL_STEPS: u32 = 96;
        const POLAR_STEPS: u32 = 32;

        let scan_radius = 3.0 * self.characteristic_radius();
        let phi_peak = if self.state.m >= 0 {
            0.0
        } else {
            PI / (2.0 * f64::from(self.state.m.unsigned_abs()))
        };

        let mut max = 1e-30_f64;
        for i in 0..=RADIAL_STEPS {
            let t = f64::from(i) / f64::from(RADIAL_STEPS);
            let r = scan_radius * t * t;
            for j in 0..=POLAR_STEPS {
                let theta = PI * f64::from(j) / f64::from(POLAR_STEPS);
                max = max.max(self.density_spherical(r, theta, phi_peak));
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::quantum::Spin;
    use approx::assert_relative_eq;

    fn orbital(z: f64, n: u32, l: u32, m: i32) -> HydrogenicOrbital {
        HydrogenicOrbital::new(z, QuantumState::new(n, l, m, Spin::Up).unwrap()).unwrap()
    }

    #[test]
    fn test_energy_exact() {
        assert_eq!(energy(1.0, 1), -0.5);
        assert_eq!(energy(2.0, 1), -2.0);
        assert_eq!(orbital(1.0, 2, 1, 0).energy(), -0.125);
        assert_relative_eq!(orbital(3.0, 3, 0, 0).energy(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ground_state_values() {
        let psi = orbital(1.0, 1, 0, 0);
        // R_10(r) = 2 exp(-r), Y_00 = 1/sqrt(4 pi)
        assert_relative_eq!(psi.radial(0.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(psi.radial(1.0), 2.0 * (-1.0_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(psi.angular(0.7, 1.3), 0.5 / PI.sqrt(), epsilon = 1e-12);
        let at_origin = psi.evaluate(&Vector3::zeros());
        assert_relative_eq!(at_origin, 1.0 / PI.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            psi.probability_density(&Vector3::zeros()),
            1.0 / PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_radial_node_of_2s() {
        let psi = orbital(1.0, 2, 0, 0);
        // single radial node at r = 2 Bohr
        assert!(psi.radial(2.0).abs() < 1e-12);
        assert!(psi.radial(1.0) > 0.0);
        assert!(psi.radial(3.0) < 0.0);
    }

    #[test]
    fn test_radial_normalization() {
        // integral of R^2 r^2 dr over [0, inf) is 1
        for &(z, n, l) in &[(1.0, 1, 0), (1.0, 2, 1), (2.5, 3, 2), (1.0, 4, 0)] {
            let psi = orbital(z, n, l, 0);
            let upper = 60.0 * f64::from(n * n) / z;
            let steps = 20_000;
            let dr = upper / steps as f64;
            let mut sum = 0.0;
            for i in 0..steps {
                let r = (i as f64 + 0.5) * dr;
                let val = psi.radial(r);
                sum += val * val * r * r * dr;
            }
            assert_relative_eq!(sum, 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_density_is_square_of_amplitude() {
        let psi = orbital(2.0, 3, 2, -1);
        let p = Vector3::new(1.1, -0.4, 2.3);
        let amp = psi.evaluate(&p);
        assert_relative_eq!(psi.probability_density(&p), amp * amp, epsilon = 1e-15);
    }

    #[test]
    fn test_s_orbital_spherical_symmetry() {
        let psi = orbital(1.0, 2, 0, 0);
        let r = 1.3;
        let reference = psi.probability_density(&Vector3::new(r, 0.0, 0.0));
        let directions = [
            Vector3::new(0.0, r, 0.0),
            Vector3::new(0.0, 0.0, r),
            Vector3::new(r / 3.0_f64.sqrt(), r / 3.0_f64.sqrt(), -r / 3.0_f64.sqrt()),
            Vector3::new(-r, 0.0, 0.0),
        ];
        for p in &directions {
            assert!((psi.probability_density(p) - reference).abs() < 1e-10);
        }
    }

    #[test]
    fn test_2pz_nodal_plane() {
        let psi = orbital(1.0, 2, 1, 0);
        for &(x, y) in &[(0.7, -0.3), (2.0, 0.0), (-1.5, 1.5), (0.01, 4.0)] {
            assert!(psi.evaluate(&Vector3::new(x, y, 0.0)).abs() < 1e-10);
        }
        // off the plane it is nonzero
        assert!(psi.evaluate(&Vector3::new(0.0, 0.0, 1.0)).abs() > 1e-3);
    }

    #[test]
    fn test_max_density_ground_state() {
        let psi = orbital(1.0, 1, 0, 0);
        // peak sits on the nucleus: |psi(0)|^2 = 1/pi
        assert_relative_eq!(psi.max_density(), 1.0 / PI, epsilon = 1e-9);
    }

    #[test]
    fn test_max_density_2pz() {
        let psi = orbital(1.0, 2, 1, 0);
        // analytic peak at r = 2 on the z axis
        let analytic = psi.probability_density(&Vector3::new(0.0, 0.0, 2.0));
        let scanned = psi.max_density();
        assert!(scanned <= analytic * 1.0001);
        assert!(scanned >= analytic * 0.95);
    }

    #[test]
    fn test_negative_m_peak_found() {
        // sin-branch orbitals vanish at phi = 0; the scan must still
        // find a maximum comparable to the cos-branch twin
        let minus = orbital(1.0, 3, 2, -2);
        let plus = orbital(1.0, 3, 2, 2);
        assert_relative_eq!(minus.max_density(), plus.max_density(), epsilon = 1e-9);
    }

    #[test]
    fn test_exclusion_radius() {
        let psi = orbital(1.0, 1, 0, 0);
        assert!(psi.excluded(&Vector3::zeros()));
        assert!(!psi.excluded(&Vector3::new(1.0, 0.0, 0.0)));
        assert_relative_eq!(
            psi.exclusion_radius(),
            0.02 + 0.01 * 2.0_f64.cbrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rejects_bad_charge() {
        let state = QuantumState::new(1, 0, 0, Spin::Up).unwrap();
        assert!(HydrogenicOrbital::new(0.0, state).is_err());
        assert!(HydrogenicOrbital::new(-1.0, state).is_err());
    }

    #[test]
    fn test_finite_over_supported_range() {
        for n in 1..=7_u32 {
            for l in 0..n {
                for m in -(l as i32)..=(l as i32) {
                    let psi = orbital(8.0, n, l, m);
                    for &r in &[0.0, 0.1, 1.0, 10.0, 60.0] {
                        let p = Vector3::new(r * 0.3, -r * 0.2, r * 0.9);
                        assert!(psi.evaluate(&p).is_finite());
                    }
                }
            }
        }
    }
}
