//! Sigma molecular orbitals from linear combinations of two 1s
//! atomic orbitals, with an analytic overlap integral.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::orbital::hydrogenic::HydrogenicOrbital;
use crate::orbital::quantum::{QuantumState, Spin};
use crate::orbital::traits::Density;

/// Largest overlap magnitude used when normalizing; keeps the
/// antibonding 1/sqrt(2(1-S)) factor finite at short bond lengths.
pub const MAX_OVERLAP: f64 = 0.98;

/// Symmetric or antisymmetric combination of the atomic orbitals.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinationKind {
    Bonding,
    Antibonding,
}

impl CombinationKind {
    pub fn sign(self) -> f64 {
        match self {
            CombinationKind::Bonding => 1.0,
            CombinationKind::Antibonding => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CombinationKind::Bonding => "bonding",
            CombinationKind::Antibonding => "antibonding",
        }
    }
}

/// 1s-1s overlap integral S(R) = exp(-R) (1 + R + R^2/3).
pub fn overlap_integral(bond_length: f64) -> f64 {
    (-bond_length).exp() * (1.0 + bond_length + bond_length * bond_length / 3.0)
}

/// Two-center molecular orbital psi = N (psi_A ± psi_B).
///
/// The nuclei sit on the z axis at ±R/2 around the origin. Densities
/// carry a correlation enhancement factor 1 ± 0.5 S exp(-2 d / R)
/// that raises (bonding) or depletes (antibonding) the mid-bond
/// region, with d the distance from the bond midpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DiatomicOrbital {
    orbital_a: HydrogenicOrbital,
    orbital_b: HydrogenicOrbital,
    bond_length: f64,
    kind: CombinationKind,
    overlap: f64,
    normalization: f64,
}

impl DiatomicOrbital {
    pub fn new(
        charge_a: f64,
        charge_b: f64,
        bond_length: f64,
        kind: CombinationKind,
    ) -> Result<Self, ValidationError> {
        if bond_length <= 0.0 {
            return Err(ValidationError::NonPositiveBondLength(bond_length));
        }
        let ground = QuantumState { n: 1, l: 0, m: 0, spin: Spin::Up };
        let orbital_a = HydrogenicOrbital::new(charge_a, ground)?;
        let orbital_b = HydrogenicOrbital::new(charge_b, ground)?;

        let overlap = overlap_integral(bond_length).clamp(-MAX_OVERLAP, MAX_OVERLAP);
        let normalization = 1.0 / (2.0 * (1.0 + kind.sign() * overlap)).sqrt();

        Ok(Self { orbital_a, orbital_b, bond_length, kind, overlap, normalization })
    }

    pub fn bond_length(&self) -> f64 {
        self.bond_length
    }

    pub fn kind(&self) -> CombinationKind {
        self.kind
    }

    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    pub fn center_a(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -self.bond_length / 2.0)
    }

    pub fn center_b(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.bond_length / 2.0)
    }

    /// Molecular orbital amplitude at a Cartesian position.
    pub fn evaluate(&self, position: &Vector3<f64>) -> f64 {
        let a = self.orbital_a.evaluate(&(position - self.center_a()));
        let b = self.orbital_b.evaluate(&(position - self.center_b()));
        self.normalization * (a + self.kind.sign() * b)
    }

    /// Mid-bond enhancement applied on top of |psi|^2. Bounded to
    /// [1 - 0.5 S, 1 + 0.5 S], so densities stay non-negative.
    pub fn correlation_enhancement(&self, position: &Vector3<f64>) -> f64 {
        let d_mid = position.norm();
        1.0 + self.kind.sign() * 0.5 * self.overlap * (-2.0 * d_mid / self.bond_length).exp()
    }

    /// Electron density |psi|^2 with the correlation enhancement.
    pub fn probability_density(&self, position: &Vector3<f64>) -> f64 {
        self.evaluate(position).powi(2) * self.correlation_enhancement(position)
    }
}

impl Density for DiatomicOrbital {
    fn probability_density(&self, position: &Vector3<f64>) -> f64 {
        DiatomicOrbital::probability_density(self, position)
    }

    fn characteristic_radius(&self) -> f64 {
        let slowest = self
            .orbital_a
            .effective_charge()
            .min(self.orbital_b.effective_charge());
        self.bond_length / 2.0 + 3.0 / slowest
    }

    fn excluded(&self, position: &Vector3<f64>) -> bool {
        (position - self.center_a()).norm() < self.orbital_a.exclusion_radius()
            || (position - self.center_b()).norm() < self.orbital_b.exclusion_radius()
    }

    /// The density is axially symmetric, so a (z, rho) half-plane scan
    /// plus direct probes at the nuclei covers the global maximum.
    fn max_density(&self) -> f64 {
        const AXIAL_STEPS: u32 = 160;
        const RADIAL_STEPS: u32 = 48;

        let reach = self.characteristic_radius();
        let mut max = self
            .probability_density(&self.center_a())
            .max(self.probability_density(&self.center_b()))
            .max(1e-30);

        for i in 0..=AXIAL_STEPS {
            let z = -reach + 2.0 * reach * f64::from(i) / f64::from(AXIAL_STEPS);
            for j in 0..=RADIAL_STEPS {
                let t = f64::from(j) / f64::from(RADIAL_STEPS);
                let rho = reach * t * t;
                max = max.max(self.probability_density(&Vector3::new(rho, 0.0, z)));
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_overlap_integral() {
        // textbook value for R = 2 Bohr
        assert_relative_eq!(
            overlap_integral(2.0),
            (-2.0_f64).exp() * (3.0 + 4.0 / 3.0),
            epsilon = 1e-15
        );
        assert_relative_eq!(overlap_integral(0.0), 1.0, epsilon = 1e-15);
        assert!(overlap_integral(10.0) < 1e-3);
    }

    #[test]
    fn test_normalization_constants() {
        let bonding = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Bonding).unwrap();
        let s = bonding.overlap();
        assert_relative_eq!(
            bonding.normalization(),
            1.0 / (2.0 * (1.0 + s)).sqrt(),
            epsilon = 1e-12
        );

        let anti = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Antibonding).unwrap();
        assert_relative_eq!(
            anti.normalization(),
            1.0 / (2.0 * (1.0 - s)).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_short_bond_overlap_is_clamped() {
        let anti = DiatomicOrbital::new(1.0, 1.0, 1e-3, CombinationKind::Antibonding).unwrap();
        assert_eq!(anti.overlap(), MAX_OVERLAP);
        assert!(anti.normalization().is_finite());
    }

    #[test]
    fn test_antibonding_nodal_plane() {
        let anti = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Antibonding).unwrap();
        for &(x, y) in &[(0.0, 0.0), (1.0, -0.5), (3.0, 2.0)] {
            assert!(anti.evaluate(&Vector3::new(x, y, 0.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bonding_builds_up_mid_bond_density() {
        let bonding = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Bonding).unwrap();
        let anti = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Antibonding).unwrap();
        let mid = Vector3::zeros();
        assert!(bonding.probability_density(&mid) > 0.0);
        assert!(anti.probability_density(&mid) < bonding.probability_density(&mid));

        // enhancement peaks at the midpoint and decays along the bond
        let e0 = bonding.correlation_enhancement(&mid);
        let e1 = bonding.correlation_enhancement(&Vector3::new(0.0, 0.0, 0.8));
        assert!(e0 > e1);
        assert!(e1 > 1.0);
        assert!(anti.correlation_enhancement(&mid) < 1.0);
        assert!(anti.correlation_enhancement(&mid) > 0.0);
    }

    #[test]
    fn test_density_mirror_symmetry() {
        let bonding = DiatomicOrbital::new(1.0, 1.0, 1.4, CombinationKind::Bonding).unwrap();
        let p = Vector3::new(0.4, -0.2, 0.9);
        let mirrored = Vector3::new(0.4, -0.2, -0.9);
        assert_relative_eq!(
            bonding.probability_density(&p),
            bonding.probability_density(&mirrored),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rejects_bad_bond_length() {
        assert_eq!(
            DiatomicOrbital::new(1.0, 1.0, 0.0, CombinationKind::Bonding),
            Err(ValidationError::NonPositiveBondLength(0.0))
        );
        assert!(DiatomicOrbital::new(1.0, 1.0, -1.4, CombinationKind::Bonding).is_err());
    }

    #[test]
    fn test_max_density_near_nuclei() {
        let bonding = DiatomicOrbital::new(1.0, 1.0, 2.0, CombinationKind::Bonding).unwrap();
        let at_nucleus = bonding.probability_density(&bonding.center_a());
        let max = bonding.max_density();
        assert!(max >= at_nucleus);
        assert!(max <= at_nucleus * 1.05);
    }
}
