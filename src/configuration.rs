//! Ground-state electron configurations: aufbau filling and
//! Slater-rule effective nuclear charges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::orbital::{subshell_symbol, QuantumState, Spin};

/// Subshell filling order, increasing (n + l) with n as tiebreaker.
/// A fixed approximation; known exceptions (Cr, Cu, ...) are kept.
pub const AUFBAU_ORDER: [(u32, u32); 19] = [
    (1, 0),
    (2, 0),
    (2, 1),
    (3, 0),
    (3, 1),
    (4, 0),
    (3, 2),
    (4, 1),
    (5, 0),
    (4, 2),
    (5, 1),
    (6, 0),
    (4, 3),
    (5, 2),
    (6, 1),
    (7, 0),
    (5, 3),
    (6, 2),
    (7, 1),
];

/// Electron capacity 2(2l + 1) of one subshell.
#[inline]
pub fn subshell_capacity(l: u32) -> u32 {
    2 * (2 * l + 1)
}

/// One filled subshell with its screening-adjusted charge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct OccupiedSubshell {
    pub n: u32,
    pub l: u32,
    pub electrons: u32,
    pub effective_charge: f64,
}

/// Ground-state occupancy for one atomic number. Built once and
/// read-only afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElectronConfiguration {
    atomic_number: u32,
    subshells: Vec<OccupiedSubshell>,
}

impl ElectronConfiguration {
    /// Fill subshells greedily in aufbau order, then compute the
    /// per-subshell effective charge from the full occupancy.
    pub fn build(atomic_number: u32) -> Result<Self, ValidationError> {
        if atomic_number == 0 {
            return Err(ValidationError::NonPositiveAtomicNumber(atomic_number));
        }

        let mut remaining = atomic_number;
        let mut subshells = Vec::new();
        for &(n, l) in AUFBAU_ORDER.iter() {
            if remaining == 0 {
                break;
            }
            let placed = remaining.min(subshell_capacity(l));
            subshells.push(OccupiedSubshell { n, l, electrons: placed, effective_charge: 0.0 });
            remaining -= placed;
        }
        if remaining > 0 {
            return Err(ValidationError::UnsupportedAtomicNumber(atomic_number));
        }

        let occupancy = subshells.clone();
        for subshell in &mut subshells {
            let shield = screening(&occupancy, subshell.n, subshell.l, true);
            subshell.effective_charge = (f64::from(atomic_number) - shield).max(1.0);
        }

        Ok(Self { atomic_number, subshells })
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn subshells(&self) -> &[OccupiedSubshell] {
        &self.subshells
    }

    /// Effective charge seen by an electron in subshell (n, l).
    ///
    /// Occupied subshells return the stored value. For an unoccupied
    /// target the same rules run against the existing occupancy and
    /// the result is clamped to >= 1 so hydrogen-like evaluation
    /// stays well-posed.
    pub fn effective_charge_for(&self, n: u32, l: u32) -> f64 {
        if let Some(subshell) =
            self.subshells.iter().find(|s| s.n == n && s.l == l)
        {
            return subshell.effective_charge;
        }
        let shield = screening(&self.subshells, n, l, false);
        (f64::from(self.atomic_number) - shield).max(1.0)
    }

    /// Expand the occupancy into per-electron quantum states paired
    /// with their effective charge. Within a subshell the first
    /// 2l + 1 electrons take spin up across m = -l..l, the rest pair
    /// down in the same m order.
    pub fn electron_states(&self) -> Vec<(QuantumState, f64)> {
        let mut states = Vec::with_capacity(self.atomic_number as usize);
        for subshell in &self.subshells {
            let orbitals = 2 * subshell.l + 1;
            for i in 0..subshell.electrons {
                let spin = if i < orbitals { Spin::Up } else { Spin::Down };
                let m = -(subshell.l as i32) + (i % orbitals) as i32;
                states.push((
                    QuantumState { n: subshell.n, l: subshell.l, m, spin },
                    subshell.effective_charge,
                ));
            }
        }
        states
    }
}

impl fmt::Display for ElectronConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.subshells.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}{}", s.n, subshell_symbol(s.l), s.electrons)?;
        }
        Ok(())
    }
}

/// Slater shielding sum for a target electron in (n, l).
///
/// Same-n electrons count 0.35 each (0.30 when n = 1), the n-1 shell
/// counts 0.85 for s/p targets and 1.00 for d/f targets, deeper
/// shells count 1.00, higher shells nothing. When the target is one
/// of the occupied electrons it does not shield itself.
fn screening(occupancy: &[OccupiedSubshell], n: u32, l: u32, target_occupied: bool) -> f64 {
    let same_shell_factor = if n == 1 { 0.30 } else { 0.35 };
    let inner_shell_factor = if l <= 1 { 0.85 } else { 1.00 };

    let mut shield = 0.0;
    for subshell in occupancy {
        let mut count = subshell.electrons;
        if target_occupied && subshell.n == n && subshell.l == l {
            count -= 1;
        }
        if subshell.n == n {
            shield += f64::from(count) * same_shell_factor;
        } else if subshell.n + 1 == n {
            shield += f64::from(count) * inner_shell_factor;
        } else if subshell.n < n {
            shield += f64::from(count);
        }
    }
    shield
}
