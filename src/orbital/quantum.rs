//! Quantum numbers identifying a hydrogen-like orbital.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Spin projection of a single electron.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    /// Spin quantum number s = ±1/2.
    pub fn value(self) -> f64 {
        match self {
            Spin::Up => 0.5,
            Spin::Down => -0.5,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Spin::Up => '+',
            Spin::Down => '-',
        }
    }
}

/// Quantum state (n, l, m, s) of one electron.
///
/// Immutable value type; every solver entry point validates the
/// invariants `l < n` and `-l <= m <= l` before computing anything.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantumState {
    /// Principal quantum number, >= 1
    pub n: u32,
    /// Angular momentum quantum number, 0 <= l < n
    pub l: u32,
    /// Magnetic quantum number, -l <= m <= l
    pub m: i32,
    /// Spin projection
    pub spin: Spin,
}

impl QuantumState {
    pub fn new(n: u32, l: u32, m: i32, spin: Spin) -> Result<Self, ValidationError> {
        let state = Self { n, l, m, spin };
        state.validate()?;
        Ok(state)
    }

    /// Check the quantum-number invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.n == 0 {
            return Err(ValidationError::PrincipalOutOfRange(self.n));
        }
        if self.l >= self.n {
            return Err(ValidationError::AngularOutOfRange { n: self.n, l: self.l });
        }
        if self.m.unsigned_abs() > self.l {
            return Err(ValidationError::MagneticOutOfRange { l: self.l, m: self.m });
        }
        Ok(())
    }

    /// Spectroscopic label of the subshell, e.g. "3d".
    pub fn subshell_label(&self) -> String {
        format!("{}{}", self.n, subshell_symbol(self.l))
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.n, self.l, self.m, self.spin.symbol())
    }
}

/// Spectroscopic symbol for an angular momentum quantum number.
pub fn subshell_symbol(l: u32) -> char {
    match l {
        0 => 's',
        1 => 'p',
        2 => 'd',
        3 => 'f',
        4 => 'g',
        5 => 'h',
        _ => 'i',
    }
}
