//! Orbital models: quantum numbers, hydrogen-like solutions and
//! diatomic LCAO combinations.

mod hydrogenic;
mod lcao;
mod quantum;
mod traits;

pub use hydrogenic::{energy, HydrogenicOrbital};
pub use lcao::{overlap_integral, CombinationKind, DiatomicOrbital, MAX_OVERLAP};
pub use quantum::{subshell_symbol, QuantumState, Spin};
pub use traits::Density;
