//! Error types for the orbital engine.
//!
//! Validation failures are the only errors the compute path raises; they
//! are returned synchronously, before any computation runs. Sampling
//! shortfalls and numerical clamps are data, not errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("principal quantum number must be >= 1, got {0}")]
    PrincipalOutOfRange(u32),

    #[error("angular quantum number must satisfy l < n, got l={l} for n={n}")]
    AngularOutOfRange { n: u32, l: u32 },

    #[error("magnetic quantum number must satisfy -l <= m <= l, got m={m} for l={l}")]
    MagneticOutOfRange { l: u32, m: i32 },

    #[error("atomic number must be positive, got {0}")]
    NonPositiveAtomicNumber(u32),

    #[error("effective nuclear charge must be positive, got {0}")]
    NonPositiveEffectiveCharge(f64),

    #[error("atomic number {0} exceeds the supported filling table")]
    UnsupportedAtomicNumber(u32),

    #[error("particle count must be positive")]
    ZeroParticleCount,

    #[error("grid resolution must be >= 4, got {0}")]
    ResolutionTooSmall(u32),

    #[error("grid extent must be positive, got {0}")]
    NonPositiveExtent(f64),

    #[error("bond length must be positive, got {0}")]
    NonPositiveBondLength(f64),
}

/// Errors from reading an engine configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("sampler step_scale must be finite and positive, got {0}")]
    InvalidStepScale(f64),
}
