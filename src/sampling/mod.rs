//! Sampling module - Monte Carlo generation of particle clouds.

mod metropolis;
mod superposition;

pub use metropolis::{MetropolisSampler, SampleMetadata, SampleSet, SamplerParams, ThemeMode};
pub use superposition::sample_configuration;
