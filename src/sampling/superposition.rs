//! Sampling a full electron configuration as one combined cloud.

use rand::Rng;
use tracing::debug;

use crate::configuration::ElectronConfiguration;
use crate::error::ValidationError;
use crate::orbital::HydrogenicOrbital;
use crate::sampling::metropolis::{MetropolisSampler, SampleSet, SamplerParams};

/// Sample every occupied orbital, splitting the requested count
/// evenly across electrons with the remainder going to the outermost
/// ones. Each orbital runs its own chain against its own effective
/// charge.
pub fn sample_configuration<R: Rng>(
    configuration: &ElectronConfiguration,
    count: usize,
    params: SamplerParams,
    rng: &mut R,
) -> Result<SampleSet, ValidationError> {
    if count == 0 {
        return Err(ValidationError::ZeroParticleCount);
    }

    let states = configuration.electron_states();
    let electrons = states.len();
    let base = count / electrons;
    let remainder = count % electrons;

    let mut combined: Option<SampleSet> = None;
    for (index, (state, charge)) in states.iter().enumerate() {
        let mut share = base;
        if index >= electrons - remainder {
            share += 1;
        }
        if share == 0 {
            continue;
        }
        let orbital = HydrogenicOrbital::new(*charge, *state)?;
        let mut sampler = MetropolisSampler::new(orbital, params, &mut *rng);
        let set = sampler.sample(share)?;
        match combined.as_mut() {
            Some(total) => total.absorb(set),
            None => combined = Some(set),
        }
    }

    let combined = combined.ok_or(ValidationError::ZeroParticleCount)?;
    debug!(
        z = configuration.atomic_number(),
        electrons,
        collected = combined.metadata.collected,
        "configuration cloud sampled"
    );
    Ok(combined)
}
