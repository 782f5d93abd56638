//! Metropolis-Hastings sampling of orbital probability densities.
//!
//! A single-walker chain proposes uniform per-axis displacements and
//! accepts with probability min(1, p_new / p_old). Runs are bounded
//! by a hard iteration cap, so a request always terminates; a
//! shortfall is reported in the metadata instead of raised.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::orbital::Density;

/// Floor for stored densities so acceptance ratios stay finite.
const MIN_DENSITY: f64 = 1e-300;

/// Floor for the reported maximum so downstream normalization never
/// divides by zero.
const MIN_MAX_PROBABILITY: f64 = 1e-12;

/// Color-scheme hint carried through metadata and cache keys. It
/// never affects positions, only how consumers shade them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

/// Parameters for a Metropolis sampling run.
#[derive(Serialize, Deserialize, Copy, Clone, Debug)]
#[serde(default)]
pub struct SamplerParams {
    /// Proposals discarded before any sample is retained.
    pub burn_in: usize,
    /// Every `thinning`-th accepted state is retained.
    pub thinning: usize,
    /// Proposal step size as a fraction of the characteristic radius.
    pub step_scale: f64,
    /// Hard bound on proposals per requested sample.
    pub cap_per_sample: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self { burn_in: 256, thinning: 2, step_scale: 0.25, cap_per_sample: 200 }
    }
}

impl SamplerParams {
    pub fn with_burn_in(mut self, burn_in: usize) -> Self {
        self.burn_in = burn_in;
        self
    }

    pub fn with_thinning(mut self, thinning: usize) -> Self {
        self.thinning = thinning;
        self
    }

    pub fn with_step_scale(mut self, step_scale: f64) -> Self {
        self.step_scale = step_scale;
        self
    }

    pub fn with_cap_per_sample(mut self, cap_per_sample: usize) -> Self {
        self.cap_per_sample = cap_per_sample;
        self
    }
}

/// Diagnostics for one sampling run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMetadata {
    pub requested: usize,
    pub collected: usize,
    pub iterations: u64,
    pub accepted: u64,
    /// True when the iteration cap fired before `requested` samples
    /// were retained; the set is still valid, just smaller.
    pub truncated: bool,
    pub theme: ThemeMode,
}

/// Particle cloud distributed according to |psi|^2.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampleSet {
    /// Flat xyz triplets in Bohr radii.
    pub positions: Vec<f32>,
    /// Snapshot of the generated positions, kept as an animation
    /// baseline while consumers displace `positions`.
    pub base_positions: Vec<f32>,
    /// Largest density among retained samples, always > 0.
    pub max_probability: f64,
    pub metadata: SampleMetadata,
}

impl SampleSet {
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Merge another set into this one, keeping the combined maxima
    /// and summed diagnostics.
    pub fn absorb(&mut self, other: SampleSet) {
        self.positions.extend_from_slice(&other.positions);
        self.base_positions.extend_from_slice(&other.base_positions);
        self.max_probability = self.max_probability.max(other.max_probability);
        self.metadata.requested += other.metadata.requested;
        self.metadata.collected += other.metadata.collected;
        self.metadata.iterations += other.metadata.iterations;
        self.metadata.accepted += other.metadata.accepted;
        self.metadata.truncated |= other.metadata.truncated;
    }
}

/// Metropolis-Hastings chain over one probability density.
pub struct MetropolisSampler<T: Density, R: Rng> {
    target: T,
    params: SamplerParams,
    rng: R,
    position: Vector3<f64>,
    density: f64,
    step_size: f64,
    iterations: u64,
    accepted: u64,
}

impl<T: Density, R: Rng> MetropolisSampler<T, R> {
    pub fn new(target: T, params: SamplerParams, rng: R) -> Self {
        let step_size = params.step_scale * target.characteristic_radius();
        let mut sampler = Self {
            target,
            params,
            rng,
            position: Vector3::zeros(),
            density: MIN_DENSITY,
            step_size,
            iterations: 0,
            accepted: 0,
        };
        sampler.position = sampler.initial_position();
        sampler.density = sampler
            .target
            .probability_density(&sampler.position)
            .max(MIN_DENSITY);
        sampler
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Draw a starting point inside the characteristic volume,
    /// rejecting draws that land in the nuclear exclusion zone; when
    /// every draw is excluded, reproject outward past the zone.
    fn initial_position(&mut self) -> Vector3<f64> {
        let radius = self.target.characteristic_radius();
        let normal = Normal::new(0.0, 1.0).unwrap();
        for _ in 0..32 {
            let direction: Vector3<f64> = Vector3::from_distribution(&normal, &mut self.rng);
            let norm = direction.norm();
            if norm < 1e-12 {
                continue;
            }
            let r = radius * self.rng.gen::<f64>().cbrt();
            let candidate = direction * (r / norm);
            if !self.target.excluded(&candidate) {
                return candidate;
            }
        }
        // deep cores can bury the whole characteristic sphere inside the
        // exclusion zone; a start left in there can never move, so push
        // the reprojection outward until it clears
        let mut fallback = Vector3::new(0.0, 0.0, radius);
        while self.target.excluded(&fallback) {
            fallback *= 2.0;
        }
        fallback
    }

    /// Advance the chain by one proposal. Returns true on acceptance.
    pub fn step(&mut self) -> bool {
        let uniform = Uniform::new(-self.step_size, self.step_size);
        let proposal = Vector3::new(
            self.position.x + uniform.sample(&mut self.rng),
            self.position.y + uniform.sample(&mut self.rng),
            self.position.z + uniform.sample(&mut self.rng),
        );
        self.iterations += 1;

        // density inside the exclusion zone is numerically unstable
        if self.target.excluded(&proposal) {
            return false;
        }

        let new_density = self.target.probability_density(&proposal);
        let ratio = new_density / self.density;
        let accept = ratio >= 1.0 || self.rng.gen::<f64>() < ratio;
        if accept {
            self.position = proposal;
            self.density = new_density.max(MIN_DENSITY);
            self.accepted += 1;
        }
        accept
    }

    /// Advance the chain by a bounded burst of proposals, returning
    /// how many were accepted. This is the unit of work cooperative
    /// schedulers call between yields.
    pub fn run_chunk(&mut self, proposals: usize) -> usize {
        let mut accepted = 0;
        for _ in 0..proposals {
            if self.step() {
                accepted += 1;
            }
        }
        accepted
    }

    /// Burn in, then retain every `thinning`-th accepted state until
    /// `count` samples are collected or the iteration cap fires.
    pub fn sample(&mut self, count: usize) -> Result<SampleSet, ValidationError> {
        if count == 0 {
            return Err(ValidationError::ZeroParticleCount);
        }

        let start_iterations = self.iterations;
        let start_accepted = self.accepted;
        self.run_chunk(self.params.burn_in);

        let thinning = self.params.thinning.max(1) as u64;
        let cap = self.iterations + (count * self.params.cap_per_sample) as u64;
        let mut positions: Vec<f32> = Vec::with_capacity(3 * count);
        let mut max_probability = 0.0_f64;
        let mut since_retained = 0u64;
        let mut collected = 0usize;

        while collected < count && self.iterations < cap {
            if self.step() {
                since_retained += 1;
                if since_retained >= thinning {
                    since_retained = 0;
                    positions.push(self.position.x as f32);
                    positions.push(self.position.y as f32);
                    positions.push(self.position.z as f32);
                    max_probability = max_probability.max(self.density);
                    collected += 1;
                }
            }
        }

        let iterations = self.iterations - start_iterations;
        let accepted = self.accepted - start_accepted;
        let truncated = collected < count;
        if truncated {
            warn!(
                requested = count,
                collected, iterations, "iteration cap reached, returning a partial sample set"
            );
        } else {
            debug!(collected, iterations, accepted, "sampling run finished");
        }

        Ok(SampleSet {
            base_positions: positions.clone(),
            positions,
            max_probability: max_probability.max(MIN_MAX_PROBABILITY),
            metadata: SampleMetadata {
                requested: count,
                collected,
                iterations,
                accepted,
                truncated,
                theme: ThemeMode::default(),
            },
        })
    }
}
