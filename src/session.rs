//! Session owning the caches, the prefetch queue and the compute
//! entry points. A session is a plain value: tests build isolated
//! instances instead of sharing global state, and a host application
//! owns exactly one per view.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{FieldCache, PrefetchQueue, SampleCache};
use crate::configuration::ElectronConfiguration;
use crate::error::ValidationError;
use crate::field::{
    adaptive_resolution, evaluate_field, DensityFieldData, DistributionMode, FieldRequest,
};
use crate::io::config::EngineConfig;
use crate::orbital::{
    CombinationKind, Density, DiatomicOrbital, HydrogenicOrbital, QuantumState,
};
use crate::sampling::{
    sample_configuration, MetropolisSampler, SampleSet, ThemeMode,
};

/// Request descriptor for a two-atom sigma orbital.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DiatomicBond {
    pub z_a: u32,
    pub z_b: u32,
    /// Internuclear distance in Bohr radii.
    pub bond_length: f64,
    pub kind: CombinationKind,
}

/// One engine instance: compute functions behind three cache tiers
/// and a prefetch queue.
pub struct OrbitalSession {
    config: EngineConfig,
    samples: SampleCache,
    molecular_samples: SampleCache,
    fields: FieldCache,
    prefetch: PrefetchQueue,
    configurations: HashMap<u32, ElectronConfiguration>,
    rng: StdRng,
}

impl OrbitalSession {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic session for reproducible runs and tests.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        let cache = config.cache;
        debug!(
            sample_capacity = cache.sample_capacity,
            field_capacity = cache.field_capacity,
            "session ready"
        );
        Self {
            config,
            samples: SampleCache::new(cache.sample_capacity, cache.frequency_weight),
            molecular_samples: SampleCache::new(cache.molecular_capacity, cache.frequency_weight),
            fields: FieldCache::new(cache.field_capacity, cache.frequency_weight),
            prefetch: PrefetchQueue::new(cache.prefetch_limit),
            configurations: HashMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Memoized ground-state configuration for an atomic number.
    pub fn configuration(
        &mut self,
        atomic_number: u32,
    ) -> Result<&ElectronConfiguration, ValidationError> {
        match self.configurations.entry(atomic_number) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let built = ElectronConfiguration::build(atomic_number)?;
                Ok(slot.insert(built))
            }
        }
    }

    /// Particle cloud for one orbital of one atom, cached.
    pub fn orbital_particles(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
        count: usize,
        mode: DistributionMode,
        theme: ThemeMode,
    ) -> Result<SampleSet, ValidationError> {
        state.validate()?;
        if count == 0 {
            return Err(ValidationError::ZeroParticleCount);
        }
        let key = sample_key(atomic_number, &state, count, mode, theme);
        if let Some(hit) = self.samples.get(&key) {
            return Ok(hit);
        }
        let set = self.compute_orbital_particles(atomic_number, state, count, theme)?;
        self.samples.insert(&key, &set);
        Ok(set)
    }

    /// Particle cloud covering every occupied orbital, cached.
    pub fn configuration_particles(
        &mut self,
        atomic_number: u32,
        count: usize,
        mode: DistributionMode,
        theme: ThemeMode,
    ) -> Result<SampleSet, ValidationError> {
        if count == 0 {
            return Err(ValidationError::ZeroParticleCount);
        }
        let key = configuration_key(atomic_number, count, mode, theme);
        if let Some(hit) = self.samples.get(&key) {
            return Ok(hit);
        }
        let configuration = self.configuration(atomic_number)?.clone();
        let params = self.config.sampler;
        let mut set = sample_configuration(&configuration, count, params, &mut self.rng)?;
        set.metadata.theme = theme;
        self.samples.insert(&key, &set);
        Ok(set)
    }

    /// Normalized density grid for one orbital, tolerance-cached.
    pub fn density_field(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
        resolution: u32,
        extent: f64,
        mode: DistributionMode,
    ) -> Result<DensityFieldData, ValidationError> {
        state.validate()?;
        if resolution < 4 {
            return Err(ValidationError::ResolutionTooSmall(resolution));
        }
        if extent <= 0.0 {
            return Err(ValidationError::NonPositiveExtent(extent));
        }

        let orbital = self.orbital_for(atomic_number, state)?;
        let max_probability = orbital.max_density();
        let target = adaptive_resolution(resolution, mode, &self.config.field);
        let group = field_group_key(atomic_number, &state, mode);
        if let Some(hit) = self.fields.get(&group, target, extent, max_probability) {
            return Ok(hit);
        }

        let request = FieldRequest { resolution, extent, mode, max_probability };
        let data = evaluate_field(&orbital, &request, &self.config.field)?;
        self.fields.insert(&group, &data);
        Ok(data)
    }

    /// Particle cloud for a diatomic molecular orbital, cached.
    pub fn molecular_particles(
        &mut self,
        bond: DiatomicBond,
        count: usize,
        mode: DistributionMode,
        theme: ThemeMode,
    ) -> Result<SampleSet, ValidationError> {
        if count == 0 {
            return Err(ValidationError::ZeroParticleCount);
        }
        let key = molecular_key(&bond, count, mode, theme);
        if let Some(hit) = self.molecular_samples.get(&key) {
            return Ok(hit);
        }

        let orbital = self.molecular_orbital_for(bond)?;
        let params = self.config.sampler;
        let mut sampler = MetropolisSampler::new(orbital, params, &mut self.rng);
        let mut set = sampler.sample(count)?;
        set.metadata.theme = theme;
        self.molecular_samples.insert(&key, &set);
        Ok(set)
    }

    /// Normalized density grid for a diatomic orbital, tolerance-cached.
    pub fn molecular_density_field(
        &mut self,
        bond: DiatomicBond,
        resolution: u32,
        extent: f64,
        mode: DistributionMode,
    ) -> Result<DensityFieldData, ValidationError> {
        if resolution < 4 {
            return Err(ValidationError::ResolutionTooSmall(resolution));
        }
        if extent <= 0.0 {
            return Err(ValidationError::NonPositiveExtent(extent));
        }

        let orbital = self.molecular_orbital_for(bond)?;
        let max_probability = orbital.max_density();
        let target = adaptive_resolution(resolution, mode, &self.config.field);
        let group = molecular_field_group_key(&bond, mode);
        if let Some(hit) = self.fields.get(&group, target, extent, max_probability) {
            return Ok(hit);
        }

        let request = FieldRequest { resolution, extent, mode, max_probability };
        let data = evaluate_field(&orbital, &request, &self.config.field)?;
        self.fields.insert(&group, &data);
        Ok(data)
    }

    /// Queue the likely-next states around a foreground request.
    /// Returns how many new items were queued.
    pub fn prefetch_neighbors(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
        count: usize,
        mode: DistributionMode,
        theme: ThemeMode,
    ) -> Result<usize, ValidationError> {
        state.validate()?;
        if atomic_number == 0 {
            return Err(ValidationError::NonPositiveAtomicNumber(atomic_number));
        }
        if count == 0 {
            return Err(ValidationError::ZeroParticleCount);
        }
        let samples = &self.samples;
        let queued = self.prefetch.enqueue_neighbors(
            atomic_number,
            state,
            count,
            mode,
            theme,
            |candidate| samples.contains(&sample_key(atomic_number, candidate, count, mode, theme)),
        );
        Ok(queued)
    }

    /// Execute one unit of background work: pop items until one
    /// actually needs computing, sample it and cache the result.
    /// Returns false when the queue held no work.
    pub fn drain_prefetch_one(&mut self) -> bool {
        while let Some(item) = self.prefetch.pop() {
            let key =
                sample_key(item.atomic_number, &item.state, item.count, item.mode, item.theme);
            // a foreground request may have landed since enqueue
            if self.samples.contains(&key) {
                continue;
            }
            match self.compute_orbital_particles(
                item.atomic_number,
                item.state,
                item.count,
                item.theme,
            ) {
                Ok(set) => {
                    self.samples.insert(&key, &set);
                    debug!(key = key.as_str(), "prefetched orbital cloud");
                    return true;
                }
                Err(err) => {
                    warn!(%err, "prefetch item failed, skipping");
                }
            }
        }
        false
    }

    /// Drop all pending prefetch work.
    pub fn cancel_prefetch(&mut self) {
        self.prefetch.clear();
    }

    pub fn pending_prefetch(&self) -> usize {
        self.prefetch.len()
    }

    /// Number of cached orbital and configuration clouds.
    pub fn cached_sample_sets(&self) -> usize {
        self.samples.len()
    }

    /// Number of cached molecular clouds.
    pub fn cached_molecular_sets(&self) -> usize {
        self.molecular_samples.len()
    }

    /// Number of cached density grids.
    pub fn cached_fields(&self) -> usize {
        self.fields.len()
    }

    fn orbital_for(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
    ) -> Result<HydrogenicOrbital, ValidationError> {
        let charge = self
            .configuration(atomic_number)?
            .effective_charge_for(state.n, state.l);
        HydrogenicOrbital::new(charge, state)
    }

    fn molecular_orbital_for(
        &mut self,
        bond: DiatomicBond,
    ) -> Result<DiatomicOrbital, ValidationError> {
        if bond.bond_length <= 0.0 {
            return Err(ValidationError::NonPositiveBondLength(bond.bond_length));
        }
        let charge_a = self.configuration(bond.z_a)?.effective_charge_for(1, 0);
        let charge_b = self.configuration(bond.z_b)?.effective_charge_for(1, 0);
        DiatomicOrbital::new(charge_a, charge_b, bond.bond_length, bond.kind)
    }

    fn compute_orbital_particles(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
        count: usize,
        theme: ThemeMode,
    ) -> Result<SampleSet, ValidationError> {
        let orbital = self.orbital_for(atomic_number, state)?;
        let params = self.config.sampler;
        let mut sampler = MetropolisSampler::new(orbital, params, &mut self.rng);
        let mut set = sampler.sample(count)?;
        set.metadata.theme = theme;
        Ok(set)
    }
}

impl Default for OrbitalSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn sample_key(
    atomic_number: u32,
    state: &QuantumState,
    count: usize,
    mode: DistributionMode,
    theme: ThemeMode,
) -> String {
    format!("Z{atomic_number}|{state}|c{count}|{}|{}", mode.as_str(), theme.as_str())
}

fn configuration_key(
    atomic_number: u32,
    count: usize,
    mode: DistributionMode,
    theme: ThemeMode,
) -> String {
    format!("Zcfg{atomic_number}|c{count}|{}|{}", mode.as_str(), theme.as_str())
}

fn molecular_key(
    bond: &DiatomicBond,
    count: usize,
    mode: DistributionMode,
    theme: ThemeMode,
) -> String {
    format!(
        "M{}-{}|{}|b{:.2}|c{count}|{}|{}",
        bond.z_a,
        bond.z_b,
        bond.kind.as_str(),
        bond.bond_length,
        mode.as_str(),
        theme.as_str()
    )
}

fn field_group_key(atomic_number: u32, state: &QuantumState, mode: DistributionMode) -> String {
    format!("F{atomic_number}|{state}|{}", mode.as_str())
}

fn molecular_field_group_key(bond: &DiatomicBond, mode: DistributionMode) -> String {
    format!(
        "FM{}-{}|{}|b{:.2}|{}",
        bond.z_a,
        bond.z_b,
        bond.kind.as_str(),
        bond.bond_length,
        mode.as_str()
    )
}
