//! Engine configuration: serde-defaulted knobs and YAML loading.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sampling::SamplerParams;

/// Grid evaluation profile.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct FieldConfig {
    /// Smallest grid edge length the adaptive scaler may produce.
    pub min_resolution: u32,
    /// Largest grid edge length the adaptive scaler may produce.
    pub max_resolution: u32,
    /// Resolution multiplier applied in aesthetic mode.
    pub aesthetic_scale: f64,
    /// Half-width in Bohr for consumers without their own extent.
    pub default_extent: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            min_resolution: 16,
            max_resolution: 96,
            aesthetic_scale: 1.25,
            default_extent: 12.0,
        }
    }
}

/// Capacity and scoring knobs for the cache tiers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct CacheConfig {
    pub sample_capacity: usize,
    pub field_capacity: usize,
    pub molecular_capacity: usize,
    /// Weight of the access count in eviction scores.
    pub frequency_weight: u64,
    /// Upper bound on pending prefetch items.
    pub prefetch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 24,
            field_capacity: 16,
            molecular_capacity: 12,
            frequency_weight: 8,
            prefetch_limit: 32,
        }
    }
}

/// Everything a session needs, loadable from a YAML file. Missing
/// sections and fields fall back to defaults, so a config file only
/// states what it overrides.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub sampler: SamplerParams,
    pub field: FieldConfig,
    pub cache: CacheConfig,
}

/// Read an engine configuration from a YAML file. The sampler's
/// `step_scale` must be finite and positive; other values are
/// rejected at load time.
///
/// Example file:
/// ```yaml
/// sampler:
///   burn_in: 512
/// cache:
///   sample_capacity: 48
/// ```
pub fn read_engine_config(filename: &str) -> Result<EngineConfig, ConfigError> {
    let file = std::fs::File::open(filename)?;
    let reader = std::io::BufReader::new(file);
    let config: EngineConfig = serde_yaml::from_reader(reader)?;
    if !config.sampler.step_scale.is_finite() || config.sampler.step_scale <= 0.0 {
        return Err(ConfigError::InvalidStepScale(config.sampler.step_scale));
    }
    Ok(config)
}
