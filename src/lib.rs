//! Orbital engine - quantum orbital sampling and caching in Rust
//!
//! This crate evaluates hydrogen-like orbitals with Slater-screened
//! effective charges, draws |psi|^2-distributed particle clouds with a
//! Metropolis-Hastings sampler and serves repeat requests from
//! score-based caches with neighbor prefetching.

pub mod cache;
pub mod configuration;
pub mod error;
pub mod field;
pub mod io;
pub mod orbital;
pub mod sampling;
pub mod session;
pub mod special;

// Re-export commonly used types at crate root
pub use cache::{FieldCache, PrefetchItem, PrefetchPriority, PrefetchQueue, SampleCache};
pub use configuration::{subshell_capacity, ElectronConfiguration, OccupiedSubshell, AUFBAU_ORDER};
pub use error::{ConfigError, ValidationError};
pub use field::{adaptive_resolution, evaluate_field, DensityFieldData, DistributionMode, FieldRequest};
pub use io::{read_engine_config, CacheConfig, EngineConfig, FieldConfig};
pub use orbital::{energy, overlap_integral, subshell_symbol, CombinationKind, Density, DiatomicOrbital, HydrogenicOrbital, QuantumState, Spin, MAX_OVERLAP};
pub use sampling::{sample_configuration, MetropolisSampler, SampleMetadata, SampleSet, SamplerParams, ThemeMode};
pub use session::{DiatomicBond, OrbitalSession};
pub use special::{associated_legendre, double_factorial, factorial, generalized_laguerre};

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::orbital::{energy, Density, HydrogenicOrbital, QuantumState, Spin};
    use crate::session::OrbitalSession;
    use crate::{DistributionMode, EngineConfig, ThemeMode};

    fn state(n: u32, l: u32, m: i32) -> QuantumState {
        QuantumState::new(n, l, m, Spin::Up).unwrap()
    }

    #[test]
    fn test_carbon_4f_cloud_statistics() {
        let mut session = OrbitalSession::with_seed(EngineConfig::default(), 7);
        let set = session
            .orbital_particles(6, state(4, 3, 3), 1500, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        assert_eq!(set.positions.len(), 4500);
        assert!(set.max_probability > 0.0);
        assert!(set.positions.iter().all(|v| v.is_finite()));

        // unoccupied subshell runs at z_eff = 1; <r> for (4, 3) is
        // (3n^2 - l(l+1)) / 2 = 18 Bohr
        let mean_radius: f64 = set
            .positions
            .chunks_exact(3)
            .map(|c| {
                Vector3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])).norm()
            })
            .sum::<f64>()
            / set.metadata.collected as f64;
        assert!(mean_radius > 10.0 && mean_radius < 26.0, "mean radius {mean_radius}");
    }

    #[test]
    fn test_hydrogen_ground_state_physics() {
        assert_relative_eq!(energy(1.0, 1), -0.5, epsilon = 1e-12);
        assert_relative_eq!(energy(2.0, 1), -2.0, epsilon = 1e-12);

        let mut session = OrbitalSession::with_seed(EngineConfig::default(), 11);
        let set = session
            .orbital_particles(1, state(1, 0, 0), 6000, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        let mean_radius: f64 = set
            .positions
            .chunks_exact(3)
            .map(|c| {
                Vector3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])).norm()
            })
            .sum::<f64>()
            / set.metadata.collected as f64;
        // <r> for the 1s state is 1.5 Bohr
        assert!(mean_radius > 1.3 && mean_radius < 1.7, "mean radius {mean_radius}");
    }

    #[test]
    fn test_cloud_and_field_agree_on_the_peak() {
        let mut session = OrbitalSession::with_seed(EngineConfig::default(), 3);
        let st = state(1, 0, 0);
        let set = session
            .orbital_particles(1, st, 500, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        // odd edge puts a grid point exactly on the nucleus
        let data = session
            .density_field(1, st, 17, 4.0, DistributionMode::Accurate)
            .unwrap();
        assert_eq!(data.resolution, 17);
        assert!(data.max_sample > 0.99);

        // sampled densities never exceed the analytic peak the field
        // normalizes by
        let psi = HydrogenicOrbital::new(1.0, st).unwrap();
        assert!(set.max_probability > 0.0);
        assert!(set.max_probability <= psi.max_density());
        assert_relative_eq!(data.max_probability, psi.max_density(), epsilon = 1e-12);
    }

    #[test]
    fn test_neon_configuration_pipeline() {
        let mut session = OrbitalSession::with_seed(EngineConfig::default(), 5);
        let configuration = session.configuration(10).unwrap();
        assert_eq!(configuration.to_string(), "1s2 2s2 2p6");
        assert_eq!(configuration.electron_states().len(), 10);

        let set = session
            .configuration_particles(10, 1000, DistributionMode::Accurate, ThemeMode::Light)
            .unwrap();
        assert_eq!(set.particle_count(), 1000);
        assert_eq!(set.metadata.theme, ThemeMode::Light);
    }

    #[test]
    fn test_sample_cache_eviction_under_pressure() {
        let mut config = EngineConfig::default();
        config.cache.sample_capacity = 2;
        let mut session = OrbitalSession::with_seed(config, 13);

        let hot = state(1, 0, 0);
        session
            .orbital_particles(1, hot, 100, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        // keep the first entry hot while others churn past capacity
        for n in 2..6 {
            session
                .orbital_particles(1, hot, 100, DistributionMode::Accurate, ThemeMode::Dark)
                .unwrap();
            session
                .orbital_particles(1, state(n, 0, 0), 100, DistributionMode::Accurate, ThemeMode::Dark)
                .unwrap();
        }
        assert!(session.cached_sample_sets() <= 2);

        // the hot entry survived: the warm call must not grow the cache
        let before = session.cached_sample_sets();
        session
            .orbital_particles(1, hot, 100, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        assert_eq!(session.cached_sample_sets(), before);
    }

    #[test]
    fn test_truncation_reports_in_metadata() {
        let mut config = EngineConfig::default();
        // with thinning 2 a sample needs at least two proposals, so a
        // one-proposal budget cannot finish
        config.sampler.cap_per_sample = 1;
        let mut session = OrbitalSession::with_seed(config, 17);
        let set = session
            .orbital_particles(1, state(1, 0, 0), 50, DistributionMode::Accurate, ThemeMode::Dark)
            .unwrap();
        assert!(set.metadata.truncated);
        assert!(set.metadata.collected < set.metadata.requested);
        assert_eq!(set.positions.len(), set.metadata.collected * 3);
    }
}
