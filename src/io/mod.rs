//! IO module - configuration loading for the engine.

pub mod config;

pub use config::{read_engine_config, CacheConfig, EngineConfig, FieldConfig};
