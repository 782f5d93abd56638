//! Regular-grid evaluation of normalized probability densities.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::io::config::FieldConfig;
use crate::orbital::Density;

/// Normalization floor so a zero maximum never divides the grid.
const MIN_NORMALIZATION: f64 = 1e-12;

/// How a consumer wants results prepared. Accurate keeps the
/// physical profile; aesthetic oversamples the grid for smoother
/// visuals. Affects resolution scaling and cache keys only.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistributionMode {
    #[default]
    Accurate,
    Aesthetic,
}

impl DistributionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionMode::Accurate => "accurate",
            DistributionMode::Aesthetic => "aesthetic",
        }
    }
}

/// Parameters for one grid evaluation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FieldRequest {
    /// Requested grid edge length, before adaptive scaling.
    pub resolution: u32,
    /// Half-width of the cube, in Bohr radii.
    pub extent: f64,
    pub mode: DistributionMode,
    /// Density that maps to 1.0 after normalization.
    pub max_probability: f64,
}

/// A resolution³ grid of normalized densities in [0, 1].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DensityFieldData {
    /// Grid edge length after adaptive scaling.
    pub resolution: u32,
    /// Half-width of the cube the grid spans.
    pub extent: f64,
    /// Flat x-fastest array of resolution³ samples.
    pub field: Vec<f32>,
    /// Largest normalized sample actually observed.
    pub max_sample: f64,
    /// The normalization maximum the request supplied.
    pub max_probability: f64,
}

impl DensityFieldData {
    #[inline]
    pub fn index(&self, i: u32, j: u32, k: u32) -> usize {
        (i + j * self.resolution + k * self.resolution * self.resolution) as usize
    }

    pub fn value_at(&self, i: u32, j: u32, k: u32) -> f32 {
        self.field[self.index(i, j, k)]
    }

    /// World-space point of a grid cell, linear across [-extent, extent].
    pub fn position_at(&self, i: u32, j: u32, k: u32) -> Vector3<f64> {
        let step = 2.0 * self.extent / f64::from(self.resolution - 1);
        Vector3::new(
            -self.extent + f64::from(i) * step,
            -self.extent + f64::from(j) * step,
            -self.extent + f64::from(k) * step,
        )
    }

    /// Flat indices of cells whose value lies inside [min, max], for
    /// isosurface-style consumers.
    pub fn cells_within(&self, min_density: f32, max_density: f32) -> Vec<usize> {
        self.field
            .iter()
            .enumerate()
            .filter(|(_, &v)| v >= min_density && v <= max_density)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Scale a requested edge length by the mode profile and clamp it to
/// the configured band.
pub fn adaptive_resolution(requested: u32, mode: DistributionMode, config: &FieldConfig) -> u32 {
    let scale = match mode {
        DistributionMode::Accurate => 1.0,
        DistributionMode::Aesthetic => config.aesthetic_scale,
    };
    let scaled = (f64::from(requested) * scale).round() as u32;
    let clamped = scaled.max(config.min_resolution).min(config.max_resolution);
    if clamped != scaled {
        debug!(requested, scaled, clamped, "resolution clamped to configured band");
    }
    clamped
}

/// Walk the grid x-fastest and store each density normalized by the
/// request maximum and clamped to [0, 1].
pub fn evaluate_field<T: Density>(
    target: &T,
    request: &FieldRequest,
    config: &FieldConfig,
) -> Result<DensityFieldData, ValidationError> {
    if request.resolution < 4 {
        return Err(ValidationError::ResolutionTooSmall(request.resolution));
    }
    if request.extent <= 0.0 {
        return Err(ValidationError::NonPositiveExtent(request.extent));
    }

    let resolution = adaptive_resolution(request.resolution, request.mode, config);
    let norm = request.max_probability.max(MIN_NORMALIZATION);
    let step = 2.0 * request.extent / f64::from(resolution - 1);

    let mut field = Vec::with_capacity((resolution as usize).pow(3));
    let mut max_sample = 0.0_f64;
    for k in 0..resolution {
        let z = -request.extent + f64::from(k) * step;
        for j in 0..resolution {
            let y = -request.extent + f64::from(j) * step;
            for i in 0..resolution {
                let x = -request.extent + f64::from(i) * step;
                let density = target.probability_density(&Vector3::new(x, y, z));
                let sample = (density / norm).clamp(0.0, 1.0);
                max_sample = max_sample.max(sample);
                field.push(sample as f32);
            }
        }
    }

    debug!(resolution, cells = field.len(), max_sample, "density field evaluated");
    Ok(DensityFieldData {
        resolution,
        extent: request.extent,
        field,
        max_sample,
        max_probability: request.max_probability,
    })
}
