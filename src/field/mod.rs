//! Grid evaluation of orbital densities for volume consumers.

mod evaluator;

pub use evaluator::{
    adaptive_resolution, evaluate_field, DensityFieldData, DistributionMode, FieldRequest,
};
