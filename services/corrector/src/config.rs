//! Per-run tide-model configuration.

use std::path::PathBuf;

use tide_atlas::InterpolationMethod;
use tide_common::CrsCode;

/// Immutable settings for one correction run, passed by reference
/// through the pipeline.
#[derive(Debug, Clone)]
pub struct TideModelConfig {
    /// Clipped-model root (`region0` … `regionN` beneath it).
    pub model_directory: PathBuf,
    /// Constituent interpolation method.
    pub method: InterpolationMethod,
    /// Allow nearest-neighbour extrapolation outside the model domain.
    pub extrapolate: bool,
    /// Extrapolation cutoff in kilometers; infinity disables the bound.
    pub cutoff_km: f64,
    /// Reference system of the transect coordinates.
    pub source_crs: CrsCode,
    /// Value written for masked tides at the output boundary.
    pub fill_value: f64,
}
