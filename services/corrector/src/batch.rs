//! Per-ROI batch orchestration.
//!
//! Each region of interest is processed independently and sequentially:
//! model validated → time series loaded → transects loaded → regions
//! resolved → tides predicted → corrected → persisted. A failure in one
//! ROI propagates and halts the remaining batch; data gaps do not.

use std::path::Path;

use anyhow::Result;
use tide_atlas::{ModelLayout, RegionMap};
use tide_correction::{apply_correction, CorrectedRow};
use tracing::info;

use crate::config::TideModelConfig;
use crate::predict::{self, FesSourceFactory, RegionSourceFactory};
use crate::session;
use crate::transects;

/// Scoped progress reporting around a unit of work.
///
/// The completion message fires on every exit path, including early
/// failure, without altering control flow.
pub struct ProgressScope {
    description: String,
    total: usize,
    completed: usize,
}

impl ProgressScope {
    pub fn new(description: impl Into<String>, total: usize) -> Self {
        let description = description.into();
        info!(total, "{description}");
        Self {
            description,
            total,
            completed: 0,
        }
    }

    /// Record one completed step.
    pub fn update(&mut self, message: &str) {
        self.completed += 1;
        info!("[{}/{}] {message}", self.completed, self.total);
    }
}

impl Drop for ProgressScope {
    fn drop(&mut self) {
        info!(
            completed = self.completed,
            total = self.total,
            "{} finished",
            self.description
        );
    }
}

/// Correct every listed region of interest.
///
/// The model layout and region boundaries are validated and loaded once
/// before any per-ROI work begins.
pub fn correct_all_tides(
    roi_ids: &[String],
    session_dir: &Path,
    regions_file: &Path,
    config: &TideModelConfig,
    reference_elevation: f64,
    beach_slope: f64,
) -> Result<()> {
    let layout = ModelLayout::validate(&config.model_directory)?;
    let regions = RegionMap::from_geojson_file(regions_file)?;
    let factory = FesSourceFactory {
        layout: &layout,
        config,
    };

    let mut progress = ProgressScope::new(
        format!("correcting tides for {} ROIs", roi_ids.len()),
        roi_ids.len(),
    );
    for roi_id in roi_ids {
        correct_tides(
            roi_id,
            session_dir,
            &regions,
            &factory,
            config,
            reference_elevation,
            beach_slope,
        )?;
        progress.update(&format!("{roi_id} was tidally corrected"));
    }
    Ok(())
}

/// Correct one region of interest and persist its outputs.
#[allow(clippy::too_many_arguments)]
pub fn correct_tides(
    roi_id: &str,
    session_dir: &Path,
    regions: &RegionMap,
    factory: &dyn RegionSourceFactory,
    config: &TideModelConfig,
    reference_elevation: f64,
    beach_slope: f64,
) -> Result<Vec<CorrectedRow>> {
    let mut progress = ProgressScope::new(format!("correcting ROI {roi_id}"), 6);

    progress.update(&format!("getting time series for ROI: {roi_id}"));
    let roi_dir = session::find_roi_directory(session_dir, roi_id)?;
    let series = session::read_wide_timeseries(&roi_dir.join(session::TIME_SERIES_FILE))?;

    progress.update(&format!("getting transects for ROI: {roi_id}"));
    let points = transects::load_seaward_points(
        &roi_dir.join(session::TRANSECTS_FILE),
        config.source_crs,
    )?;

    progress.update(&format!("predicting tides: {roi_id}"));
    let predictions = predict::predict_tides(&points, &series, regions, factory, config)?;

    progress.update(&format!("saving settings: {roi_id}"));
    session::save_transect_settings(&roi_dir, reference_elevation, beach_slope)?;
    session::write_predictions_csv(
        &roi_dir.join("predicted_tides.csv"),
        &predictions,
        config.fill_value,
    )?;

    progress.update(&format!("tidally correcting time series for ROI: {roi_id}"));
    let raw = series.melt();
    let corrected = apply_correction(&raw, &predictions, reference_elevation, beach_slope)?;

    session::write_corrected_csv(
        &roi_dir.join("transect_time_series_tidally_corrected.csv"),
        &corrected,
    )?;
    session::write_corrected_csv_per_transect(&roi_dir, &corrected)?;
    progress.update(&format!("{roi_id} was tidally corrected"));

    Ok(corrected)
}
