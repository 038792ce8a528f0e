//! Tidal correction service.
//!
//! Predicts tide heights at each transect's seaward point from the
//! clipped FES2014 atlas and converts raw cross-shore shoreline
//! positions into elevation-corrected positions.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use tide_atlas::InterpolationMethod;
use tide_common::CrsCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use corrector::batch;
use corrector::config::TideModelConfig;

#[derive(Parser, Debug)]
#[command(name = "corrector")]
#[command(about = "Tidally correct shoreline cross-shore time series")]
struct Args {
    /// Session directory containing one sub-directory per ROI
    #[arg(long, env = "SESSION_DIR")]
    session_dir: PathBuf,

    /// ROI identifiers to correct, in order
    #[arg(long = "roi-id", required = true)]
    roi_ids: Vec<String>,

    /// Clipped tide-model root (region0 … regionN beneath it)
    #[arg(long, env = "TIDE_MODEL_DIR", default_value = "tide_model")]
    model_dir: PathBuf,

    /// GeoJSON file with the region boundaries the model was clipped to
    #[arg(long)]
    regions_file: PathBuf,

    /// Elevation the corrected positions are referenced to (meters)
    #[arg(long)]
    reference_elevation: f64,

    /// Linear beach slope (rise over run, non-zero)
    #[arg(long)]
    beach_slope: f64,

    /// Constituent interpolation method (bilinear, spline, linear, nearest)
    #[arg(long, default_value = "bilinear")]
    method: String,

    /// Disable nearest-neighbour extrapolation outside the model domain
    #[arg(long)]
    no_extrapolate: bool,

    /// Extrapolation cutoff in kilometers ("inf" removes the bound)
    #[arg(long, default_value = "10.0")]
    cutoff_km: f64,

    /// EPSG code of the transect coordinates
    #[arg(long, default_value = "4326")]
    epsg: String,

    /// Value written for masked tide predictions
    #[arg(long, default_value = "NaN")]
    fill_value: f64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = TideModelConfig {
        model_directory: args.model_dir,
        method: InterpolationMethod::from_str(&args.method)?,
        extrapolate: !args.no_extrapolate,
        cutoff_km: args.cutoff_km,
        source_crs: CrsCode::parse(&args.epsg)?,
        fill_value: args.fill_value,
    };

    info!(
        rois = args.roi_ids.len(),
        model = %config.model_directory.display(),
        "starting tidal correction"
    );
    batch::correct_all_tides(
        &args.roi_ids,
        &args.session_dir,
        &args.regions_file,
        &config,
        args.reference_elevation,
        args.beach_slope,
    )
}
