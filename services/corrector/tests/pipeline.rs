//! End-to-end correction pipeline over a synthetic session.
//!
//! Three transects: two resolve to the model region and share dates
//! with the raw series, one falls outside every region boundary. The
//! constituent source is synthetic (a pure S2 tide), so the expected
//! heights have a closed form.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use corrector::batch::correct_tides;
use corrector::config::TideModelConfig;
use corrector::predict::{predict_tides, predict_tides_partitioned, RegionSourceFactory};
use corrector::session::read_wide_timeseries;
use corrector::transects::load_seaward_points;
use tide_atlas::error::AtlasResult;
use tide_atlas::layout::GRID_FILES_PER_LAYER;
use tide_atlas::{ConstituentSource, HarmonicConstants, InterpolationMethod, RegionMap};
use tide_common::CrsCode;

/// A source with a single S2 constituent of constant amplitude.
struct FlatS2Source {
    constituents: Vec<String>,
    amplitude: f64,
}

impl ConstituentSource for FlatS2Source {
    fn constituents(&self) -> &[String] {
        &self.constituents
    }

    fn extract(&self, lon: &[f64], _lat: &[f64]) -> AtlasResult<HarmonicConstants> {
        Ok(HarmonicConstants {
            constituents: self.constituents.clone(),
            amplitude: vec![vec![Some(self.amplitude)]; lon.len()],
            phase: vec![vec![Some(0.0)]; lon.len()],
        })
    }
}

struct FlatFactory;

impl RegionSourceFactory for FlatFactory {
    fn open_region(&self, _region_id: u32) -> AtlasResult<Box<dyn ConstituentSource>> {
        Ok(Box::new(FlatS2Source {
            constituents: vec!["s2".to_string()],
            amplitude: 0.5,
        }))
    }
}

const TIME_SERIES: &str = "\
dates,t1,t2,t3
2021-01-01 00:00:00+00:00,10.0,20.0,30.0
2021-01-01 03:00:00+00:00,11.0,21.0,31.0
2021-01-01 06:00:00+00:00,12.0,22.0,
2021-01-01 09:00:00+00:00,,23.0,
";

const CONFIG_GDF: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature",
         "properties": {"id": "t1", "type": "transect"},
         "geometry": {"type": "LineString",
                      "coordinates": [[-117.0, 33.0], [-117.1, 32.9]]}},
        {"type": "Feature",
         "properties": {"id": "t2", "type": "transect"},
         "geometry": {"type": "LineString",
                      "coordinates": [[-117.2, 33.1], [-117.3, 33.0]]}},
        {"type": "Feature",
         "properties": {"id": "t3", "type": "transect"},
         "geometry": {"type": "LineString",
                      "coordinates": [[9.9, 9.9], [10.0, 10.0]]}},
        {"type": "Feature",
         "properties": {"id": "roi1", "type": "roi"},
         "geometry": {"type": "Polygon",
                      "coordinates": [[[-118.0, 32.0], [-116.0, 32.0], [-116.0, 34.0], [-118.0, 32.0]]]}}
    ]
}"#;

const REGIONS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Polygon", "coordinates":
            [[[-120.0, 30.0], [-115.0, 30.0], [-115.0, 35.0], [-120.0, 35.0], [-120.0, 30.0]]]}}
    ]
}"#;

fn build_model_dir(root: &Path) {
    for layer in ["load_tide", "ocean_tide"] {
        let dir = root.join("region0").join("fes2014").join(layer);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..GRID_FILES_PER_LAYER {
            fs::write(dir.join(format!("c{i}.nc")), b"").unwrap();
        }
    }
}

/// Session root + ROI directory + supporting files.
fn build_session(root: &Path) -> (PathBuf, PathBuf, TideModelConfig) {
    let roi_dir = root.join("ID_roi1_datetime_2021");
    fs::create_dir_all(&roi_dir).unwrap();
    fs::write(roi_dir.join("transect_time_series.csv"), TIME_SERIES).unwrap();
    fs::write(roi_dir.join("config_gdf.geojson"), CONFIG_GDF).unwrap();
    fs::write(roi_dir.join("transects_settings.json"), r#"{"max_std": 15.0}"#).unwrap();

    let regions_file = root.join("tide_regions_map.geojson");
    fs::write(&regions_file, REGIONS).unwrap();

    let model_dir = root.join("tide_model");
    build_model_dir(&model_dir);

    let config = TideModelConfig {
        model_directory: model_dir,
        method: InterpolationMethod::Bilinear,
        extrapolate: true,
        cutoff_km: 10.0,
        source_crs: CrsCode::Epsg4326,
        fill_value: f64::NAN,
    };
    (roi_dir, regions_file, config)
}

/// S2 with zero phase from midnight UT: amp·cos(30°·hour).
fn s2_height(amplitude: f64, hour: f64) -> f64 {
    amplitude * (30.0 * hour).to_radians().cos()
}

#[test]
fn corrects_exactly_the_resolvable_transects() {
    let root = tempfile::tempdir().unwrap();
    let (roi_dir, regions_file, config) = build_session(root.path());
    let regions = RegionMap::from_geojson_file(&regions_file).unwrap();

    let corrected = correct_tides(
        "roi1",
        root.path(),
        &regions,
        &FlatFactory,
        &config,
        0.0,
        0.1,
    )
    .unwrap();

    // t1 has 3 non-missing raw entries, t2 has 4, t3 is unresolved
    assert_eq!(corrected.len(), 7);
    assert!(corrected.iter().all(|r| r.transect_id != "t3"));
    assert_eq!(
        corrected.iter().filter(|r| r.transect_id == "t1").count(),
        3
    );
    assert_eq!(
        corrected.iter().filter(|r| r.transect_id == "t2").count(),
        4
    );

    // Closed-form check at midnight: tide = 0.5, correction = 0.5 / 0.1
    let first = corrected
        .iter()
        .find(|r| {
            r.transect_id == "t1"
                && r.date == Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        })
        .unwrap();
    assert!((first.tide - s2_height(0.5, 0.0)).abs() < 1e-9);
    assert!((first.cross_distance - (10.0 + 0.5 / 0.1)).abs() < 1e-9);

    // Per-transect partitions exist only for corrected transects
    assert!(roi_dir.join("predicted_tides.csv").exists());
    assert!(roi_dir
        .join("transect_time_series_tidally_corrected.csv")
        .exists());
    assert!(roi_dir.join("t1_timeseries_tidally_corrected.csv").exists());
    assert!(roi_dir.join("t2_timeseries_tidally_corrected.csv").exists());
    assert!(!roi_dir.join("t3_timeseries_tidally_corrected.csv").exists());

    // Settings record was augmented in place
    let settings: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(roi_dir.join("transects_settings.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(settings["reference_elevation"], 0.0);
    assert_eq!(settings["beach_slope"], 0.1);
    assert_eq!(settings["max_std"], 15.0);
}

#[test]
fn single_region_fast_path_matches_general_path() {
    let root = tempfile::tempdir().unwrap();
    let (roi_dir, regions_file, config) = build_session(root.path());
    let regions = RegionMap::from_geojson_file(&regions_file).unwrap();

    let series = read_wide_timeseries(&roi_dir.join("transect_time_series.csv")).unwrap();
    let points =
        load_seaward_points(&roi_dir.join("config_gdf.geojson"), config.source_crs).unwrap();

    let fast = predict_tides(&points, &series, &regions, &FlatFactory, &config).unwrap();
    let general =
        predict_tides_partitioned(&points, &series, &regions, &FlatFactory, &config).unwrap();
    assert_eq!(fast, general);

    // One prediction per (resolvable transect, raw date) pair
    assert_eq!(fast.len(), 7);
}

#[test]
fn predictions_follow_each_transects_own_dates() {
    let root = tempfile::tempdir().unwrap();
    let (roi_dir, regions_file, config) = build_session(root.path());
    let regions = RegionMap::from_geojson_file(&regions_file).unwrap();

    let series = read_wide_timeseries(&roi_dir.join("transect_time_series.csv")).unwrap();
    let points =
        load_seaward_points(&roi_dir.join("config_gdf.geojson"), config.source_crs).unwrap();

    let rows = predict_tides(&points, &series, &regions, &FlatFactory, &config).unwrap();
    // t1 is never predicted at 09:00 (missing raw value there)
    let t1_dates: Vec<_> = rows
        .iter()
        .filter(|r| r.transect_id == "t1")
        .map(|r| r.date)
        .collect();
    assert!(!t1_dates.contains(&Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap()));

    // Synthesized heights follow the S2 clock per date
    for r in &rows {
        let hour = (r.date.timestamp() % 86400) as f64 / 3600.0;
        assert!((r.tide.unwrap() - s2_height(0.5, hour)).abs() < 1e-9);
    }
}

#[test]
fn missing_time_series_halts_the_roi() {
    let root = tempfile::tempdir().unwrap();
    let (roi_dir, regions_file, config) = build_session(root.path());
    let regions = RegionMap::from_geojson_file(&regions_file).unwrap();
    fs::remove_file(roi_dir.join("transect_time_series.csv")).unwrap();

    let err = correct_tides(
        "roi1",
        root.path(),
        &regions,
        &FlatFactory,
        &config,
        0.0,
        0.1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("time series"));
}
