//! The tide-prediction pipeline for one region of interest.
//!
//! Query geometry → coordinate transform → region resolution →
//! per-region constituent extraction and harmonic synthesis → one flat
//! prediction table. Dispatch takes a single-region fast path when every
//! resolved point falls in the same region; the general path partitions
//! by region id and produces an identical table.

use std::collections::BTreeMap;

use anyhow::Result;
use tide_atlas::{ConstituentSource, FesRegionAtlas, ModelLayout, QueryPoint, RegionMap};
use tide_atlas::error::AtlasResult;
use tide_common::time;
use tide_correction::{TidePredictionRow, WideTimeSeries};
use tide_predict::synthesize_drift;
use tracing::debug;

use crate::config::TideModelConfig;

/// Opens the constituent source for a region.
///
/// The on-disk atlas implements this; tests substitute synthetic
/// sources.
pub trait RegionSourceFactory {
    fn open_region(&self, region_id: u32) -> AtlasResult<Box<dyn ConstituentSource>>;
}

/// Factory over the validated clipped-model layout.
pub struct FesSourceFactory<'a> {
    pub layout: &'a ModelLayout,
    pub config: &'a TideModelConfig,
}

impl RegionSourceFactory for FesSourceFactory<'_> {
    fn open_region(&self, region_id: u32) -> AtlasResult<Box<dyn ConstituentSource>> {
        let atlas = FesRegionAtlas::open(
            self.layout.region_directory(region_id),
            self.config.method,
            self.config.extrapolate,
            self.config.cutoff_km,
        )?;
        Ok(Box::new(atlas))
    }
}

/// A query point annotated with its atlas-native coordinates.
struct ResolvedQuery<'a> {
    point: &'a QueryPoint,
    lon: f64,
    lat: f64,
}

/// Predict tides for every resolvable query point.
///
/// With exactly one distinct resolved region the per-region
/// partitioning is skipped; otherwise this is [`predict_tides_partitioned`].
pub fn predict_tides(
    points: &[QueryPoint],
    series: &WideTimeSeries,
    regions: &RegionMap,
    factory: &dyn RegionSourceFactory,
    config: &TideModelConfig,
) -> Result<Vec<TidePredictionRow>> {
    let groups = resolve_points(points, regions, config)?;
    if groups.len() == 1 {
        let (&region_id, entries) = groups.iter().next().unwrap();
        debug!(region_id, "single-region fast path");
        return predict_for_region(region_id, entries, series, factory);
    }
    predict_groups(&groups, series, factory)
}

/// The general multi-region path: partition by region id and predict
/// each partition independently.
pub fn predict_tides_partitioned(
    points: &[QueryPoint],
    series: &WideTimeSeries,
    regions: &RegionMap,
    factory: &dyn RegionSourceFactory,
    config: &TideModelConfig,
) -> Result<Vec<TidePredictionRow>> {
    let groups = resolve_points(points, regions, config)?;
    predict_groups(&groups, series, factory)
}

/// Transform coordinates into the atlas's system and group the points
/// by owning region; unresolved points are excluded here.
fn resolve_points<'a>(
    points: &'a [QueryPoint],
    regions: &RegionMap,
    config: &TideModelConfig,
) -> Result<BTreeMap<u32, Vec<ResolvedQuery<'a>>>> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let (lon, lat) = config.source_crs.to_lonlat(&xs, &ys)?;
    let resolved = regions.resolve(&lon, &lat);

    let mut groups: BTreeMap<u32, Vec<ResolvedQuery<'a>>> = BTreeMap::new();
    for (i, region) in resolved.into_iter().enumerate() {
        if let Some(region_id) = region {
            groups.entry(region_id).or_default().push(ResolvedQuery {
                point: &points[i],
                lon: lon[i],
                lat: lat[i],
            });
        }
    }
    Ok(groups)
}

fn predict_groups(
    groups: &BTreeMap<u32, Vec<ResolvedQuery<'_>>>,
    series: &WideTimeSeries,
    factory: &dyn RegionSourceFactory,
) -> Result<Vec<TidePredictionRow>> {
    let mut rows = Vec::new();
    for (&region_id, entries) in groups {
        rows.extend(predict_for_region(region_id, entries, series, factory)?);
    }
    Ok(rows)
}

/// Extract constituents once for a region's points and synthesize each
/// transect over the dates that exist in its raw series.
fn predict_for_region(
    region_id: u32,
    entries: &[ResolvedQuery<'_>],
    series: &WideTimeSeries,
    factory: &dyn RegionSourceFactory,
) -> Result<Vec<TidePredictionRow>> {
    // Transects without a raw-series column (or with no usable dates)
    // get no prediction rows.
    let active: Vec<&ResolvedQuery<'_>> = entries
        .iter()
        .filter(|e| !series.dates_for(&e.point.transect_id).is_empty())
        .collect();
    if active.is_empty() {
        return Ok(Vec::new());
    }

    let source = factory.open_region(region_id)?;
    let lons: Vec<f64> = active.iter().map(|e| e.lon).collect();
    let lats: Vec<f64> = active.iter().map(|e| e.lat).collect();
    let constants = source.extract(&lons, &lats)?;

    let mut rows = Vec::new();
    for (i, entry) in active.iter().enumerate() {
        let dates = series.dates_for(&entry.point.transect_id);
        let times = time::from_datetimes(&dates);
        let triples = synthesize_drift(
            &times,
            std::slice::from_ref(&constants.amplitude[i]),
            std::slice::from_ref(&constants.phase[i]),
            &constants.constituents,
        );
        rows.extend(triples.into_iter().map(|t| TidePredictionRow {
            transect_id: entry.point.transect_id.clone(),
            date: dates[t.time],
            x: entry.point.x,
            y: entry.point.y,
            tide: t.height,
        }));
    }
    Ok(rows)
}
