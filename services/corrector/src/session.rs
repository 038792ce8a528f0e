//! Session directory IO.
//!
//! A session holds one sub-directory per region of interest; the ROI
//! directory is the one whose name contains the ROI id. Inside it live
//! the raw time series (`transect_time_series.csv`, wide form), the
//! transect geometry (`config_gdf.geojson`), and the settings record
//! (`transects_settings.json`).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tide_correction::{CorrectedRow, TidePredictionRow, WideTimeSeries};

/// File name of the raw time series inside an ROI directory.
pub const TIME_SERIES_FILE: &str = "transect_time_series.csv";
/// File name of the transect geometry inside an ROI directory.
pub const TRANSECTS_FILE: &str = "config_gdf.geojson";
/// File name of the settings record inside an ROI directory.
pub const SETTINGS_FILE: &str = "transects_settings.json";

/// Columns silently dropped when reading the raw series.
const DROPPED_COLUMNS: &[&str] = &["x", "y", "Unnamed: 0", ""];

/// Locate the ROI's data directory beneath the session root.
pub fn find_roi_directory(session_dir: &Path, roi_id: &str) -> Result<PathBuf> {
    let entries = fs::read_dir(session_dir)
        .with_context(|| format!("session directory not readable: {}", session_dir.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(roi_id))
        {
            return Ok(path);
        }
    }
    bail!(
        "no directory for ROI '{roi_id}' under {}",
        session_dir.display()
    );
}

/// Read the wide raw time series for an ROI.
pub fn read_wide_timeseries(path: &Path) -> Result<WideTimeSeries> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("time series not found: {}", path.display()))?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().context("time series file is empty")?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let dates_col = columns
        .iter()
        .position(|c| *c == "dates")
        .context("time series is missing a 'dates' column")?;
    let keep: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != dates_col && !DROPPED_COLUMNS.contains(c))
        .map(|(i, _)| i)
        .collect();

    let transect_ids: Vec<String> = keep.iter().map(|&i| columns[i].to_string()).collect();
    let mut dates = Vec::new();
    let mut values = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let date = parse_utc_date(fields.get(dates_col).copied().unwrap_or_default())
            .with_context(|| format!("bad date on data row {}", line_no + 1))?;
        dates.push(date);
        values.push(
            keep.iter()
                .map(|&i| {
                    fields
                        .get(i)
                        .and_then(|f| f.parse::<f64>().ok())
                        .filter(|v| v.is_finite())
                })
                .collect(),
        );
    }

    Ok(WideTimeSeries {
        dates,
        transect_ids,
        values,
    })
}

/// Parse a UTC date in RFC 3339 or naive `YYYY-MM-DD[ HH:MM:SS]` form.
pub fn parse_utc_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%#z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{s} 00:00:00"), "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    bail!("unrecognized date: '{s}'")
}

/// Update the settings record in place with the correction parameters.
///
/// The record must already exist; a missing settings file is an error,
/// not an occasion to invent one.
pub fn save_transect_settings(
    roi_dir: &Path,
    reference_elevation: f64,
    beach_slope: f64,
) -> Result<()> {
    let path = roi_dir.join(SETTINGS_FILE);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("settings record not found: {}", path.display()))?;
    let mut settings: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("malformed {}", path.display()))?;
    let object = settings
        .as_object_mut()
        .with_context(|| format!("settings record is not an object: {}", path.display()))?;
    object.insert("reference_elevation".into(), reference_elevation.into());
    object.insert("beach_slope".into(), beach_slope.into());
    fs::write(&path, serde_json::to_string_pretty(&settings)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write the full tide-prediction table; masked tides render as the
/// fill value (empty when the fill value is NaN).
pub fn write_predictions_csv(
    path: &Path,
    rows: &[TidePredictionRow],
    fill_value: f64,
) -> Result<()> {
    let mut out = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(out, "dates,x,y,tide,transect_id")?;
    for r in rows {
        let tide = r.tide.unwrap_or(fill_value);
        writeln!(
            out,
            "{},{},{},{},{}",
            r.date.to_rfc3339(),
            r.x,
            r.y,
            render_value(tide),
            r.transect_id
        )?;
    }
    Ok(())
}

/// Write a corrected-series table.
pub fn write_corrected_csv(path: &Path, rows: &[CorrectedRow]) -> Result<()> {
    let mut out = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(out, "dates,x,y,tide,transect_id,cross_distance")?;
    for r in rows {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            r.date.to_rfc3339(),
            r.x,
            r.y,
            r.tide,
            r.transect_id,
            r.cross_distance
        )?;
    }
    Ok(())
}

/// Write one corrected-series file per transect id.
pub fn write_corrected_csv_per_transect(roi_dir: &Path, rows: &[CorrectedRow]) -> Result<()> {
    let mut ids: Vec<&str> = rows.iter().map(|r| r.transect_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    for id in ids {
        let subset: Vec<CorrectedRow> = rows
            .iter()
            .filter(|r| r.transect_id == id)
            .cloned()
            .collect();
        let path = roi_dir.join(format!("{id}_timeseries_tidally_corrected.csv"));
        write_corrected_csv(&path, &subset)?;
    }
    Ok(())
}

fn render_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_wide_timeseries_drops_index_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TIME_SERIES_FILE);
        fs::write(
            &path,
            "Unnamed: 0,dates,t1,t2,x\n\
             0,2021-01-01 00:00:00+00:00,10.0,20.0,1.0\n\
             1,2021-01-02 00:00:00+00:00,,21.0,1.0\n",
        )
        .unwrap();

        let series = read_wide_timeseries(&path).unwrap();
        assert_eq!(series.transect_ids, vec!["t1", "t2"]);
        assert_eq!(series.dates.len(), 2);
        assert_eq!(series.values[1][0], None);
        assert_eq!(series.values[1][1], Some(21.0));
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(parse_utc_date("2021-01-01T00:00:00Z").is_ok());
        assert!(parse_utc_date("2021-01-01 00:00:00+00:00").is_ok());
        assert!(parse_utc_date("2021-01-01 06:30:00").is_ok());
        assert!(parse_utc_date("2021-01-01").is_ok());
        assert!(parse_utc_date("yesterday").is_err());
    }

    #[test]
    fn test_save_settings_requires_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_transect_settings(dir.path(), 0.5, 0.1).is_err());

        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"max_std": 15.0}"#,
        )
        .unwrap();
        save_transect_settings(dir.path(), 0.5, 0.1).unwrap();

        let text = fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["reference_elevation"], 0.5);
        assert_eq!(v["beach_slope"], 0.1);
        assert_eq!(v["max_std"], 15.0);
    }

    #[test]
    fn test_find_roi_directory_by_substring() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("ID_abc123_datetime_2021")).unwrap();
        let found = find_roi_directory(dir.path(), "abc123").unwrap();
        assert!(found.ends_with("ID_abc123_datetime_2021"));
        assert!(find_roi_directory(dir.path(), "zzz").is_err());
    }
}
