//! Typed relational rows for the correction pipeline.
//!
//! The raw time series arrives wide (one column per transect) and is
//! reshaped to long form with missing values dropped; joins are keyed on
//! (transect_id, date) and the joined result is deduplicated on the same
//! key.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One long-form raw measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSeriesRow {
    pub transect_id: String,
    pub date: DateTime<Utc>,
    pub cross_distance: f64,
}

/// One predicted tide sample at a transect's seaward point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidePredictionRow {
    pub transect_id: String,
    pub date: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    /// Tide height in meters; `None` is a masked prediction, dropped at
    /// the output boundary.
    pub tide: Option<f64>,
}

/// One corrected measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectedRow {
    pub transect_id: String,
    pub date: DateTime<Utc>,
    pub tide: f64,
    pub x: f64,
    pub y: f64,
    /// Cross-shore distance with the slope correction already applied.
    pub cross_distance: f64,
}

/// A wide time series: one row per date, one column per transect.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTimeSeries {
    pub dates: Vec<DateTime<Utc>>,
    pub transect_ids: Vec<String>,
    /// `[date][transect]`; `None` marks a missing measurement.
    pub values: Vec<Vec<Option<f64>>>,
}

impl WideTimeSeries {
    /// Reshape to long form, dropping missing values.
    pub fn melt(&self) -> Vec<RawSeriesRow> {
        let mut rows = Vec::new();
        for (col, transect_id) in self.transect_ids.iter().enumerate() {
            for (row, date) in self.dates.iter().enumerate() {
                if let Some(value) = self.values[row][col] {
                    rows.push(RawSeriesRow {
                        transect_id: transect_id.clone(),
                        date: *date,
                        cross_distance: value,
                    });
                }
            }
        }
        rows
    }

    /// Whether the series has a column for the given transect.
    pub fn has_transect(&self, transect_id: &str) -> bool {
        self.transect_ids.iter().any(|id| id == transect_id)
    }

    /// The dates with a non-missing value for one transect.
    pub fn dates_for(&self, transect_id: &str) -> Vec<DateTime<Utc>> {
        let Some(col) = self.transect_ids.iter().position(|id| id == transect_id) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(self.values.iter())
            .filter(|(_, row)| row[col].is_some())
            .map(|(date, _)| *date)
            .collect()
    }
}
