//! Tidal slope correction.
//!
//! `correction = (tide − reference_elevation) / beach_slope`, added to
//! the raw cross-shore distance. The join is inner on
//! (transect_id, date): a measurement without a prediction (or the
//! reverse) is dropped, not an error.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::series::{CorrectedRow, RawSeriesRow, TidePredictionRow};

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("beach slope must be non-zero")]
    ZeroBeachSlope,
}

/// Join raw measurements with tide predictions and apply the linear
/// slope correction.
///
/// Masked predictions are dropped with the unmatched rows; the joined
/// result is deduplicated on (transect_id, date). A zero beach slope is
/// rejected before any row is processed.
pub fn apply_correction(
    raw: &[RawSeriesRow],
    tides: &[TidePredictionRow],
    reference_elevation: f64,
    beach_slope: f64,
) -> Result<Vec<CorrectedRow>, CorrectionError> {
    if beach_slope == 0.0 {
        return Err(CorrectionError::ZeroBeachSlope);
    }

    let mut by_key: HashMap<(&str, DateTime<Utc>), &TidePredictionRow> = HashMap::new();
    for t in tides {
        by_key.entry((t.transect_id.as_str(), t.date)).or_insert(t);
    }

    let mut seen: HashSet<(&str, DateTime<Utc>)> = HashSet::new();
    let mut corrected = Vec::new();
    for r in raw {
        let key = (r.transect_id.as_str(), r.date);
        let Some(t) = by_key.get(&key) else {
            continue;
        };
        let Some(tide) = t.tide else {
            continue;
        };
        if !seen.insert(key) {
            continue;
        }
        let correction = (tide - reference_elevation) / beach_slope;
        corrected.push(CorrectedRow {
            transect_id: r.transect_id.clone(),
            date: r.date,
            tide,
            x: t.x,
            y: t.y,
            cross_distance: r.cross_distance + correction,
        });
    }
    Ok(corrected)
}
