//! Long-form series rows and the tidal slope correction.

pub mod correct;
pub mod series;

pub use correct::{apply_correction, CorrectionError};
pub use series::{CorrectedRow, RawSeriesRow, TidePredictionRow, WideTimeSeries};
