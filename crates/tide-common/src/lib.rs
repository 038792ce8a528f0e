//! Common leaf types shared across the shoreline-tides crates.

pub mod crs;
pub mod time;

pub use crs::{CrsCode, CrsError};
pub use time::{TideInstant, TIDE_EPOCH_MJD};
