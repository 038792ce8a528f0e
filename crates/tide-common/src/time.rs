//! Tide time scale handling.
//!
//! The atlas epoch is 1992-01-01T00:00:00 UTC (MJD 48622); harmonic
//! synthesis works in days since that epoch. Terrestrial Time is derived
//! from UTC through the leap-second table (TT − UT1 ≈ 32.184 s + ΔAT;
//! the sub-second UT1 − UTC wobble is far below tidal phase tolerance).

use chrono::{DateTime, TimeZone, Utc};

/// Modified Julian Day of the atlas epoch (1992-01-01T00:00:00 UTC).
pub const TIDE_EPOCH_MJD: f64 = 48622.0;

/// Leap-second steps as (UTC date of effect, TAI − UTC seconds).
const LEAP_SECONDS: &[((i32, u32, u32), f64)] = &[
    ((1972, 1, 1), 10.0),
    ((1972, 7, 1), 11.0),
    ((1973, 1, 1), 12.0),
    ((1974, 1, 1), 13.0),
    ((1975, 1, 1), 14.0),
    ((1976, 1, 1), 15.0),
    ((1977, 1, 1), 16.0),
    ((1978, 1, 1), 17.0),
    ((1979, 1, 1), 18.0),
    ((1980, 1, 1), 19.0),
    ((1981, 7, 1), 20.0),
    ((1982, 7, 1), 21.0),
    ((1983, 7, 1), 22.0),
    ((1985, 7, 1), 23.0),
    ((1988, 1, 1), 24.0),
    ((1990, 1, 1), 25.0),
    ((1991, 1, 1), 26.0),
    ((1992, 7, 1), 27.0),
    ((1993, 7, 1), 28.0),
    ((1994, 7, 1), 29.0),
    ((1996, 1, 1), 30.0),
    ((1997, 7, 1), 31.0),
    ((1999, 1, 1), 32.0),
    ((2006, 1, 1), 33.0),
    ((2009, 1, 1), 34.0),
    ((2012, 7, 1), 35.0),
    ((2015, 7, 1), 36.0),
    ((2017, 1, 1), 37.0),
];

/// A UTC instant resolved onto the tide time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TideInstant {
    /// The original UTC timestamp.
    pub utc: DateTime<Utc>,
    /// Days since the atlas epoch (UT).
    pub tide_days: f64,
    /// TT − UT1 delta in days for this instant.
    pub tt_ut1: f64,
}

impl TideInstant {
    /// Resolve a UTC timestamp onto the tide time scale.
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        let epoch = Utc.with_ymd_and_hms(1992, 1, 1, 0, 0, 0).unwrap();
        let seconds = (utc - epoch).num_milliseconds() as f64 / 1000.0;
        let tide_days = seconds / 86400.0;
        let tt_ut1 = (32.184 + delta_at(utc)) / 86400.0;
        Self {
            utc,
            tide_days,
            tt_ut1,
        }
    }

    /// Modified Julian Day of this instant (UT).
    pub fn mjd_ut(&self) -> f64 {
        TIDE_EPOCH_MJD + self.tide_days
    }

    /// Modified Julian Day of this instant in Terrestrial Time.
    pub fn mjd_tt(&self) -> f64 {
        self.mjd_ut() + self.tt_ut1
    }

    /// Hour of day (UT), fractional.
    pub fn hour_ut(&self) -> f64 {
        self.tide_days.rem_euclid(1.0) * 24.0
    }
}

/// Resolve a batch of UTC timestamps.
pub fn from_datetimes(times: &[DateTime<Utc>]) -> Vec<TideInstant> {
    times.iter().copied().map(TideInstant::from_utc).collect()
}

/// TAI − UTC seconds in effect at the given instant.
fn delta_at(utc: DateTime<Utc>) -> f64 {
    let mut dat = 0.0;
    for &((y, m, d), step) in LEAP_SECONDS {
        let effective = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        if utc >= effective {
            dat = step;
        } else {
            break;
        }
    }
    dat
}
