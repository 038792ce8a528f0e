//! Coordinate reference systems and the transform into the atlas's
//! native geographic system (EPSG:4326).
//!
//! Projection inverses are implemented from scratch without external
//! dependencies.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6378137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257223563;
/// UTM scale factor at the central meridian.
const UTM_K0: f64 = 0.9996;
/// UTM false easting (meters).
const UTM_FALSE_EASTING: f64 = 500000.0;
/// UTM false northing for the southern hemisphere (meters).
const UTM_FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Source reference systems accepted for query-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic (treated as geographic degrees)
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// UTM on WGS84 (meters); EPSG 326xx north, 327xx south
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// Parse a numeric EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsError> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            4269 => Ok(CrsCode::Epsg4269),
            3857 | 900913 => Ok(CrsCode::Epsg3857),
            32601..=32660 => Ok(CrsCode::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(CrsCode::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(CrsError::UnsupportedCrs(code.to_string())),
        }
    }

    /// Parse a CRS string such as "EPSG:4326" or a bare numeric code.
    pub fn parse(s: &str) -> Result<Self, CrsError> {
        let code = s
            .trim()
            .to_uppercase()
            .strip_prefix("EPSG:")
            .unwrap_or(s.trim())
            .parse::<u32>()
            .map_err(|_| CrsError::UnsupportedCrs(s.to_string()))?;
        Self::from_epsg(code)
    }

    /// The numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Utm { zone, north: true } => 32600 + *zone as u32,
            CrsCode::Utm { zone, north: false } => 32700 + *zone as u32,
        }
    }

    /// Check if coordinates in this CRS are already geographic degrees.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }

    /// Transform a single point into lon/lat degrees (EPSG:4326).
    pub fn point_to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => (x, y),
            CrsCode::Epsg3857 => web_mercator_inverse(x, y),
            CrsCode::Utm { zone, north } => utm_inverse(x, y, *zone, *north),
        }
    }

    /// Transform equal-length coordinate arrays into lon/lat degrees.
    ///
    /// Mismatched array lengths are a configuration error.
    pub fn to_lonlat(&self, x: &[f64], y: &[f64]) -> Result<(Vec<f64>, Vec<f64>), CrsError> {
        if x.len() != y.len() {
            return Err(CrsError::MismatchedLengths {
                x: x.len(),
                y: y.len(),
            });
        }
        let mut lon = Vec::with_capacity(x.len());
        let mut lat = Vec::with_capacity(y.len());
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let (lo, la) = self.point_to_lonlat(xi, yi);
            lon.push(lo);
            lat.push(la);
        }
        Ok((lon, lat))
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Spherical web-mercator inverse.
fn web_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// UTM (transverse mercator) inverse on the WGS84 ellipsoid.
///
/// Classic footpoint-latitude series; accurate to well under a meter
/// inside a zone, which is far below the atlas grid spacing.
fn utm_inverse(easting: f64, northing: f64, zone: u8, north: bool) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);
    let lon0 = (zone as f64 * 6.0 - 183.0).to_radians();

    let x = easting - UTM_FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - UTM_FALSE_NORTHING_SOUTH
    };

    // Footpoint latitude from the meridian arc.
    let m = y / UTM_K0;
    let mu = m
        / (WGS84_A
            * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin1 = phi1.sin();
    let cos1 = phi1.cos();
    let tan1 = phi1.tan();

    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = x / (n1 * UTM_K0);

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * ep2
                    - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos1;

    (lon.to_degrees(), lat.to_degrees())
}

#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("x and y must be the same length (x: {x}, y: {y})")]
    MismatchedLengths { x: usize, y: usize },
}
