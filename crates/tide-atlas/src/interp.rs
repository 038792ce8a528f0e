//! Constituent-grid interpolation.
//!
//! Grids are regular lon/lat rasters of complex harmonic constants.
//! Invalid nodes (land, fill values) are carried as `None`, never as a
//! sentinel float; interpolation renormalizes weights over the valid
//! corners and yields `None` when no valid neighbour remains.

use std::str::FromStr;

use crate::error::AtlasError;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Method used to interpolate constituents from the model grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// Quick bilinear interpolation
    Bilinear,
    /// Bicubic spline interpolation
    Spline,
    /// Regular-grid linear interpolation (same kernel as bilinear)
    Linear,
    /// Nearest grid node
    Nearest,
}

impl FromStr for InterpolationMethod {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bilinear" => Ok(Self::Bilinear),
            "spline" => Ok(Self::Spline),
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            _ => Err(AtlasError::InvalidMethod(s.to_string())),
        }
    }
}

/// A regular lon/lat grid of complex harmonic constants for one
/// constituent.
#[derive(Debug, Clone)]
pub struct ConstituentGrid {
    lon: Vec<f64>,
    lat: Vec<f64>,
    /// Row-major `[lat][lon]`, `(re, im)` in meters; `None` = invalid.
    values: Vec<Option<(f64, f64)>>,
}

impl ConstituentGrid {
    /// Build a grid; `values` is row-major with `lat.len() * lon.len()`
    /// entries and both axes ascending.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>, values: Vec<Option<(f64, f64)>>) -> Self {
        debug_assert_eq!(values.len(), lon.len() * lat.len());
        Self { lon, lat, values }
    }

    fn value(&self, col: usize, row: usize) -> Option<(f64, f64)> {
        self.values[row * self.lon.len() + col]
    }

    /// Map a query lon into the grid's longitude convention (grids may
    /// span 0..360 while queries arrive in -180..180, or vice versa).
    fn normalize_lon(&self, lon: f64) -> f64 {
        let (Some(&first), Some(&last)) = (self.lon.first(), self.lon.last()) else {
            return lon;
        };
        for candidate in [lon, lon + 360.0, lon - 360.0] {
            if candidate >= first && candidate <= last {
                return candidate;
            }
        }
        lon
    }

    /// Fractional grid indices of a query point, or `None` outside the
    /// grid domain.
    fn fractional_index(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (nx, ny) = (self.lon.len(), self.lat.len());
        if nx < 2 || ny < 2 {
            return None;
        }
        let lon = self.normalize_lon(lon);
        let dx = (self.lon[nx - 1] - self.lon[0]) / (nx - 1) as f64;
        let dy = (self.lat[ny - 1] - self.lat[0]) / (ny - 1) as f64;
        let fx = (lon - self.lon[0]) / dx;
        let fy = (lat - self.lat[0]) / dy;
        if fx < 0.0 || fy < 0.0 || fx > (nx - 1) as f64 || fy > (ny - 1) as f64 {
            return None;
        }
        Some((fx, fy))
    }

    /// Interpolate the complex constant at a query point.
    ///
    /// Returns `None` outside the domain or when every contributing node
    /// is invalid.
    pub fn sample(&self, method: InterpolationMethod, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (fx, fy) = self.fractional_index(lon, lat)?;
        match method {
            InterpolationMethod::Bilinear | InterpolationMethod::Linear => {
                self.bilinear(fx, fy)
            }
            InterpolationMethod::Nearest => {
                self.value(fx.round() as usize, fy.round() as usize)
            }
            InterpolationMethod::Spline => self.bicubic(fx, fy),
        }
    }

    /// Bilinear interpolation with weight renormalization over the valid
    /// corners.
    fn bilinear(&self, fx: f64, fy: f64) -> Option<(f64, f64)> {
        let (nx, ny) = (self.lon.len(), self.lat.len());
        let x0 = (fx.floor() as usize).min(nx - 1);
        let y0 = (fy.floor() as usize).min(ny - 1);
        let x1 = (x0 + 1).min(nx - 1);
        let y1 = (y0 + 1).min(ny - 1);
        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let corners = [
            (self.value(x0, y0), (1.0 - tx) * (1.0 - ty)),
            (self.value(x1, y0), tx * (1.0 - ty)),
            (self.value(x0, y1), (1.0 - tx) * ty),
            (self.value(x1, y1), tx * ty),
        ];

        let mut total = 0.0;
        let mut re = 0.0;
        let mut im = 0.0;
        for (v, w) in corners {
            if let Some((vr, vi)) = v {
                total += w;
                re += w * vr;
                im += w * vi;
            }
        }
        if total < 1e-12 {
            return None;
        }
        Some((re / total, im / total))
    }

    /// Bicubic (Catmull-Rom) interpolation; falls back to bilinear when
    /// any of the 16 support nodes is invalid.
    fn bicubic(&self, fx: f64, fy: f64) -> Option<(f64, f64)> {
        let (nx, ny) = (self.lon.len(), self.lat.len());
        let xi = fx.floor() as i64;
        let yi = fy.floor() as i64;
        let tx = fx - xi as f64;
        let ty = fy - yi as f64;

        let mut patch = [[(0.0, 0.0); 4]; 4];
        for (j, row) in patch.iter_mut().enumerate() {
            for (i, cell) in row.iter_mut().enumerate() {
                let col = (xi + i as i64 - 1).clamp(0, nx as i64 - 1) as usize;
                let crow = (yi + j as i64 - 1).clamp(0, ny as i64 - 1) as usize;
                match self.value(col, crow) {
                    Some(v) => *cell = v,
                    None => return self.bilinear(fx, fy),
                }
            }
        }

        let mut rows = [(0.0, 0.0); 4];
        for (j, row) in patch.iter().enumerate() {
            rows[j] = (
                cubic_1d(row[0].0, row[1].0, row[2].0, row[3].0, tx),
                cubic_1d(row[0].1, row[1].1, row[2].1, row[3].1, tx),
            );
        }
        Some((
            cubic_1d(rows[0].0, rows[1].0, rows[2].0, rows[3].0, ty),
            cubic_1d(rows[0].1, rows[1].1, rows[2].1, rows[3].1, ty),
        ))
    }

    /// Nearest valid node by great-circle distance, bounded by a cutoff
    /// in kilometers (`f64::INFINITY` disables the bound).
    pub fn nearest_valid_within(&self, lon: f64, lat: f64, cutoff_km: f64) -> Option<(f64, f64)> {
        let lon = self.normalize_lon(lon);
        let mut best: Option<(f64, (f64, f64))> = None;
        for (row, &glat) in self.lat.iter().enumerate() {
            for (col, &glon) in self.lon.iter().enumerate() {
                if let Some(v) = self.value(col, row) {
                    let d = haversine_km(lon, lat, glon, glat);
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, v));
                    }
                }
            }
        }
        match best {
            Some((d, v)) if d <= cutoff_km => Some(v),
            _ => None,
        }
    }
}

/// Catmull-Rom interpolation between `p1` and `p2`.
fn cubic_1d(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    a * t3 + b * t2 + c * t + p1
}

/// Great-circle distance between two lon/lat points in kilometers.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> ConstituentGrid {
        ConstituentGrid::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![
                Some((1.0, 0.0)),
                Some((2.0, 0.0)),
                Some((3.0, 0.0)),
                Some((4.0, 0.0)),
            ],
        )
    }

    #[test]
    fn test_bilinear_center() {
        let g = grid_2x2();
        let (re, _) = g.sample(InterpolationMethod::Bilinear, 0.5, 0.5).unwrap();
        assert!((re - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bilinear_renormalizes_over_invalid_corner() {
        let g = ConstituentGrid::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![Some((1.0, 0.0)), None, Some((3.0, 0.0)), Some((4.0, 0.0))],
        );
        // Three valid corners with equal weight at the center
        let (re, _) = g.sample(InterpolationMethod::Bilinear, 0.5, 0.5).unwrap();
        assert!((re - (1.0 + 3.0 + 4.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_invalid_is_masked() {
        let g = ConstituentGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![None; 4]);
        assert!(g.sample(InterpolationMethod::Bilinear, 0.5, 0.5).is_none());
    }

    #[test]
    fn test_outside_domain_is_masked() {
        let g = grid_2x2();
        assert!(g.sample(InterpolationMethod::Bilinear, 2.0, 0.5).is_none());
    }

    #[test]
    fn test_nearest() {
        let g = grid_2x2();
        assert_eq!(
            g.sample(InterpolationMethod::Nearest, 0.9, 0.1),
            Some((2.0, 0.0))
        );
    }

    #[test]
    fn test_spline_matches_bilinear_on_plane() {
        // Catmull-Rom reproduces linear data exactly
        let lon: Vec<f64> = (0..5).map(f64::from).collect();
        let lat: Vec<f64> = (0..5).map(f64::from).collect();
        let values: Vec<Option<(f64, f64)>> = (0..5)
            .flat_map(|j| (0..5).map(move |i| Some(((i + 2 * j) as f64, 0.0))))
            .collect();
        let g = ConstituentGrid::new(lon, lat, values);
        let (s, _) = g.sample(InterpolationMethod::Spline, 2.25, 1.75).unwrap();
        let (b, _) = g.sample(InterpolationMethod::Bilinear, 2.25, 1.75).unwrap();
        assert!((s - b).abs() < 1e-9);
    }

    #[test]
    fn test_lon_normalization_into_0_360() {
        let g = ConstituentGrid::new(
            vec![240.0, 241.0],
            vec![32.0, 33.0],
            vec![Some((1.0, 0.0)); 4],
        );
        // -119.5°E is 240.5 in the grid's convention
        assert!(g.sample(InterpolationMethod::Bilinear, -119.5, 32.5).is_some());
    }

    #[test]
    fn test_extrapolation_cutoff() {
        let g = grid_2x2();
        // ~111 km per degree; a point 2° away is outside a 10 km cutoff
        assert!(g.nearest_valid_within(3.0, 0.0, 10.0).is_none());
        assert!(g.nearest_valid_within(3.0, 0.0, f64::INFINITY).is_some());
        assert_eq!(g.nearest_valid_within(1.01, 1.0, 10.0), Some((4.0, 0.0)));
    }
}
