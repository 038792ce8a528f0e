//! Harmonic-constituent extraction from a clipped model region.
//!
//! One netCDF grid file per constituent under
//! `<region>/fes2014/ocean_tide/`; amplitude is stored in centimetres and
//! phase in degrees. Extraction interpolates the complex constant at
//! each query point and converts back to amplitude/phase, keeping
//! invalid points masked.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::error::{AtlasError, AtlasResult};
use crate::interp::{ConstituentGrid, InterpolationMethod};

/// FES grids store amplitude in centimetres.
const FES_AMPLITUDE_SCALE: f64 = 0.01;

/// Per-point amplitude/phase aligned to the model's constituent list.
#[derive(Debug, Clone)]
pub struct HarmonicConstants {
    /// Constituent names in file order.
    pub constituents: Vec<String>,
    /// `[point][constituent]` amplitude in meters; `None` = masked.
    pub amplitude: Vec<Vec<Option<f64>>>,
    /// `[point][constituent]` phase in degrees; mask matches `amplitude`.
    pub phase: Vec<Vec<Option<f64>>>,
}

impl HarmonicConstants {
    pub fn n_points(&self) -> usize {
        self.amplitude.len()
    }
}

/// Source of harmonic constants for query locations.
///
/// The on-disk FES atlas implements this; tests drive the synthesis
/// pipeline through synthetic implementations.
pub trait ConstituentSource {
    /// Constituent names this source resolves, in output order.
    fn constituents(&self) -> &[String];

    /// Extract per-point constants for equal-length lon/lat arrays.
    fn extract(&self, lon: &[f64], lat: &[f64]) -> AtlasResult<HarmonicConstants>;
}

/// One region of the clipped FES2014 atlas.
#[derive(Debug, Clone)]
pub struct FesRegionAtlas {
    constituents: Vec<String>,
    files: Vec<PathBuf>,
    method: InterpolationMethod,
    extrapolate: bool,
    cutoff_km: f64,
}

impl FesRegionAtlas {
    /// Open a region directory (`<root>/region<N>`).
    ///
    /// Fails with a resource error if the elevation grid directory is
    /// missing; grid files themselves are read lazily per extraction.
    pub fn open(
        region_dir: impl AsRef<Path>,
        method: InterpolationMethod,
        extrapolate: bool,
        cutoff_km: f64,
    ) -> AtlasResult<Self> {
        let region_dir = region_dir.as_ref();
        let grid_dir = region_dir.join("fes2014").join("ocean_tide");
        if !grid_dir.is_dir() {
            return Err(AtlasError::MissingRegionDir {
                region: region_index_of(region_dir),
                path: grid_dir,
            });
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&grid_dir)
            .map_err(|e| AtlasError::io(&grid_dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "nc"))
            .collect();
        files.sort();

        let constituents = files
            .iter()
            .map(|p| {
                p.file_stem()
                    .map(|s| s.to_string_lossy().to_lowercase())
                    .unwrap_or_default()
            })
            .collect();

        Ok(Self {
            constituents,
            files,
            method,
            extrapolate,
            cutoff_km,
        })
    }
}

impl ConstituentSource for FesRegionAtlas {
    fn constituents(&self) -> &[String] {
        &self.constituents
    }

    fn extract(&self, lon: &[f64], lat: &[f64]) -> AtlasResult<HarmonicConstants> {
        let n_points = lon.len();
        let n_cons = self.constituents.len();
        let mut amplitude = vec![vec![None; n_cons]; n_points];
        let mut phase = vec![vec![None; n_cons]; n_points];

        for (k, path) in self.files.iter().enumerate() {
            let grid = load_constituent_grid(path)?;
            debug!(constituent = %self.constituents[k], points = n_points, "interpolating");

            let samples: Vec<Option<(f64, f64)>> = lon
                .par_iter()
                .zip(lat.par_iter())
                .map(|(&lo, &la)| {
                    match grid.sample(self.method, lo, la) {
                        Some(v) => Some(v),
                        None if self.extrapolate => {
                            grid.nearest_valid_within(lo, la, self.cutoff_km)
                        }
                        None => None,
                    }
                })
                .collect();

            for (i, sample) in samples.into_iter().enumerate() {
                let (amp, ph) = amp_phase_from_complex(sample);
                amplitude[i][k] = amp;
                phase[i][k] = ph;
            }
        }

        Ok(HarmonicConstants {
            constituents: self.constituents.clone(),
            amplitude,
            phase,
        })
    }
}

/// Split an interpolated complex constant into amplitude (meters) and
/// phase (degrees in [0, 360)).
fn amp_phase_from_complex(value: Option<(f64, f64)>) -> (Option<f64>, Option<f64>) {
    match value {
        Some((re, im)) => (
            Some(re.hypot(im)),
            Some(im.atan2(re).to_degrees().rem_euclid(360.0)),
        ),
        None => (None, None),
    }
}

/// Numeric region index from a `region<N>` directory name.
fn region_index_of(region_dir: &Path) -> u32 {
    region_dir
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("region"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Read one constituent grid file into complex form.
fn load_constituent_grid(path: &Path) -> AtlasResult<ConstituentGrid> {
    let file =
        netcdf::open(path).map_err(|e| AtlasError::grid_read(path, e.to_string()))?;

    let lon = read_axis(&file, path, &["lon", "longitude"])?;
    let lat = read_axis(&file, path, &["lat", "latitude"])?;

    let amp_var = file
        .variable("amplitude")
        .ok_or_else(|| AtlasError::grid_read(path, "missing 'amplitude' variable"))?;
    let ph_var = file
        .variable("phase")
        .ok_or_else(|| AtlasError::grid_read(path, "missing 'phase' variable"))?;

    let amp: Vec<f64> = amp_var
        .get_values(..)
        .map_err(|e| AtlasError::grid_read(path, e.to_string()))?;
    let ph: Vec<f64> = ph_var
        .get_values(..)
        .map_err(|e| AtlasError::grid_read(path, e.to_string()))?;
    if amp.len() != lon.len() * lat.len() || ph.len() != amp.len() {
        return Err(AtlasError::grid_read(path, "grid shape mismatch"));
    }

    let amp_fill = f64_attr(&amp_var, "_FillValue");
    let ph_fill = f64_attr(&ph_var, "_FillValue");

    let mut values: Vec<Option<(f64, f64)>> = amp
        .iter()
        .zip(ph.iter())
        .map(|(&a, &p)| {
            if !is_valid(a, amp_fill) || !is_valid(p, ph_fill) {
                return None;
            }
            let amp_m = a * FES_AMPLITUDE_SCALE;
            let ph_rad = p.to_radians();
            Some((amp_m * ph_rad.cos(), amp_m * ph_rad.sin()))
        })
        .collect();

    // Keep both axes ascending; FES latitudes occasionally come
    // north-to-south.
    let mut lat = lat;
    if lat.len() > 1 && lat[0] > lat[1] {
        lat.reverse();
        let width = lon.len();
        let mut flipped = Vec::with_capacity(values.len());
        for row in (0..lat.len()).rev() {
            flipped.extend_from_slice(&values[row * width..(row + 1) * width]);
        }
        values = flipped;
    }

    Ok(ConstituentGrid::new(lon, lat, values))
}

fn read_axis(file: &netcdf::File, path: &Path, names: &[&str]) -> AtlasResult<Vec<f64>> {
    for name in names {
        if let Some(var) = file.variable(name) {
            return var
                .get_values(..)
                .map_err(|e| AtlasError::grid_read(path, e.to_string()));
        }
    }
    Err(AtlasError::grid_read(
        path,
        format!("missing axis variable (tried {})", names.join(", ")),
    ))
}

/// Fetch a numeric attribute, tolerating any stored width.
fn f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !var.attributes().any(|a| a.name() == name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

/// A node is valid when finite, not the fill value, and physically
/// plausible (FES fill values are astronomically large floats).
fn is_valid(v: f64, fill: Option<f64>) -> bool {
    if !v.is_finite() || v.abs() > 1e10 {
        return false;
    }
    match fill {
        Some(f) => (v - f).abs() > f.abs() * 1e-6 + 1e-6,
        None => true,
    }
}
