//! Region-boundary collection and point-to-region resolution.
//!
//! The clipped model ships a boundary file with one polygon per region;
//! `region_id` is the feature's positional index at load time. A query
//! point resolves to the first region whose boundary contains it, or to
//! none at all — nearest-region fallback is deliberately absent.

use std::path::Path;

use tide_common::CrsCode;
use tracing::warn;

use crate::error::{AtlasError, AtlasResult};
use crate::geojson::FeatureCollection;

/// A query location derived from a transect's seaward endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPoint {
    /// Identifier of the owning transect.
    pub transect_id: String,
    pub x: f64,
    pub y: f64,
    /// Reference system of `x`/`y`.
    pub crs: CrsCode,
}

/// One atlas region boundary.
#[derive(Debug, Clone)]
struct Region {
    id: u32,
    /// All linear rings (outer and holes); containment is even-odd.
    rings: Vec<Vec<(f64, f64)>>,
}

impl Region {
    /// Even-odd ray casting over every ring.
    fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if ((yi > lat) != (yj > lat))
                    && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi)
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// The loaded region-boundary collection, read-only after load.
#[derive(Debug, Clone)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Load region boundaries from a GeoJSON file, assigning region ids
    /// by feature index.
    pub fn from_geojson_file(path: impl AsRef<Path>) -> AtlasResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AtlasError::RegionFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let collection: FeatureCollection =
            serde_json::from_str(&text).map_err(|e| AtlasError::RegionFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::from_collection(&collection))
    }

    /// Build the map from an already-parsed FeatureCollection.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let regions = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| Region {
                id: index as u32,
                rings: feature
                    .geometry
                    .as_ref()
                    .map(|g| g.polygon_rings())
                    .unwrap_or_default(),
            })
            .collect();
        Self { regions }
    }

    /// Number of loaded regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The region containing the given lon/lat, if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<u32> {
        self.regions
            .iter()
            .find(|r| r.contains(lon, lat))
            .map(|r| r.id)
    }

    /// Resolve each lon/lat pair to its owning region id.
    ///
    /// Points outside every boundary resolve to `None`; they are excluded
    /// downstream, and only a diagnostic count is surfaced here.
    pub fn resolve(&self, lon: &[f64], lat: &[f64]) -> Vec<Option<u32>> {
        let resolved: Vec<Option<u32>> = lon
            .iter()
            .zip(lat.iter())
            .map(|(&lo, &la)| self.locate(lo, la))
            .collect();
        let dropped = resolved.iter().filter(|r| r.is_none()).count();
        if dropped > 0 {
            warn!(
                dropped,
                total = resolved.len(),
                "query points outside every model region will be excluded"
            );
        }
        resolved
    }
}
