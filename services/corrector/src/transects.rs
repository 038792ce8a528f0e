//! Transect geometry loading.
//!
//! The ROI's `config_gdf.geojson` mixes feature types; only features
//! typed "transect" are kept, and the query location for tide
//! prediction is the seaward (second) coordinate of each line.

use std::path::Path;

use anyhow::{Context, Result};
use tide_atlas::geojson::FeatureCollection;
use tide_atlas::QueryPoint;
use tide_common::CrsCode;
use tracing::warn;

/// Feature type retained from the geometry file.
const TRANSECT_TYPE: &str = "transect";

/// Load the seaward query point of every transect feature.
pub fn load_seaward_points(path: &Path, crs: CrsCode) -> Result<Vec<QueryPoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("transect geometry not found: {}", path.display()))?;
    let collection: FeatureCollection = serde_json::from_str(&text)
        .with_context(|| format!("malformed GeoJSON: {}", path.display()))?;

    let mut points = Vec::new();
    for feature in &collection.features {
        if feature.property_str("type") != Some(TRANSECT_TYPE) {
            continue;
        }
        let Some(id) = feature.property_str("id") else {
            warn!("transect feature without an 'id' property skipped");
            continue;
        };
        let coords = feature
            .geometry
            .as_ref()
            .and_then(|g| g.line_coordinates())
            .unwrap_or_default();
        if coords.len() < 2 {
            warn!(transect_id = id, "transect line has no seaward point");
            continue;
        }
        let (x, y) = coords[1];
        points.push(QueryPoint {
            transect_id: id.to_string(),
            x,
            y,
            crs,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_GDF: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"id": "t1", "type": "transect"},
             "geometry": {"type": "LineString",
                          "coordinates": [[-117.0, 33.0], [-117.1, 32.9]]}},
            {"type": "Feature",
             "properties": {"id": "roi_1", "type": "roi"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[-118.0, 32.0], [-116.0, 32.0], [-116.0, 34.0], [-118.0, 32.0]]]}},
            {"type": "Feature",
             "properties": {"id": "t2", "type": "transect"},
             "geometry": {"type": "LineString",
                          "coordinates": [[-117.2, 33.1], [-117.3, 33.0]]}}
        ]
    }"#;

    #[test]
    fn test_only_transect_features_kept_and_seaward_point_taken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_gdf.geojson");
        std::fs::write(&path, CONFIG_GDF).unwrap();

        let points = load_seaward_points(&path, CrsCode::Epsg4326).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].transect_id, "t1");
        assert_eq!((points[0].x, points[0].y), (-117.1, 32.9));
        assert_eq!(points[1].transect_id, "t2");
    }
}
