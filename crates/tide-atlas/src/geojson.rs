//! Minimal GeoJSON reading types.
//!
//! Only the subset needed for region boundaries and transect geometry;
//! positions are kept as raw arrays so 3-element (lon, lat, z)
//! coordinates parse without loss.

use serde::Deserialize;
use serde_json::Value;

/// A GeoJSON position; index 0 is longitude, index 1 is latitude.
pub type Position = Vec<f64>;

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Value,
}

impl Feature {
    /// A string property, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// GeoJSON geometry variants used by this pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
}

impl Geometry {
    /// All linear rings of a (multi)polygon, as (lon, lat) pairs.
    pub fn polygon_rings(&self) -> Vec<Vec<(f64, f64)>> {
        let ring_xy = |ring: &Vec<Position>| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| (p[0], p[1]))
                .collect::<Vec<_>>()
        };
        match self {
            Geometry::Polygon { coordinates } => coordinates.iter().map(ring_xy).collect(),
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flat_map(|polygon| polygon.iter().map(ring_xy))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The coordinates of a LineString, as (lon, lat) pairs.
    pub fn line_coordinates(&self) -> Option<Vec<(f64, f64)>> {
        match self {
            Geometry::LineString { coordinates } => Some(
                coordinates
                    .iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| (p[0], p[1]))
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon_feature() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "a"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            }]
        }"#;
        let fc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(fc.features.len(), 1);
        let rings = fc.features[0].geometry.as_ref().unwrap().polygon_rings();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn test_parse_linestring_with_z() {
        let json = r#"{
            "type": "Feature",
            "properties": {"id": "t1", "type": "transect"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[-117.0, 33.0, 0.0], [-117.1, 32.9, 0.0]]
            }
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.property_str("type"), Some("transect"));
        let coords = feature
            .geometry
            .as_ref()
            .unwrap()
            .line_coordinates()
            .unwrap();
        assert_eq!(coords[1], (-117.1, 32.9));
    }
}
