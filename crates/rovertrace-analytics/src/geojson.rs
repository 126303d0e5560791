//! Single-polyline GeoJSON rendering of a [`TraverseResult`].
//!
//! The path becomes one `Feature`:
//!
//! | Points | Geometry |
//! |--------|----------|
//! | 0      | `null` |
//! | 1      | `Point` |
//! | ≥ 2    | `LineString` of `[x, y, z]` |
//!
//! `properties` carries the vehicle name and every field of the
//! [`TraverseSummary`].  Coordinates are rover-local metres, not WGS-84.

use serde::Serialize;

use crate::output::rounded_point;
use crate::traverse::{TraverseResult, TraverseSummary};

/// GeoJSON geometry for a traverse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 3]),
    LineString(Vec<[f64; 3]>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraverseProperties<'a> {
    pub vehicle: &'a str,
    #[serde(flatten)]
    pub summary: &'a TraverseSummary,
}

/// A GeoJSON `Feature` borrowing from the traverse it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraverseFeature<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Option<Geometry>,
    pub properties: TraverseProperties<'a>,
}

impl TraverseResult {
    /// Render this traverse as a GeoJSON `Feature`.
    pub fn to_geojson<'a>(&'a self, vehicle: &'a str) -> TraverseFeature<'a> {
        let mut coords: Vec<[f64; 3]> = self
            .points
            .iter()
            .map(|p| rounded_point(p.point(), 2).to_array())
            .collect();

        let geometry = match coords.len() {
            0 => None,
            1 => coords.pop().map(Geometry::Point),
            _ => Some(Geometry::LineString(coords)),
        };

        TraverseFeature {
            kind: "Feature",
            geometry,
            properties: TraverseProperties {
                vehicle,
                summary: &self.summary,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::traverse::{TraverseOptions, TraverseResult, build};
    use rovertrace_types::{Position, TelemetryRecord};

    fn traverse(points: &[(f64, f64, f64)]) -> TraverseResult {
        let records: Vec<TelemetryRecord> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| {
                TelemetryRecord::new(i as u64, "opportunity", i as u32, "NAVCAM")
                    .with_position(Position::new(x, y, z))
            })
            .collect();
        build(&records, &TraverseOptions::default())
    }

    #[test]
    fn empty_traverse_has_null_geometry() {
        let json = serde_json::to_value(TraverseResult::empty().to_geojson("opportunity")).unwrap();
        assert_eq!(json["type"], "Feature");
        assert!(json["geometry"].is_null());
        assert_eq!(json["properties"]["vehicle"], "opportunity");
        assert_eq!(json["properties"]["original_point_count"], 0);
    }

    #[test]
    fn single_point_becomes_point_geometry() {
        let t = traverse(&[(1.0, 2.0, 3.0)]);
        let json = serde_json::to_value(t.to_geojson("opportunity")).unwrap();
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"], serde_json::json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn path_becomes_linestring_with_summary_properties() {
        let t = traverse(&[(0.0, 0.0, 0.0), (3.0, 4.0, 0.0), (3.0, 4.0, 1.0)]);
        let json = serde_json::to_value(t.to_geojson("opportunity")).unwrap();
        assert_eq!(json["geometry"]["type"], "LineString");
        let coords = json["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[1], serde_json::json!([3.0, 4.0, 0.0]));
        assert_eq!(json["properties"]["total_distance_m"], 6.0);
        assert_eq!(json["properties"]["elevation_gain_m"], 1.0);
        assert!(json["properties"]["bounding_box"].is_object());
    }
}
