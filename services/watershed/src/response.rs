//! GeoJSON response documents.
//!
//! Every response is a single `Feature`. Attributes follow the ArcGIS
//! feature-service names clients already know: `Shape_Length`,
//! `Shape_Area` (polygons only) and `Shape_Units`, plus a few
//! request-specific properties.
//!
//! Rings are written with RFC 7946 winding (outer boundaries
//! counter-clockwise, holes clockwise). A mask with several separate
//! regions becomes a `MultiPolygon`, with each hole placed in the smallest
//! region that contains it.

use hydro_common::{CoordinateUnit, MapPoint, Polygon, Polyline, Ring};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::flow_path::FlowPathResult;
use crate::raster_query::RasterQueryResult;
use crate::upstream_area::UpstreamAreaResult;

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub geometry: Geometry,

    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            geometry,
            properties: Map::new(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }
}

/// GeoJSON geometry types produced by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString {
        coordinates: Vec<[f64; 2]>,
    },

    /// Array of linear rings (first is exterior, rest are holes).
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },

    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    pub fn line_string(line: &Polyline) -> Self {
        Geometry::LineString {
            coordinates: line.points.iter().map(position).collect(),
        }
    }

    /// Polygon or MultiPolygon, depending on how many outer rings there are.
    pub fn polygon(polygon: &Polygon) -> Self {
        let mut parts: Vec<Vec<Vec<[f64; 2]>>> = group_rings(polygon)
            .into_iter()
            .map(|rings| rings.into_iter().map(rfc7946_ring).collect())
            .collect();

        if parts.len() <= 1 {
            Geometry::Polygon {
                coordinates: parts.pop().unwrap_or_default(),
            }
        } else {
            Geometry::MultiPolygon { coordinates: parts }
        }
    }
}

fn position(point: &MapPoint) -> [f64; 2] {
    [point.x, point.y]
}

/// Ring coordinates reversed from the boundary tracer's winding.
fn rfc7946_ring(ring: &Ring) -> Vec<[f64; 2]> {
    ring.points.iter().rev().map(position).collect()
}

/// Group rings into outer boundaries, each followed by its holes.
fn group_rings(polygon: &Polygon) -> Vec<Vec<&Ring>> {
    let mut parts: Vec<Vec<&Ring>> = polygon
        .rings
        .iter()
        .filter(|ring| ring.is_clockwise())
        .map(|ring| vec![ring])
        .collect();

    // Islands sit inside the holes of larger regions, so the owner is the
    // smallest boundary around the hole, not the first one found
    for hole in polygon.rings.iter().filter(|ring| !ring.is_clockwise()) {
        let owner = hole.interior_point().and_then(|inside| {
            parts
                .iter()
                .enumerate()
                .filter(|(_, part)| part[0].contains(&inside))
                .min_by(|(_, a), (_, b)| {
                    a[0].signed_area()
                        .abs()
                        .total_cmp(&b[0].signed_area().abs())
                })
                .map(|(index, _)| index)
        });
        match owner {
            Some(index) => parts[index].push(hole),
            None => tracing::debug!(points = hole.len(), "Dropping hole outside every boundary"),
        }
    }
    parts
}

/// Feature for a traced flow path.
pub fn flow_path_feature(result: &FlowPathResult, units: &CoordinateUnit) -> Feature {
    let mut feature = Feature::new(Geometry::line_string(&result.path))
        .with_property("Shape_Length", result.length)
        .with_property("Shape_Units", units.describe())
        .with_property("low_res", json!(result.low_res));
    if let Some(high_res) = &result.high_res {
        feature = feature.with_property("high_res", json!(high_res));
    }
    feature
}

/// Feature for an upstream area.
pub fn upstream_area_feature(result: &UpstreamAreaResult, units: &CoordinateUnit) -> Feature {
    let mut feature = Feature::new(Geometry::polygon(&result.polygon))
        .with_property("Shape_Length", result.perimeter)
        .with_property("Shape_Area", result.area)
        .with_property("Shape_Units", units.describe())
        .with_property("outlet", json!([result.outlet.x, result.outlet.y]))
        .with_property("snap_method", json!(result.snap_method))
        .with_property("resolution", json!(result.resolution))
        .with_property("cell_count", result.cell_count);
    if let Some(tile) = &result.tile {
        feature = feature.with_property("tile", tile.as_str());
    }
    feature
}

/// Feature for a raster threshold query.
pub fn raster_query_feature(result: &RasterQueryResult, units: &CoordinateUnit) -> Feature {
    Feature::new(Geometry::polygon(&result.polygon))
        .with_property("Shape_Length", result.perimeter)
        .with_property("Shape_Area", result.area)
        .with_property("Shape_Units", units.describe())
        .with_property("layer", result.layer.as_str())
        .with_property("min", json!(result.range.min))
        .with_property("max", json!(result.range.max))
        .with_property("cell_count", result.cell_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64, clockwise: bool) -> Ring {
        let mut pts = vec![
            MapPoint::new(x0, y0),
            MapPoint::new(x0 + size, y0),
            MapPoint::new(x0 + size, y0 + size),
            MapPoint::new(x0, y0 + size),
        ];
        if clockwise {
            pts.reverse();
        }
        Ring::new(pts)
    }

    #[test]
    fn test_single_region_is_polygon_with_ccw_exterior() {
        let polygon = Polygon::new(vec![square(0.0, 0.0, 3.0, true), square(1.0, 1.0, 1.0, false)]);
        match Geometry::polygon(&polygon) {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates.len(), 2);
                let exterior = Ring::new(coordinates[0].iter().map(|p| MapPoint::new(p[0], p[1])).collect());
                assert!(!exterior.is_clockwise());
            }
            other => panic!("expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_holes_follow_their_region() {
        // The hole belongs to the second region even though it is listed first
        let polygon = Polygon::new(vec![
            square(10.0, 10.0, 1.0, false),
            square(0.0, 0.0, 2.0, true),
            square(9.0, 9.0, 3.0, true),
        ]);
        match Geometry::polygon(&polygon) {
            Geometry::MultiPolygon { coordinates } => {
                assert_eq!(coordinates.len(), 2);
                assert_eq!(coordinates[0].len(), 1);
                assert_eq!(coordinates[1].len(), 2);
            }
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_island_keeps_its_own_hole() {
        // A frame around a ring-shaped island with a hole in its middle
        let mask = test_utils::mask_from_ascii(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.#.#.#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        let metadata =
            hydro_common::RasterMetadata::new(MapPoint::new(0.0, 7.0), 1.0, 1.0, None).unwrap();
        let polygon = flow_analysis::extract_polygon(&mask, &metadata);
        assert_eq!(polygon.rings.len(), 4);
        assert!((polygon.area() - 32.0).abs() < 1e-9);

        match Geometry::polygon(&polygon) {
            Geometry::MultiPolygon { coordinates } => {
                assert_eq!(coordinates.len(), 2);
                for part in &coordinates {
                    assert_eq!(part.len(), 2, "each region has exactly one hole");
                }
                let exterior_area = |part: &Vec<Vec<[f64; 2]>>| {
                    Ring::new(part[0].iter().map(|p| MapPoint::new(p[0], p[1])).collect())
                        .signed_area()
                };
                let mut areas: Vec<f64> = coordinates.iter().map(exterior_area).collect();
                areas.sort_by(f64::total_cmp);
                assert_eq!(areas, vec![9.0, 49.0]);
            }
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_polygon_serializes() {
        let value = serde_json::to_value(Geometry::polygon(&Polygon::default())).unwrap();
        assert_eq!(value, json!({"type": "Polygon", "coordinates": []}));
    }

    #[test]
    fn test_feature_serialization() {
        let line = Polyline::new(vec![MapPoint::new(0.0, 0.0), MapPoint::new(1.0, 0.0)]);
        let feature = Feature::new(Geometry::line_string(&line))
            .with_property("Shape_Units", CoordinateUnit::meters().describe());
        let value = serde_json::to_value(&feature).unwrap();

        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "LineString");
        assert_eq!(value["geometry"]["coordinates"], json!([[0.0, 0.0], [1.0, 0.0]]));
        assert_eq!(value["properties"]["Shape_Units"], "1 m");
    }
}
