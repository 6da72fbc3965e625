//! Reference flow-line loading from GeoJSON.
//!
//! Accepts a bare `LineString`, a `Feature` wrapping one, or a
//! `FeatureCollection` whose first feature carries one. A `MultiLineString`
//! is accepted when it has a single part.

use std::fs;
use std::io;
use std::path::Path;

use hydro_common::{HydroError, HydroResult, MapPoint, Polyline};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
    Feature { geometry: Option<Geometry> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

impl Geometry {
    fn into_polyline(self, source_name: &str) -> HydroResult<Polyline> {
        let coordinates = match self {
            Geometry::LineString { coordinates } => coordinates,
            Geometry::MultiLineString { mut coordinates } => {
                if coordinates.len() != 1 {
                    return Err(HydroError::parse(
                        source_name,
                        format!("expected a single-part line, found {} parts", coordinates.len()),
                    ));
                }
                coordinates.remove(0)
            }
        };

        let points = coordinates
            .iter()
            .map(|c| match c.as_slice() {
                [x, y, ..] => Ok(MapPoint::new(*x, *y)),
                _ => Err(HydroError::parse(source_name, "coordinate with fewer than two values")),
            })
            .collect::<HydroResult<Vec<_>>>()?;

        if points.len() < 2 {
            return Err(HydroError::parse(source_name, "a flow line needs at least two vertices"));
        }
        Ok(Polyline::new(points))
    }
}

/// Parse a flow line from GeoJSON text.
pub fn parse_polyline(text: &str, source_name: &str) -> HydroResult<Polyline> {
    let document: Document = serde_json::from_str(text)
        .map_err(|e| HydroError::parse(source_name, e.to_string()))?;

    let geometry = match document {
        Document::LineString { coordinates } => Some(Geometry::LineString { coordinates }),
        Document::MultiLineString { coordinates } => Some(Geometry::MultiLineString { coordinates }),
        Document::Feature { geometry } => geometry,
        Document::FeatureCollection { features } => {
            features.into_iter().find_map(|feature| feature.geometry)
        }
    };

    geometry
        .ok_or_else(|| HydroError::parse(source_name, "document has no line geometry"))?
        .into_polyline(source_name)
}

/// Read a flow line from a GeoJSON file.
pub fn read_polyline(path: &Path) -> HydroResult<Polyline> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => HydroError::RasterNotFound(path.display().to_string()),
        _ => HydroError::from(e),
    })?;
    parse_polyline(&text, &path.display().to_string())
}
