//! Value lookups at a batch of points.
//!
//! A layer name resolves either to a single raster (`layers.query`) or to a
//! mosaic of tiles (`layers.mosaics`). Raster layers report one value per
//! point; mosaics report one value per covering tile, collapsed to a single
//! value when only one tile covers the point.

use flow_analysis::{sample_points, SampleValue};
use hydro_common::{HydroError, HydroResult, MapPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::WatershedState;

/// A point to sample, with an optional caller id echoed in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl PointQuery {
    pub fn new(x: f64, y: f64) -> Self {
        Self { id: None, x, y }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn location(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub result: SampleValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPointsResult {
    pub layer: String,
    /// One entry per requested point, in request order.
    pub results: Vec<PointSample>,
}

/// Sample a raster or mosaic layer at every point.
pub fn query_points(
    state: &WatershedState,
    layer: &str,
    points: &[PointQuery],
) -> HydroResult<QueryPointsResult> {
    if points.is_empty() {
        return Err(HydroError::MissingParameter("points".to_string()));
    }
    let layers = &state.config.layers;

    let results = if let Some(layer_id) = layers.query.get(layer) {
        let raster = state.values(layer_id)?;
        let locations: Vec<MapPoint> = points.iter().map(PointQuery::location).collect();
        points
            .iter()
            .zip(sample_points(&raster, &locations))
            .map(|(point, value)| PointSample {
                id: point.id.clone(),
                result: SampleValue::Single(value),
            })
            .collect()
    } else if let Some(mosaic) = layers.mosaics.get(layer) {
        let mut results = Vec::with_capacity(points.len());
        for point in points {
            let location = point.location();
            let mut values = Vec::new();
            for tile in mosaic.covering(&location) {
                let raster = state.values(&tile.layer)?;
                values.extend(sample_points(&raster, &[location]));
            }
            results.push(PointSample {
                id: point.id.clone(),
                result: SampleValue::from_tiles(values),
            });
        }
        results
    } else {
        let known: Vec<&str> = layers
            .query
            .keys()
            .chain(layers.mosaics.keys())
            .map(String::as_str)
            .collect();
        return Err(HydroError::invalid_parameter(
            "layer",
            format!("unknown layer '{}', expected one of [{}]", layer, known.join(", ")),
        ));
    };

    debug!(layer, points = points.len(), "Point query complete");
    Ok(QueryPointsResult {
        layer: layer.to_string(),
        results,
    })
}
