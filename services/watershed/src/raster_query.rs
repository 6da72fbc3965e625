//! Threshold query over a named raster layer.

use flow_analysis::{extract_polygon, threshold_mask, ValueRange};
use hydro_common::{HydroError, HydroResult, Polygon};
use tracing::debug;

use crate::state::WatershedState;

#[derive(Debug, Clone)]
pub struct RasterQueryResult {
    /// Public layer name as requested.
    pub layer: String,
    pub range: ValueRange,
    pub polygon: Polygon,
    pub cell_count: usize,
    pub area: f64,
    pub perimeter: f64,
}

/// Outline the cells of a query layer whose values fall inside `range`.
///
/// Layer names are resolved through the configured `layers.query` table;
/// an unknown name is an invalid parameter.
pub fn query_raster(
    state: &WatershedState,
    layer: &str,
    range: ValueRange,
) -> HydroResult<RasterQueryResult> {
    range.validate()?;

    let layer_id = state.config.layers.query.get(layer).ok_or_else(|| {
        let known: Vec<&str> = state.config.layers.query.keys().map(String::as_str).collect();
        HydroError::invalid_parameter(
            "layer",
            format!("unknown layer '{}', expected one of [{}]", layer, known.join(", ")),
        )
    })?;

    let raster = state.values(layer_id)?;
    let mask = threshold_mask(&raster, &range)?;
    let polygon = extract_polygon(&mask, &raster.metadata);
    let cell_count = mask.count_true();

    debug!(
        layer,
        cells = cell_count,
        rings = polygon.rings.len(),
        "Raster query complete"
    );

    Ok(RasterQueryResult {
        layer: layer.to_string(),
        range,
        area: polygon.area(),
        perimeter: polygon.perimeter(),
        polygon,
        cell_count,
    })
}
