//! Upstream area: snap the outlet, pick a resolution, solve and vectorize.

use std::sync::Arc;

use flow_analysis::{extract_polygon, snap_pour_point, upstream_area, SnapContext, SnapMethod};
use hydro_common::{Grid, HydroError, HydroResult, MapPoint, Polygon, Raster, RasterMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::state::WatershedState;

/// Which flow-direction grid the area was solved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    High,
    Low,
}

#[derive(Debug, Clone)]
pub struct UpstreamAreaResult {
    pub polygon: Polygon,
    /// The outlet after snapping.
    pub outlet: MapPoint,
    pub snap_method: SnapMethod,
    pub resolution: Resolution,
    /// High-resolution tile id when `resolution` is `High`.
    pub tile: Option<String>,
    pub cell_count: usize,
    pub area: f64,
    pub perimeter: f64,
    /// The solved cell mask and the georeferencing of its grid.
    pub mask: Grid<bool>,
    pub metadata: RasterMetadata,
}

struct HighResTile {
    id: String,
    directions: Arc<Raster<i32>>,
    accumulation: Arc<Raster<f64>>,
}

fn open_tile(state: &WatershedState, outlet: &MapPoint) -> Option<HighResTile> {
    let tile = state.tile_for(outlet)?;
    let opened = state
        .directions(&tile.flow_direction)
        .and_then(|d| state.values(&tile.flow_accumulation).map(|a| (d, a)));
    match opened {
        Ok((directions, accumulation)) => Some(HighResTile {
            id: tile.id.clone(),
            directions,
            accumulation,
        }),
        Err(e) => {
            warn!(tile = %tile.id, error = %e, "High resolution tile unavailable, using low resolution");
            None
        }
    }
}

/// Compute the area draining to `outlet`.
///
/// `tolerance` defaults to the configured snap tolerance; a negative or
/// non-finite value is an invalid parameter.
pub fn compute_upstream_area(
    state: &WatershedState,
    outlet: MapPoint,
    tolerance: Option<f64>,
) -> HydroResult<UpstreamAreaResult> {
    let settings = &state.config.upstream_area;
    let tolerance = tolerance.unwrap_or(settings.default_tolerance);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(HydroError::invalid_parameter(
            "tolerance",
            format!("must be finite and >= 0, got {}", tolerance),
        ));
    }

    let tile = open_tile(state, &outlet);
    let flow_area = state.flow_area();

    let snap = snap_pour_point(
        outlet,
        &SnapContext {
            flow_area: flow_area.as_deref(),
            flow_line: state.flow_line(),
            accumulation: tile.as_ref().map(|t| t.accumulation.as_ref()),
            tolerance,
        },
    );
    debug!(
        x = snap.point.x,
        y = snap.point.y,
        method = ?snap.method,
        "Outlet snapped"
    );

    // Large rivers are better resolved on the regional grid
    let low_res_accumulation = state.low_res_accumulation()?.value_at(&snap.point);
    let above_threshold = low_res_accumulation
        .map(|v| v >= settings.high_res_accumulation_threshold)
        .unwrap_or(false);

    let (resolution, tile_id, directions) = match tile {
        Some(tile) if !above_threshold => (Resolution::High, Some(tile.id), tile.directions),
        _ => (Resolution::Low, None, state.low_res_directions()?),
    };

    let pixel = directions.metadata.map_to_pixel(&snap.point);
    let mask = upstream_area(pixel, &directions);
    let polygon = extract_polygon(&mask, &directions.metadata);
    let cell_count = mask.count_true();
    let area = polygon.area();
    let perimeter = polygon.perimeter();

    info!(
        resolution = ?resolution,
        tile = tile_id.as_deref().unwrap_or("-"),
        cells = cell_count,
        rings = polygon.rings.len(),
        area,
        "Upstream area computed"
    );

    Ok(UpstreamAreaResult {
        polygon,
        outlet: snap.point,
        snap_method: snap.method,
        resolution,
        tile: tile_id,
        cell_count,
        area,
        perimeter,
        mask,
        metadata: directions.metadata,
    })
}
