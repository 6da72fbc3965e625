//! Two-tier flow path: high-resolution tile first, then the regional grid.

use flow_analysis::{trace_flow_path, StopReason};
use hydro_common::{HydroResult, MapPoint, Polyline};
use serde::Serialize;
use tracing::{debug, warn};

use crate::state::WatershedState;

/// How one tier of the trace ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    /// Layer id of the flow-direction grid that was traced.
    pub layer: String,
    pub stop_reason: StopReason,
    pub steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowPathResult {
    pub path: Polyline,
    /// Present when a high-resolution tile covered the seed.
    pub high_res: Option<TierSummary>,
    pub low_res: TierSummary,
    pub length: f64,
}

/// Trace the downhill path from `seed`.
///
/// When a high-resolution tile covers the seed it is traced for up to
/// `high_res_max_steps`; the regional grid then continues from where that
/// trace stopped for up to `low_res_max_steps`. The continuation's first
/// vertex is dropped when it repeats the last one.
pub fn compute_flow_path(state: &WatershedState, seed: MapPoint) -> HydroResult<FlowPathResult> {
    let limits = &state.config.flow_path;
    let mut path = Polyline::default();
    let mut next_seed = seed;
    let mut high_res = None;

    if let Some(tile) = state.tile_for(&seed) {
        match state.directions(&tile.flow_direction) {
            Ok(directions) => {
                let trace = trace_flow_path(seed, &directions, limits.high_res_max_steps)?;
                debug!(
                    tile = %tile.id,
                    steps = trace.steps,
                    reason = ?trace.stop_reason,
                    "High resolution trace finished"
                );
                next_seed = trace.final_point;
                path = trace.path;
                high_res = Some(TierSummary {
                    layer: tile.flow_direction.clone(),
                    stop_reason: trace.stop_reason,
                    steps: trace.steps,
                });
            }
            Err(e) => {
                warn!(tile = %tile.id, error = %e, "High resolution tile unavailable, tracing low resolution only");
            }
        }
    }

    let directions = state.low_res_directions()?;
    let trace = trace_flow_path(next_seed, &directions, limits.low_res_max_steps)?;
    debug!(
        steps = trace.steps,
        reason = ?trace.stop_reason,
        "Low resolution trace finished"
    );
    path.extend_continuing(&trace.path);

    let length = path.length();
    Ok(FlowPathResult {
        path,
        high_res,
        low_res: TierSummary {
            layer: state.config.layers.low_res_flow_direction.clone(),
            stop_reason: trace.stop_reason,
            steps: trace.steps,
        },
        length,
    })
}
