//! Downhill flow path tracing.
//!
//! Starting from a seed point the tracer repeatedly reads the D8 code under
//! the current point and moves one cell in that direction. Only the points
//! where the direction changes are recorded, so straight runs collapse into
//! a single segment.

use hydro_common::{FlowDirection, HydroError, HydroResult, MapPoint, Polyline, Raster};
use serde::{Deserialize, Serialize};

/// Why a trace stopped. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The path walked off the edge of the grid.
    LeftGrid,
    /// The path reached a no-data cell.
    NoData,
    /// The current cell has no outflow (code 0 or unrecognized).
    Sink,
    /// The step budget ran out before any other stop.
    StepLimit,
}

/// Result of a single trace.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTrace {
    pub path: Polyline,
    /// Where the trace ended. A continuation trace on another grid starts here.
    pub final_point: MapPoint,
    pub stop_reason: StopReason,
    /// Number of cells visited.
    pub steps: usize,
}

/// Trace the flow path from `seed` over a D8 flow-direction raster.
///
/// The path holds the seed (when it lies on a valid cell), every point
/// where the flow direction changes, and the final point. A seed that is
/// off-grid or on no-data yields a single-point path equal to the seed.
///
/// The only error is a raster with a non-positive cell size.
pub fn trace_flow_path(
    seed: MapPoint,
    directions: &Raster<i32>,
    max_steps: usize,
) -> HydroResult<FlowTrace> {
    let meta = &directions.metadata;
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(meta.cell_width) || !positive(meta.cell_height) {
        return Err(HydroError::InvalidCellSize {
            dx: meta.cell_width,
            dy: meta.cell_height,
        });
    }

    let mut points = Vec::new();
    let mut current = seed;
    let mut last_step: Option<(f64, f64)> = None;
    let mut steps = 0usize;

    let stop_reason = loop {
        steps += 1;
        let pixel = meta.map_to_pixel(&current);
        if !directions.grid.contains(pixel) {
            break StopReason::LeftGrid;
        }
        let Some(code) = directions.cell(pixel) else {
            break StopReason::NoData;
        };

        let step = FlowDirection::from_code(code)
            .map(|dir| dir.map_step(meta.cell_width, meta.cell_height))
            .unwrap_or((0.0, 0.0));
        if last_step != Some(step) {
            points.push(current);
            last_step = Some(step);
        }

        if step == (0.0, 0.0) {
            break StopReason::Sink;
        }
        if steps > max_steps {
            break StopReason::StepLimit;
        }
        current = MapPoint::new(current.x + step.0, current.y + step.1);
    };
    points.push(current);

    tracing::debug!(
        steps,
        vertices = points.len(),
        reason = ?stop_reason,
        "Traced flow path"
    );

    Ok(FlowTrace {
        path: Polyline::new(points),
        final_point: current,
        stop_reason,
        steps,
    })
}
