//! Pour point snapping.
//!
//! A user-supplied outlet rarely sits exactly on the drainage network. Before
//! an upstream area is computed the point is moved either onto a mapped flow
//! line (when it falls inside the flow-area mask) or onto the cell with the
//! largest flow accumulation within a search tolerance.

use hydro_common::{MapPoint, PixelCoordinate, Polyline, Raster};
use serde::{Deserialize, Serialize};

/// Inputs available for snapping. Every layer is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapContext<'a> {
    /// Mask of areas drained by a mapped flow line; any valid value counts.
    pub flow_area: Option<&'a Raster<f64>>,
    /// The mapped flow line.
    pub flow_line: Option<&'a Polyline>,
    pub accumulation: Option<&'a Raster<f64>>,
    /// Half-width of the accumulation search window, in map units.
    pub tolerance: f64,
}

/// Which rule moved the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMethod {
    FlowLine,
    MaxAccumulation,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOutcome {
    pub point: MapPoint,
    pub method: SnapMethod,
}

impl SnapOutcome {
    fn unchanged(point: MapPoint) -> Self {
        Self {
            point,
            method: SnapMethod::Unchanged,
        }
    }
}

/// Snap a candidate outlet onto the drainage network.
pub fn snap_pour_point(point: MapPoint, ctx: &SnapContext<'_>) -> SnapOutcome {
    if let Some(snapped) = snap_to_flow_line(&point, ctx) {
        tracing::debug!(x = snapped.x, y = snapped.y, "Snapped to flow line");
        return SnapOutcome {
            point: snapped,
            method: SnapMethod::FlowLine,
        };
    }

    let accumulation = match ctx.accumulation {
        Some(raster) if ctx.tolerance > 0.0 => raster,
        _ => return SnapOutcome::unchanged(point),
    };

    match max_accumulation_cell(&point, accumulation, ctx.tolerance) {
        Some(pixel) => {
            let snapped = accumulation.metadata.pixel_to_map(pixel);
            tracing::debug!(
                col = pixel.col,
                row = pixel.row,
                "Snapped to maximum flow accumulation"
            );
            SnapOutcome {
                point: snapped,
                method: SnapMethod::MaxAccumulation,
            }
        }
        None => SnapOutcome::unchanged(point),
    }
}

fn snap_to_flow_line(point: &MapPoint, ctx: &SnapContext<'_>) -> Option<MapPoint> {
    let flow_area = ctx.flow_area?;
    flow_area.value_at(point)?;
    ctx.flow_line?.nearest_point(point)
}

/// Cell with the strictly largest accumulation inside the tolerance window.
///
/// The window runs from the pixel under `(x - tol, y + tol)` to the pixel
/// under `(x + tol, y - tol)`, clamped to the grid. A window that collapses
/// to a single pixel, or contains no valid cell, yields `None`. Ties keep
/// the first cell in row-major order.
fn max_accumulation_cell(
    point: &MapPoint,
    accumulation: &Raster<f64>,
    tolerance: f64,
) -> Option<PixelCoordinate> {
    let meta = &accumulation.metadata;
    let min = meta.map_to_pixel(&MapPoint::new(point.x - tolerance, point.y + tolerance));
    let max = meta.map_to_pixel(&MapPoint::new(point.x + tolerance, point.y - tolerance));
    if min == max {
        return None;
    }

    let last_col = accumulation.width() as i64 - 1;
    let last_row = accumulation.height() as i64 - 1;
    let (col0, col1) = (min.col.max(0), max.col.min(last_col));
    let (row0, row1) = (min.row.max(0), max.row.min(last_row));

    let mut best: Option<(f64, PixelCoordinate)> = None;
    for row in row0..=row1 {
        for col in col0..=col1 {
            let pixel = PixelCoordinate::new(col, row);
            let Some(value) = accumulation.cell(pixel) else {
                continue;
            };
            if value.is_nan() {
                continue;
            }
            match best {
                Some((best_value, _)) if value <= best_value => {}
                _ => best = Some((value, pixel)),
            }
        }
    }
    best.map(|(_, pixel)| pixel)
}
