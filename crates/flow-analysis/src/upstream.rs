//! Upstream area (watershed) solving.
//!
//! Breadth-first search from the outlet against the flow: a neighbour joins
//! the area when its D8 code points back at the cell being expanded.

use std::collections::VecDeque;

use hydro_common::d8::INFLOW_NEIGHBOURS;
use hydro_common::{Grid, PixelCoordinate, Raster};

/// Every cell draining into `outlet`, in breadth-first order.
///
/// The outlet comes first. An outlet outside the grid yields an empty list;
/// the outlet's own code is never inspected, so a no-data outlet still
/// counts as one cell.
pub fn upstream_cells(outlet: PixelCoordinate, directions: &Raster<i32>) -> Vec<PixelCoordinate> {
    let grid = &directions.grid;
    let Some(start) = grid.index_of(outlet) else {
        return Vec::new();
    };

    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    let mut cells = Vec::new();
    visited[start] = true;
    queue.push_back(outlet);

    while let Some(cell) = queue.pop_front() {
        cells.push(cell);
        for (dcol, drow, inflow_code) in INFLOW_NEIGHBOURS {
            let neighbour = cell.offset(dcol, drow);
            let Some(index) = grid.index_of(neighbour) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            if directions.cell(neighbour) == Some(inflow_code) {
                visited[index] = true;
                queue.push_back(neighbour);
            }
        }
    }

    cells
}

/// Mask of the cells draining into `outlet`, shaped like `directions`.
pub fn upstream_area(outlet: PixelCoordinate, directions: &Raster<i32>) -> Grid<bool> {
    let mut mask = directions.grid.map(|_| false);
    let cells = upstream_cells(outlet, directions);
    for &cell in &cells {
        mask.set(cell, true);
    }

    tracing::debug!(
        col = outlet.col,
        row = outlet.row,
        cells = cells.len(),
        "Solved upstream area"
    );
    mask
}
