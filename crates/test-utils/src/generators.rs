//! Generators for synthetic flow-direction rasters and cell masks.
//!
//! Every raster built here uses [`NO_DATA`] as its sentinel and a top-left
//! origin at `(0, height * cell_size)`, so cell `(col, row)` covers
//! `[col, col + 1) x (height - row - 1, height - row]` when the cell size is 1.

use hydro_common::{Grid, MapPoint, Raster, RasterMetadata};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// No-data sentinel used by generated rasters.
pub const NO_DATA: f64 = -9999.0;

/// The eight D8 codes, east first and turning clockwise.
pub const D8_CODES: [i32; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Metadata for a raster of `height` rows whose bottom-left corner is the
/// map origin.
pub fn test_metadata(height: usize, cell_size: f64) -> RasterMetadata {
    RasterMetadata::new(
        MapPoint::new(0.0, height as f64 * cell_size),
        cell_size,
        cell_size,
        Some(NO_DATA),
    )
    .expect("valid test metadata")
}

/// Flow-direction raster from literal rows (top row first).
pub fn flow_raster(rows: Vec<Vec<i32>>, cell_size: f64) -> Raster<i32> {
    let grid = Grid::from_rows(rows).expect("rectangular rows");
    let meta = test_metadata(grid.height(), cell_size);
    Raster::new(grid, meta)
}

/// Value raster from literal rows (top row first).
pub fn value_raster(rows: Vec<Vec<f64>>, cell_size: f64) -> Raster<f64> {
    let grid = Grid::from_rows(rows).expect("rectangular rows");
    let meta = test_metadata(grid.height(), cell_size);
    Raster::new(grid, meta)
}

/// Every cell flows the same way.
pub fn uniform_flow_grid(width: usize, height: usize, code: i32) -> Raster<i32> {
    let grid = Grid::filled(width, height, code).expect("non-empty grid");
    Raster::new(grid, test_metadata(height, 1.0))
}

/// A valley draining to a sink at the bottom of the centre column.
///
/// Cells west of the centre column flow east, cells east of it flow west,
/// and the centre column flows south. Every cell drains to the outlet
/// returned alongside the raster.
pub fn funnel_flow_grid(width: usize, height: usize) -> (Raster<i32>, (usize, usize)) {
    let centre = width / 2;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let code = if col < centre {
                1
            } else if col > centre {
                16
            } else if row + 1 == height {
                0
            } else {
                4
            };
            data.push(code);
        }
    }
    let grid = Grid::new(width, height, data).expect("non-empty grid");
    (
        Raster::new(grid, test_metadata(height, 1.0)),
        (centre, height - 1),
    )
}

/// Random D8 codes with an occasional sink. Cycles are likely.
pub fn random_flow_grid(width: usize, height: usize, seed: u64) -> Raster<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height)
        .map(|_| match rng.gen_range(0..9) {
            8 => 0,
            i => D8_CODES[i],
        })
        .collect();
    let grid = Grid::new(width, height, data).expect("non-empty grid");
    Raster::new(grid, test_metadata(height, 1.0))
}

/// Flow accumulation computed by walking downstream from every cell.
///
/// Each cell counts itself plus everything upstream. Walks stop at sinks,
/// no-data, the grid edge, or after `width * height` steps on cycles.
pub fn accumulation_for(directions: &Raster<i32>) -> Raster<f64> {
    let grid = &directions.grid;
    let mut counts = vec![0.0; grid.len()];
    let limit = grid.len();
    for start in 0..grid.len() {
        let mut pixel = grid.pixel_of(start);
        for _ in 0..limit {
            let Some(index) = grid.index_of(pixel) else {
                break;
            };
            counts[index] += 1.0;
            let Some(code) = directions.cell(pixel) else {
                break;
            };
            let Some(dir) = hydro_common::FlowDirection::from_code(code) else {
                break;
            };
            let (dcol, drow) = dir.offset();
            pixel = pixel.offset(dcol, drow);
        }
    }
    let acc = Grid::new(grid.width(), grid.height(), counts).expect("same shape");
    Raster::new(acc, directions.metadata)
}

/// Mask from rows of text, `#` for filled cells and anything else empty.
pub fn mask_from_ascii(rows: &[&str]) -> Grid<bool> {
    Grid::from_rows(
        rows.iter()
            .map(|r| r.chars().map(|c| c == '#').collect())
            .collect(),
    )
    .expect("rectangular mask")
}

/// Mask with a filled rectangle over the given column and row ranges.
pub fn rect_mask(
    width: usize,
    height: usize,
    cols: std::ops::Range<usize>,
    rows: std::ops::Range<usize>,
) -> Grid<bool> {
    let data = (0..height)
        .flat_map(|row| {
            let rows = rows.clone();
            let cols = cols.clone();
            (0..width).map(move |col| rows.contains(&row) && cols.contains(&col))
        })
        .collect();
    Grid::new(width, height, data).expect("non-empty mask")
}

/// Seeded random mask where each cell is filled with probability `density`.
pub fn random_mask(width: usize, height: usize, density: f64, seed: u64) -> Grid<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height).map(|_| rng.gen_bool(density)).collect();
    Grid::new(width, height, data).expect("non-empty mask")
}
