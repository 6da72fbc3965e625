//! Tests for grid georeferencing, D8 decoding and geometry measures.

use hydro_common::d8::INFLOW_NEIGHBOURS;
use hydro_common::{
    CoordinateUnit, FlowDirection, Grid, MapPoint, PixelCoordinate, Polygon, Polyline, Raster,
    RasterMetadata, Ring,
};

fn metadata() -> RasterMetadata {
    RasterMetadata::new(MapPoint::new(1000.0, 2000.0), 30.0, 30.0, Some(255.0)).unwrap()
}

// ============================================================================
// RasterMetadata tests
// ============================================================================

#[test]
fn test_pixel_round_trip_over_grid() {
    let meta = metadata();
    for row in 0..5 {
        for col in 0..7 {
            let pixel = PixelCoordinate::new(col, row);
            assert_eq!(meta.map_to_pixel(&meta.pixel_to_map(pixel)), pixel);
        }
    }
}

#[test]
fn test_cell_edges_belong_to_the_cell_below_and_right() {
    let meta = metadata();
    // The top-left corner of a cell maps to that cell
    let corner = meta.corner_to_map(2, 3);
    assert_eq!(meta.map_to_pixel(&corner), PixelCoordinate::new(2, 3));
}

#[test]
fn test_non_finite_point_maps_off_grid() {
    let meta = metadata();
    let grid: Grid<u8> = Grid::filled(4, 4, 1).unwrap();
    let pixel = meta.map_to_pixel(&MapPoint::new(f64::NAN, 1990.0));
    assert!(!grid.contains(pixel));
}

#[test]
fn test_nan_no_data_sentinel() {
    let meta = RasterMetadata::new(MapPoint::new(0.0, 1.0), 1.0, 1.0, Some(f64::NAN)).unwrap();
    let raster = Raster::new(Grid::from_rows(vec![vec![f64::NAN, 2.0]]).unwrap(), meta);
    assert_eq!(raster.cell(PixelCoordinate::new(0, 0)), None);
    assert_eq!(raster.cell(PixelCoordinate::new(1, 0)), Some(2.0));
}

#[test]
fn test_extent_and_cell_area() {
    let meta = metadata();
    let extent = meta.extent(10, 4);
    assert_eq!(extent.min_x, 1000.0);
    assert_eq!(extent.max_x, 1300.0);
    assert_eq!(extent.min_y, 1880.0);
    assert_eq!(extent.max_y, 2000.0);
    assert_eq!(meta.cell_area(), 900.0);
}

// ============================================================================
// D8 tests
// ============================================================================

#[test]
fn test_every_direction_has_exactly_one_inflow_entry() {
    for dir in FlowDirection::ALL {
        let (dc, dr) = dir.opposite().offset();
        let matches: Vec<_> = INFLOW_NEIGHBOURS
            .iter()
            .filter(|(c, r, code)| (*c, *r) == (dc, dr) && *code == dir.code())
            .collect();
        assert_eq!(matches.len(), 1, "{:?}", dir);
    }
}

#[test]
fn test_map_step_matches_pixel_offset() {
    let meta = metadata();
    let start = PixelCoordinate::new(3, 3);
    for dir in FlowDirection::ALL {
        let centre = meta.pixel_to_map(start);
        let (dx, dy) = dir.map_step(meta.cell_width, meta.cell_height);
        let moved = meta.map_to_pixel(&MapPoint::new(centre.x + dx, centre.y + dy));
        let (dc, dr) = dir.offset();
        assert_eq!(moved, start.offset(dc, dr), "{:?}", dir);
    }
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn test_polygon_with_two_outer_rings() {
    let a = Ring::new(vec![
        MapPoint::new(0.0, 1.0),
        MapPoint::new(1.0, 1.0),
        MapPoint::new(1.0, 0.0),
        MapPoint::new(0.0, 0.0),
    ]);
    let b = Ring::new(vec![
        MapPoint::new(5.0, 2.0),
        MapPoint::new(7.0, 2.0),
        MapPoint::new(7.0, 0.0),
        MapPoint::new(5.0, 0.0),
    ]);
    let polygon = Polygon::new(vec![a, b]);
    assert!((polygon.area() - 5.0).abs() < 1e-12);
    assert!((polygon.perimeter() - 12.0).abs() < 1e-12);
}

#[test]
fn test_polyline_length_ignores_repeated_vertices() {
    let line = Polyline::new(vec![
        MapPoint::new(0.0, 0.0),
        MapPoint::new(0.0, 10.0),
        MapPoint::new(0.0, 10.0),
    ]);
    assert!((line.length() - 10.0).abs() < 1e-12);
}

#[test]
fn test_unit_labels() {
    assert_eq!(CoordinateUnit::meters().describe(), "1 m");
    assert_eq!(
        CoordinateUnit::Angular {
            radians_per_unit: 0.5
        }
        .describe(),
        "0.5 rad"
    );
    assert_eq!(CoordinateUnit::default().describe(), "");
}
