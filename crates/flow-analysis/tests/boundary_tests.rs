//! Tests for mask boundary extraction.

use flow_analysis::boundary::{extract_boundary, extract_polygon, LatticePoint};
use hydro_common::{Grid, MapPoint, RasterMetadata};
use test_utils::{assert_approx_eq, mask_from_ascii, random_mask, rect_mask};

fn meta(origin_x: f64, origin_y: f64, dx: f64, dy: f64) -> RasterMetadata {
    RasterMetadata::new(MapPoint::new(origin_x, origin_y), dx, dy, None).unwrap()
}

/// Number of cell edges separating a filled cell from an empty one (or
/// from the outside of the grid).
fn boundary_edge_count(mask: &Grid<bool>) -> usize {
    let mut edges = 0;
    for row in 0..mask.height() as i64 {
        for col in 0..mask.width() as i64 {
            if !mask.is_filled(col, row) {
                continue;
            }
            for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                if !mask.is_filled(col + dc, row + dr) {
                    edges += 1;
                }
            }
        }
    }
    edges
}

fn mask_from_bits(width: usize, height: usize, bits: u32) -> Grid<bool> {
    let data = (0..width * height).map(|i| bits & (1 << i) != 0).collect();
    Grid::new(width, height, data).unwrap()
}

// ============================================================================
// Hand-built masks
// ============================================================================

#[test]
fn test_two_by_two_matches_reference_ring() {
    let mask = mask_from_ascii(&["##", "##"]);
    let polygon = extract_polygon(&mask, &meta(0.0, 2.0, 1.0, 1.0));

    assert_eq!(polygon.rings.len(), 1);
    assert_eq!(
        polygon.rings[0].points,
        vec![
            MapPoint::new(0.0, 2.0),
            MapPoint::new(2.0, 2.0),
            MapPoint::new(2.0, 0.0),
            MapPoint::new(0.0, 0.0),
            MapPoint::new(0.0, 2.0),
        ]
    );
    assert_approx_eq!(polygon.area(), 4.0, 1e-12);
    assert!(polygon.rings[0].is_clockwise());
}

#[test]
fn test_all_false_mask_has_no_rings() {
    let mask = Grid::filled(5, 4, false).unwrap();
    assert!(extract_boundary(&mask).is_empty());
    assert!(extract_polygon(&mask, &meta(0.0, 4.0, 1.0, 1.0)).is_empty());
}

#[test]
fn test_all_true_mask_is_outer_rectangle() {
    let mask = Grid::filled(6, 3, true).unwrap();
    let rings = extract_boundary(&mask);
    assert_eq!(
        rings,
        vec![vec![
            LatticePoint::new(0, 0),
            LatticePoint::new(6, 0),
            LatticePoint::new(6, 3),
            LatticePoint::new(0, 3),
            LatticePoint::new(0, 0),
        ]]
    );
}

#[test]
fn test_hole_winds_opposite_to_outer_ring() {
    let mask = mask_from_ascii(&["#####", "#...#", "#...#", "#####"]);
    let polygon = extract_polygon(&mask, &meta(0.0, 4.0, 1.0, 1.0));

    assert_eq!(polygon.rings.len(), 2);
    assert!(polygon.rings[0].is_clockwise());
    assert!(!polygon.rings[1].is_clockwise());
    assert_approx_eq!(polygon.area(), 14.0, 1e-12);
    assert_approx_eq!(polygon.perimeter(), 18.0 + 10.0, 1e-12);
}

#[test]
fn test_separate_components_each_get_a_ring() {
    let mask = mask_from_ascii(&["##..#", "##..#", "....#"]);
    let rings = extract_boundary(&mask);
    assert_eq!(rings.len(), 2);
    assert_eq!(rings[0][0], LatticePoint::new(0, 0));
    assert_eq!(rings[1][0], LatticePoint::new(4, 0));
}

#[test]
fn test_pinched_shape_keeps_full_area() {
    // Two blocks touching at a single corner
    let mask = mask_from_ascii(&["##..", "##..", "..##", "..##"]);
    let polygon = extract_polygon(&mask, &meta(0.0, 4.0, 1.0, 1.0));
    assert_approx_eq!(polygon.area(), 8.0, 1e-12);
    assert_approx_eq!(polygon.perimeter(), 16.0, 1e-12);

    // A ring that touches itself diagonally around the empty centre cell
    let mask = mask_from_ascii(&["###", "#.#", "##.", "..."]);
    let polygon = extract_polygon(&mask, &meta(0.0, 4.0, 1.0, 1.0));
    assert_approx_eq!(polygon.area(), 7.0, 1e-12);
    assert_approx_eq!(polygon.perimeter(), boundary_edge_count(&mask) as f64, 1e-12);
}

#[test]
fn test_map_conversion_uses_cell_size_and_origin() {
    let mask = rect_mask(4, 4, 1..3, 1..2);
    let polygon = extract_polygon(&mask, &meta(500.0, 1000.0, 30.0, 10.0));

    assert_eq!(polygon.rings.len(), 1);
    let ring = &polygon.rings[0];
    assert_eq!(ring.points[0], MapPoint::new(530.0, 990.0));
    assert_approx_eq!(polygon.area(), 2.0 * 30.0 * 10.0, 1e-9);
}

// ============================================================================
// Exhaustive small masks
// ============================================================================

#[test]
fn test_every_3x3_mask_round_trips_area_and_edges() {
    let m = meta(0.0, 3.0, 1.0, 1.0);
    for bits in 0..(1u32 << 9) {
        let mask = mask_from_bits(3, 3, bits);
        let polygon = extract_polygon(&mask, &m);

        assert_approx_eq!(polygon.area(), mask.count_true() as f64, 1e-9);
        assert_approx_eq!(polygon.perimeter(), boundary_edge_count(&mask) as f64, 1e-9);
        for ring in &polygon.rings {
            assert!(ring.len() >= 5, "mask {:09b} produced a degenerate ring", bits);
            assert_eq!(ring.points.first(), ring.points.last());
        }
    }
}

#[test]
fn test_every_4x4_mask_round_trips_area_and_edges() {
    let m = meta(0.0, 4.0, 1.0, 1.0);
    for bits in 0..(1u32 << 16) {
        let mask = mask_from_bits(4, 4, bits);
        let polygon = extract_polygon(&mask, &m);
        assert_approx_eq!(polygon.area(), mask.count_true() as f64, 1e-9);
        assert_approx_eq!(polygon.perimeter(), boundary_edge_count(&mask) as f64, 1e-9);
    }
}

#[test]
fn test_random_masks_round_trip_area() {
    let m = meta(-50.0, 50.0, 2.0, 3.0);
    for seed in 0..20 {
        let mask = random_mask(24, 17, 0.45, seed);
        let polygon = extract_polygon(&mask, &m);
        assert_approx_eq!(polygon.area(), mask.count_true() as f64 * 6.0, 1e-6);
    }
}
