//! Vectorization of boolean cell masks.
//!
//! Boundaries are traced on the lattice of cell corners: corner `(x, y)` is
//! the top-left corner of cell `(x, y)`, with `x` in `0..=width` and `y` in
//! `0..=height`, and `y` growing southwards like raster rows.
//!
//! A walk starts on the west edge of a filled cell whose western neighbour
//! is empty, heading south, and keeps the filled region on its left until it
//! comes back to where it started. Cells touching only at a corner are
//! treated as separate regions.
//!
//! In map coordinates (y up) the finished outer rings wind clockwise and
//! hole rings counter-clockwise.

use hydro_common::{Grid, MapPoint, PixelCoordinate, Polygon, RasterMetadata, Ring};

/// A cell-corner position on the boundary lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticePoint {
    pub x: i64,
    pub y: i64,
}

impl LatticePoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    South,
    East,
    North,
    West,
}

impl Heading {
    fn advance(self, p: LatticePoint) -> LatticePoint {
        match self {
            Heading::South => LatticePoint::new(p.x, p.y + 1),
            Heading::East => LatticePoint::new(p.x + 1, p.y),
            Heading::North => LatticePoint::new(p.x, p.y - 1),
            Heading::West => LatticePoint::new(p.x - 1, p.y),
        }
    }
}

struct BoundaryTracer<'a> {
    mask: &'a Grid<bool>,
    visited: Vec<bool>,
}

impl<'a> BoundaryTracer<'a> {
    fn new(mask: &'a Grid<bool>) -> Self {
        Self {
            mask,
            visited: vec![false; mask.len()],
        }
    }

    fn filled(&self, x: i64, y: i64) -> bool {
        self.mask.is_filled(x, y)
    }

    fn is_visited(&self, x: i64, y: i64) -> bool {
        self.mask
            .index_of(PixelCoordinate::new(x, y))
            .map(|i| self.visited[i])
            .unwrap_or(false)
    }

    fn mark(&mut self, x: i64, y: i64) {
        if let Some(i) = self.mask.index_of(PixelCoordinate::new(x, y)) {
            self.visited[i] = true;
        }
    }

    /// Marks the cell west of an edge being walked northwards. A cell with an
    /// empty western neighbour stays unmarked so it can still seed its ring.
    fn mark_if_west_closed(&mut self, x: i64, y: i64) {
        if x < 2 || self.filled(x - 2, y - 1) {
            self.mark(x - 1, y - 1);
        }
    }

    /// Pick the next heading at corner `(x, y)` from the two cells ahead of
    /// the walk, marking cells whose west edge is being followed.
    fn turn(&mut self, heading: Heading, x: i64, y: i64) -> Heading {
        match heading {
            Heading::South => match (self.filled(x, y), self.filled(x - 1, y)) {
                (true, true) => {
                    self.mark(x - 1, y);
                    Heading::West
                }
                (true, false) => {
                    self.mark(x, y);
                    Heading::South
                }
                _ => Heading::East,
            },
            Heading::East => match (self.filled(x, y - 1), self.filled(x, y)) {
                (true, true) => {
                    self.mark(x, y);
                    Heading::South
                }
                (true, false) => {
                    self.mark(x, y - 1);
                    Heading::East
                }
                _ => Heading::North,
            },
            Heading::North => match (self.filled(x - 1, y - 1), self.filled(x, y - 1)) {
                (true, true) => {
                    self.mark(x, y - 1);
                    Heading::East
                }
                (true, false) => {
                    self.mark_if_west_closed(x, y);
                    Heading::North
                }
                _ => Heading::West,
            },
            Heading::West => match (self.filled(x - 1, y), self.filled(x - 1, y - 1)) {
                (true, true) => {
                    self.mark_if_west_closed(x, y);
                    Heading::North
                }
                (true, false) => {
                    self.mark(x - 1, y);
                    Heading::West
                }
                _ => {
                    self.mark(x, y);
                    Heading::South
                }
            },
        }
    }

    /// Walk one closed boundary starting on the west edge of cell `start`.
    fn trace(&mut self, start: LatticePoint) -> Vec<LatticePoint> {
        let width = self.mask.width() as i64;
        let height = self.mask.height() as i64;
        let max_steps = 4 * (width + 1) * (height + 1) + 4;

        self.mark(start.x, start.y);
        let mut points = vec![start];
        let mut heading = Heading::South;
        let mut at = heading.advance(start);
        let mut steps = 0i64;

        loop {
            let next = self.turn(heading, at.x, at.y);
            // Back at the start and about to repeat the first edge
            if at == start && next == Heading::South {
                break;
            }
            steps += 1;
            if steps > max_steps {
                tracing::warn!(
                    x = start.x,
                    y = start.y,
                    steps,
                    "Boundary walk did not close, forcing ring closed"
                );
                break;
            }
            points.push(at);
            at = next.advance(at);
            heading = next;
        }

        if points.last() != Some(&start) {
            points.push(start);
        }
        points.reverse();
        compress_collinear(&points)
    }
}

/// Drop vertices that lie in the middle of a straight run, treating the
/// ring as cyclic. Input and output are closed.
fn compress_collinear(ring: &[LatticePoint]) -> Vec<LatticePoint> {
    let open = &ring[..ring.len().saturating_sub(1)];
    let n = open.len();
    if n < 3 {
        return ring.to_vec();
    }

    let mut kept: Vec<LatticePoint> = (0..n)
        .filter(|&i| {
            let prev = open[(i + n - 1) % n];
            let cur = open[i];
            let next = open[(i + 1) % n];
            let (ax, ay) = (cur.x - prev.x, cur.y - prev.y);
            let (bx, by) = (next.x - cur.x, next.y - cur.y);
            let straight = ax * by - ay * bx == 0 && ax * bx + ay * by > 0;
            !straight
        })
        .map(|i| open[i])
        .collect();
    if let Some(&first) = kept.first() {
        kept.push(first);
    }
    kept
}

/// Trace every boundary of `mask` as a closed ring of lattice corners.
///
/// Rings come out in seed order: columns left to right, and top to bottom
/// within a column. An all-false mask yields no rings.
pub fn extract_boundary(mask: &Grid<bool>) -> Vec<Vec<LatticePoint>> {
    let mut tracer = BoundaryTracer::new(mask);
    let mut rings = Vec::new();
    for x in 0..=mask.width() as i64 {
        for y in 0..=mask.height() as i64 {
            if !tracer.is_visited(x, y) && tracer.filled(x, y) && !tracer.filled(x - 1, y) {
                rings.push(tracer.trace(LatticePoint::new(x, y)));
            }
        }
    }

    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        rings = rings.len(),
        "Extracted mask boundary"
    );
    rings
}

/// Trace the boundary of `mask` and place it in map space.
pub fn extract_polygon(mask: &Grid<bool>, metadata: &RasterMetadata) -> Polygon {
    let rings = extract_boundary(mask)
        .into_iter()
        .map(|ring| {
            Ring::new(
                ring.iter()
                    .map(|p| metadata.corner_to_map(p.x, p.y))
                    .collect::<Vec<MapPoint>>(),
            )
        })
        .collect();
    Polygon::new(rings)
}
