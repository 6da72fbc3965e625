//! Map-space geometry: points, polylines, rings and polygons.

use serde::{Deserialize, Serialize};

/// A point in the raster's map coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &MapPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Closest point to `self` on the segment `a`–`b`.
    pub fn project_onto_segment(&self, a: &MapPoint, b: &MapPoint) -> MapPoint {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return *a;
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        MapPoint::new(a.x + t * dx, a.y + t * dy)
    }
}

/// An open sequence of vertices, such as a traced flow path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<MapPoint>,
}

impl Polyline {
    pub fn new(points: Vec<MapPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&MapPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&MapPoint> {
        self.points.last()
    }

    /// Total length along the vertices.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Append a path that continues this one.
    ///
    /// The continuation normally starts where this path ended; that shared
    /// vertex is kept once.
    pub fn extend_continuing(&mut self, continuation: &Polyline) {
        let skip = match (self.points.last(), continuation.points.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.points
            .extend(continuation.points.iter().skip(skip).copied());
    }

    /// Nearest point on the polyline to `point`.
    ///
    /// Segments are examined in traversal order and a later segment only wins
    /// when it is strictly closer, so equidistant candidates resolve to the
    /// first segment. Returns `None` for an empty polyline.
    pub fn nearest_point(&self, point: &MapPoint) -> Option<MapPoint> {
        match self.points.as_slice() {
            [] => None,
            [only] => Some(*only),
            points => {
                let mut best: Option<(f64, MapPoint)> = None;
                for w in points.windows(2) {
                    let candidate = point.project_onto_segment(&w[0], &w[1]);
                    let distance = point.distance_to(&candidate);
                    match best {
                        Some((best_distance, _)) if distance >= best_distance => {}
                        _ => best = Some((distance, candidate)),
                    }
                }
                best.map(|(_, p)| p)
            }
        }
    }
}

/// A closed ring; the first and last points are equal.
///
/// Outer boundaries wind clockwise and holes counter-clockwise (map
/// coordinates, y up), so signed areas of a polygon's rings sum to its area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub points: Vec<MapPoint>,
}

impl Ring {
    /// Build a ring, appending the first point if the sequence is not closed.
    pub fn new(mut points: Vec<MapPoint>) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
            if first != *last {
                points.push(first);
            }
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum::<f64>()
            / 2.0
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Length of the ring boundary.
    pub fn perimeter(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Even-odd point-in-ring test. Points exactly on an edge may go
    /// either way.
    pub fn contains(&self, point: &MapPoint) -> bool {
        let mut inside = false;
        for w in self.points.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// A point strictly inside the ring, just beside the middle of its first
    /// edge. `None` for rings with fewer than two distinct points.
    pub fn interior_point(&self) -> Option<MapPoint> {
        let (a, b) = (self.points.first()?, self.points.get(1)?);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = dx.hypot(dy);
        if len == 0.0 {
            return None;
        }
        // Interior lies left of travel for counter-clockwise rings
        let side = if self.is_clockwise() { -1.0 } else { 1.0 };
        let offset = len * 1e-6 * side;
        Some(MapPoint::new(
            (a.x + b.x) / 2.0 - dy / len * offset,
            (a.y + b.y) / 2.0 + dx / len * offset,
        ))
    }
}

/// A set of rings: outer boundaries plus the holes inside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Enclosed area, with holes subtracted.
    pub fn area(&self) -> f64 {
        self.rings.iter().map(Ring::signed_area).sum::<f64>().abs()
    }

    /// Combined length of every ring.
    pub fn perimeter(&self) -> f64 {
        self.rings.iter().map(Ring::perimeter).sum()
    }
}
