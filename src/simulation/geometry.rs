//! Geometry kernel: points, segments, and the intersection tests used for
//! sensing and collision detection.
//!
//! Coordinates follow screen conventions: y grows downward, and a heading of
//! zero points "up" (towards decreasing y).

use geo::algorithm::Distance;
use geo::Euclidean;
use serde::{Deserialize, Serialize};

/// Largest `|sin|` of the angle between two segments that still counts as
/// parallel. Relative to the segment lengths, so it holds at any scale.
const PARALLEL_EPSILON: f64 = f64::EPSILON;

/// A point in the plane.
///
/// `offset` is only populated on intersection results and holds the
/// parametric position of the hit along the query segment, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
    /// Optional identifier carried over from the world graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Parametric position along the query segment for intersection results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl Point {
    /// Creates a plain point without id or offset.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            id: None,
            offset: None,
        }
    }

    /// Returns a copy of this point tagged with an intersection offset.
    pub fn with_offset(self, offset: f64) -> Self {
        Self {
            offset: Some(offset),
            ..self
        }
    }
}

/// A line segment between two points.
///
/// Segments are undirected for every geometric test. The `one_way` flag only
/// records traffic direction for the road graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point.
    pub p1: Point,
    /// End point.
    pub p2: Point,
    /// Whether traffic may only flow from `p1` to `p2`.
    #[serde(default, rename = "oneWay")]
    pub one_way: bool,
}

impl Segment {
    /// Creates a two-way segment.
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            one_way: false,
        }
    }

    /// Creates a one-way segment running from `p1` to `p2`.
    pub fn one_way(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            one_way: true,
        }
    }

    /// Views the segment as a degenerate two-point polygon.
    pub fn as_polygon(&self) -> [Point; 2] {
        [self.p1, self.p2]
    }

    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        distance(&self.p1, &self.p2)
    }
}

/// A closed polygon; the last point connects back to the first.
pub type Polygon = Vec<Point>;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Angle of the vector `p` measured from the positive x axis.
#[inline]
pub fn angle(p: &Point) -> f64 {
    p.y.atan2(p.x)
}

/// Euclidean distance between two points.
pub fn distance(a: &Point, b: &Point) -> f64 {
    Euclidean.distance(geo::Point::new(a.x, a.y), geo::Point::new(b.x, b.y))
}

/// Converts a start marking's direction vector into a car heading, using
/// the world editor's convention `-angle(direction) + π/2`.
pub fn heading_from_direction(direction: &Point) -> f64 {
    -angle(direction) + std::f64::consts::FRAC_PI_2
}

/// Intersects segment `a1-a2` with segment `b1-b2`.
///
/// Returns the crossing point with `offset` set to its parametric position
/// along `a1-a2`, or `None` when the finite segments do not meet. Parallel
/// segments always return `None`, including collinear overlapping ones.
pub fn get_intersection(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<Point> {
    let t_top = (b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x);
    let u_top = (b1.y - a1.y) * (a1.x - a2.x) - (b1.x - a1.x) * (a1.y - a2.y);
    let bottom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);

    // `bottom` is the cross product of the two directions.
    let scale = (a2.x - a1.x).hypot(a2.y - a1.y) * (b2.x - b1.x).hypot(b2.y - b1.y);
    if bottom.abs() <= PARALLEL_EPSILON * scale {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(lerp(a1.x, a2.x, t), lerp(a1.y, a2.y, t)).with_offset(t))
    } else {
        None
    }
}

/// Iterates over the edges of a closed polygon, wrapping last to first.
pub fn edges(poly: &[Point]) -> impl Iterator<Item = (&Point, &Point)> {
    (0..poly.len()).map(move |i| (&poly[i], &poly[(i + 1) % poly.len()]))
}

/// Returns `true` when any edge of `a` crosses any edge of `b`.
///
/// A polygon entirely inside another without touching its edges does not
/// count as an intersection.
pub fn polys_intersect(a: &[Point], b: &[Point]) -> bool {
    edges(a).any(|(a1, a2)| edges(b).any(|(b1, b2)| get_intersection(a1, a2, b1, b2).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_wrap_around() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let last = edges(&square).last().unwrap();
        assert_eq!(*last.0, square[3]);
        assert_eq!(*last.1, square[0]);
        assert_eq!(edges(&square).count(), 4);
    }

    #[test]
    fn empty_polygon_has_no_edges() {
        assert_eq!(edges(&[]).count(), 0);
        assert!(!polys_intersect(&[], &[Point::new(0.0, 0.0)]));
    }
}
