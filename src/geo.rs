//! Geometry primitives: geographic points, great-circle distance, interpolation.
//!
//! Mirrors the role of the teacher's `spatial.rs`, but operates on raw
//! longitude/latitude points instead of H3 cells — this simulator runs over a
//! continuous plane, not a hex grid.

use serde::{Deserialize, Serialize};

/// Earth radius in meters, used by [`haversine`].
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic coordinate: (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Symmetric cache key: orders the pair so `(a, b)` and `(b, a)` hash the same.
    pub fn unordered_key(a: Point, b: Point) -> (PointKey, PointKey) {
        let ka = PointKey::from(a);
        let kb = PointKey::from(b);
        if ka <= kb {
            (ka, kb)
        } else {
            (kb, ka)
        }
    }
}

/// Bit-pattern key for a [`Point`], so it can be used in a `HashMap`/`BTreeMap`
/// key without relying on `f64: Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointKey(u64, u64);

impl From<Point> for PointKey {
    fn from(p: Point) -> Self {
        PointKey(p.x.to_bits(), p.y.to_bits())
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine(a: Point, b: Point) -> f64 {
    let (lat1, lon1) = (a.y.to_radians(), a.x.to_radians());
    let (lat2, lon2) = (b.y.to_radians(), b.x.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Cartesian distance on raw coordinates (legacy, non-realistic mode).
pub fn euclidean(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Linear interpolation between `a` and `b` at fraction `t` (clamped to `[0, 1]`).
pub fn interpolate(a: Point, b: Point, t: f64) -> Point {
    let t = t.clamp(0.0, 1.0);
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// An ordered sequence of points between a start and an end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An ordered sequence of points forming a closed roam route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    points: Vec<Point>,
}

impl Cycle {
    /// Panics if fewer than 2 points are given — a cycle needs at least two
    /// points to alternate between, matching `entities.py::Cycle`'s assertion.
    pub fn new(points: Vec<Point>) -> Self {
        assert!(
            points.len() > 1,
            "Cycle must have at least 2 points, found {}",
            points.len()
        );
        Self { points }
    }

    pub fn start_point(&self) -> Point {
        self.points[0]
    }

    /// Index of the point in this cycle nearest to `other` (ties broken by
    /// the first minimum found in iteration order).
    pub fn nearest_index(&self, other: Point) -> usize {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (haversine(other, *p), i))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, i)| i)
            .expect("cycle has at least one point")
    }

    /// The point following the nearest point to `other`, with wraparound.
    pub fn next_point(&self, other: Point) -> Point {
        let cur = self.nearest_index(other);
        let nxt = (cur + 1) % self.points.len();
        self.points[nxt]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_is_symmetric() {
        let a = Point::new(-122.41, 37.77);
        let b = Point::new(-122.43, 37.80);
        assert!((haversine(a, b) - haversine(b, a)).abs() < 1e-9);
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let a = Point::new(1.0, 1.0);
        assert!(haversine(a, a) < 1e-9);
    }

    #[test]
    fn interpolate_clamps_t() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(interpolate(a, b, -1.0), a);
        assert_eq!(interpolate(a, b, 2.0), b);
        assert_eq!(interpolate(a, b, 0.5), Point::new(5.0, 0.0));
    }

    #[test]
    fn cycle_wraps_around() {
        let c = Cycle::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(c.next_point(Point::new(0.0, 0.0)), Point::new(1.0, 0.0));
        assert_eq!(c.next_point(Point::new(1.0, 0.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn unordered_key_is_order_independent() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(Point::unordered_key(a, b), Point::unordered_key(b, a));
    }
}
