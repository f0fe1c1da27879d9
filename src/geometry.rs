//! 2D geometry primitives shared by the obstacle shapes and the sweep.
//!
//! Plain f64 math with no tolerance widening: degenerate inputs
//! (zero-length segments, parallel lines, coincident points) come back
//! as `None` rather than as a fault.

use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

// -- Points / vectors ----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Directions share the point representation.
pub type Vector = Point;

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[inline]
    pub fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Angle of the direction from `self` to `other`, in (-pi, pi].
    #[inline]
    pub fn angle_to(self, other: Point) -> f64 {
        let d = other - self;
        d.y.atan2(d.x)
    }

    /// The point `distance` away from `self` in direction `angle`.
    #[inline]
    pub fn offset(self, angle: f64, distance: f64) -> Point {
        Point::new(
            self.x + angle.cos() * distance,
            self.y + angle.sin() * distance,
        )
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    #[inline]
    fn add(self, v: Vector) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    #[inline]
    fn sub(self, other: Point) -> Vector {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

/// Normalized direction from `from` to `to`, or `None` when the two
/// points coincide.
pub fn unit_vector(from: Point, to: Point) -> Option<Vector> {
    let d = to - from;
    let len = d.length();
    if len.is_nan() || len == 0.0 {
        return None;
    }
    Some(d * (1.0 / len))
}

/// Wrap an angle into (-pi, pi].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

// -- Segments ------------------------------------------------------

/// A finite directed segment. The same type doubles as a fixed-length
/// ray (see [`LineSegment::ray`]); which reading applies is decided at
/// the call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// A ray of fixed `length` cast from `origin` toward `angle`.
    pub fn ray(origin: Point, angle: f64, length: f64) -> Self {
        Self::new(origin, origin.offset(angle, length))
    }

    #[inline]
    pub fn delta(&self) -> Vector {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    pub fn is_degenerate(&self) -> bool {
        let d = self.delta();
        d.x == 0.0 && d.y == 0.0
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    pub fn intersect(&self, other: &LineSegment) -> Option<Point> {
        intersect(*self, *other)
    }

    pub fn bounding_rect(&self) -> Rect {
        bounding_rect(self)
    }

    pub fn pseudo_angle(&self) -> f64 {
        pseudo_angle(self)
    }

    fn sort_key(&self) -> [f64; 4] {
        [self.start.x, self.start.y, self.end.x, self.end.y]
    }
}

fn canonical_order(a: &LineSegment, b: &LineSegment) -> Ordering {
    a.sort_key()
        .iter()
        .zip(b.sort_key().iter())
        .map(|(p, q)| p.total_cmp(q))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Intersection point of two finite segments.
///
/// Both parameters must land in [0, 1] exactly, so segments that only
/// touch at an endpoint still intersect. Returns `None` for zero-length
/// segments and for parallel (including collinear) pairs. The pair is
/// evaluated in a canonical order so argument order never changes the
/// result bits.
pub fn intersect(a: LineSegment, b: LineSegment) -> Option<Point> {
    let (a, b) = match canonical_order(&a, &b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }
    let r = a.delta();
    let s = b.delta();
    let denom = r.cross(s);
    if denom == 0.0 {
        return None;
    }
    let qp = b.start - a.start;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a.start + r * t)
    } else {
        None
    }
}

/// Axis-aligned bounds of a segment's endpoints.
pub fn bounding_rect(seg: &LineSegment) -> Rect {
    Rect::from_points(seg.start, seg.end)
}

/// Trig-free ordering key for the direction of `seg`.
///
/// Maps (-pi, pi] onto (-2, 2] and is strictly increasing wherever
/// `atan2` is, so sorting by it is sorting by angle. A zero-length
/// segment maps to 0.
pub fn pseudo_angle(seg: &LineSegment) -> f64 {
    let d = seg.delta();
    let norm = d.x.abs() + d.y.abs();
    if norm == 0.0 {
        return 0.0;
    }
    let p = d.y / norm;
    if d.x >= 0.0 {
        p
    } else if d.y >= 0.0 {
        2.0 - p
    } else {
        -2.0 - p
    }
}

// -- Rectangles ----------------------------------------------------

/// Axis-aligned rectangle anchored at its minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(alias = "w")]
    pub width: f64,
    #[serde(alias = "h")]
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, a.x.max(b.x) - x, a.y.max(b.y) - y)
    }

    // Negative extents are tolerated by reading the edges as min/max.

    pub fn left(&self) -> f64 {
        self.x.min(self.x + self.width)
    }

    pub fn right(&self) -> f64 {
        self.x.max(self.x + self.width)
    }

    pub fn top(&self) -> f64 {
        self.y.min(self.y + self.height)
    }

    pub fn bottom(&self) -> f64 {
        self.y.max(self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    /// Corners in winding order starting at (left, top).
    pub fn corners(&self) -> [Point; 4] {
        let (l, r, t, b) = (self.left(), self.right(), self.top(), self.bottom());
        [
            Point::new(l, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
        ]
    }

    pub fn edges(&self) -> [LineSegment; 4] {
        let c = self.corners();
        std::array::from_fn(|i| LineSegment::new(c[i], c[(i + 1) % 4]))
    }

    /// Inclusive of the boundary.
    pub fn contains(&self, p: Point) -> bool {
        self.left() <= p.x && p.x <= self.right() && self.top() <= p.y && p.y <= self.bottom()
    }

    /// Distance from `p` to the nearest point of the rectangle; zero
    /// inside.
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.left() - p.x).max(p.x - self.right()).max(0.0);
        let dy = (self.top() - p.y).max(p.y - self.bottom()).max(0.0);
        dx.hypot(dy)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.left().min(other.left());
        let y = self.top().min(other.top());
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

// -- Polygons ------------------------------------------------------

/// Polygon area using the shoelace formula.
/// Returns positive area regardless of winding order.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    area.abs() / 2.0
}

/// Even-odd point-in-polygon test by horizontal ray crossing.
///
/// Points exactly on an edge or vertex get whatever the crossing scan
/// yields. For an axis-aligned square the min-x and min-y edges read as
/// inside and the max-x and max-y edges as outside.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let cross_x = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance_to(b) < 1e-9
    }

    #[test]
    fn crossing_segments_intersect() {
        let p = intersect(seg(0.0, 0.0, 10.0, 10.0), seg(0.0, 10.0, 10.0, 0.0)).unwrap();
        assert!(close(p, Point::new(5.0, 5.0)));
    }

    #[test]
    fn intersection_is_symmetric() {
        let segs = [
            seg(0.0, 0.0, 10.0, 3.0),
            seg(1.0, -4.0, 3.5, 8.0),
            seg(-2.0, 1.0, 12.0, 1.5),
            seg(7.3, -1.1, 2.2, 9.9),
            seg(0.1, 0.2, 0.3, -7.0),
            seg(5.0, 5.0, -5.0, -1.0),
        ];
        for a in &segs {
            for b in &segs {
                let ab = intersect(*a, *b);
                let ba = intersect(*b, *a);
                assert_eq!(ab, ba, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(intersect(seg(0.0, 0.0, 1.0, 0.0), seg(2.0, -1.0, 2.0, 1.0)).is_none());
        assert!(intersect(seg(0.0, 0.0, 1.0, 1.0), seg(5.0, 0.0, 6.0, -3.0)).is_none());
    }

    #[test]
    fn parallel_and_collinear_are_none() {
        assert!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(0.0, 1.0, 10.0, 1.0)).is_none());
        // Overlapping collinear segments have a zero denominator too.
        assert!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(5.0, 0.0, 15.0, 0.0)).is_none());
    }

    #[test]
    fn zero_length_is_none() {
        assert!(intersect(seg(1.0, 1.0, 1.0, 1.0), seg(0.0, 0.0, 2.0, 2.0)).is_none());
        assert!(intersect(seg(0.0, 2.0, 2.0, 0.0), seg(1.0, 1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn touching_endpoint_counts() {
        let p = intersect(seg(0.0, 0.0, 5.0, 0.0), seg(5.0, -1.0, 5.0, 1.0)).unwrap();
        assert!(close(p, Point::new(5.0, 0.0)));
        let q = intersect(seg(0.0, 0.0, 5.0, 5.0), seg(5.0, 5.0, 9.0, 1.0)).unwrap();
        assert!(close(q, Point::new(5.0, 5.0)));
    }

    #[test]
    fn pseudo_angle_is_monotonic() {
        let steps = 720;
        let mut prev = f64::NEG_INFINITY;
        for k in 0..steps {
            let theta = -PI + (k as f64 + 0.5) * TAU / steps as f64;
            let p = LineSegment::ray(Point::new(3.0, -2.0), theta, 7.0).pseudo_angle();
            assert!(p > prev, "not increasing at theta={theta}");
            assert!((-2.0..=2.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn pseudo_angle_wraps_at_pi() {
        let just_below_pi = pseudo_angle(&seg(0.0, 0.0, -1.0, 1e-9));
        let at_pi = pseudo_angle(&seg(0.0, 0.0, -1.0, 0.0));
        let just_above_neg_pi = pseudo_angle(&seg(0.0, 0.0, -1.0, -1e-9));
        assert!(just_below_pi < at_pi);
        assert_eq!(at_pi, 2.0);
        assert!(just_above_neg_pi < -1.99);
        assert_eq!(pseudo_angle(&seg(0.0, 0.0, 1.0, 0.0)), 0.0);
        assert_eq!(pseudo_angle(&seg(0.0, 0.0, 0.0, 1.0)), 1.0);
        assert_eq!(pseudo_angle(&seg(0.0, 0.0, 0.0, -1.0)), -1.0);
    }

    #[test]
    fn pseudo_angle_of_point_is_zero() {
        assert_eq!(pseudo_angle(&seg(4.0, 4.0, 4.0, 4.0)), 0.0);
    }

    #[test]
    fn unit_vector_of_coincident_points() {
        let p = Point::new(2.0, 3.0);
        assert!(unit_vector(p, p).is_none());
        let u = unit_vector(p, Point::new(5.0, 7.0)).unwrap();
        assert!((u.length() - 1.0).abs() < 1e-12);
        assert!(close(u, Point::new(0.6, 0.8)));
    }

    #[test]
    fn normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn bounding_rect_of_segment() {
        let r = bounding_rect(&seg(4.0, -1.0, -2.0, 3.0));
        assert_eq!(r, Rect::new(-2.0, -1.0, 6.0, 4.0));
    }

    #[test]
    fn rect_accepts_negative_extent() {
        let r = Rect::new(10.0, 10.0, -4.0, -2.0);
        assert_eq!(r.left(), 6.0);
        assert_eq!(r.bottom(), 10.0);
        assert!(r.contains(Point::new(8.0, 9.0)));
    }

    #[test]
    fn rect_distance() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(r.distance_to(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(r.distance_to(Point::new(15.0, 5.0)), 5.0);
        assert!((r.distance_to(Point::new(13.0, -4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn polygon_area_unit_square() {
        let sq = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((polygon_area(&sq) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn point_inside_polygon() {
        let sq = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(1.0, 1.0), &sq[..2]));
    }
}
