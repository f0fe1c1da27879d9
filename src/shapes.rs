//! Opaque obstacle shapes.
//!
//! Each variant answers the three questions the sweep asks of an
//! obstacle: does it contain a point, which of its corners can cause a
//! visibility discontinuity from a viewpoint, and where does a ray
//! first cross its boundary.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::geometry::{point_in_polygon, LineSegment, Point, Rect};

/// Ray crossings closer than this to an edge endpoint are ignored, so a
/// ray aimed at a corner slides past it instead of stopping there.
pub const EDGE_EPSILON: f64 = 1e-4;

// -- Variants ------------------------------------------------------

/// Closed polygon; the last corner connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub corners: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Polygon(Polygon),
    Circle(Circle),
    Box(Rect),
}

impl Shape {
    pub fn polygon(corners: Vec<Point>) -> Self {
        Shape::Polygon(Polygon::new(corners))
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Shape::Circle(Circle { center, radius })
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Box(Rect::new(x, y, width, height))
    }

    /// True if `p` lies within the shape. Box and Circle count their
    /// boundary as inside; Polygon follows the even-odd rule.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Shape::Polygon(poly) => poly.contains(p),
            Shape::Circle(circle) => circle.contains(p),
            Shape::Box(rect) => rect.contains(p),
        }
    }

    /// Corners that can produce a visibility discontinuity as seen from
    /// `viewpoint`. Empty when the viewpoint is inside the shape.
    pub fn corners_visible_from(&self, viewpoint: Point) -> Vec<Point> {
        match self {
            Shape::Polygon(poly) => poly.corners_visible_from(viewpoint),
            Shape::Circle(circle) => circle.tangent_points(viewpoint),
            Shape::Box(rect) => box_silhouette(rect, viewpoint),
        }
    }

    /// Nearest point, measured from `ray.start`, where the ray crosses
    /// the shape's boundary.
    pub fn intersect(&self, ray: &LineSegment) -> Option<Point> {
        match self {
            Shape::Polygon(poly) => poly.intersect(ray),
            Shape::Circle(circle) => circle.intersect(ray),
            Shape::Box(rect) => nearest_edge_hit(ray, rect.edges()),
        }
    }

    /// Axis-aligned bounds, or `None` for a polygon without corners.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Shape::Polygon(poly) => {
                let (first, rest) = poly.corners.split_first()?;
                let seed = Rect::from_points(*first, *first);
                Some(
                    rest.iter()
                        .fold(seed, |acc, &c| acc.union(&Rect::from_points(c, c))),
                )
            }
            Shape::Circle(c) => {
                let r = c.radius.abs();
                Some(Rect::new(c.center.x - r, c.center.y - r, 2.0 * r, 2.0 * r))
            }
            Shape::Box(rect) => Some(*rect),
        }
    }

    /// Move the whole shape by (dx, dy).
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = Point::new(dx, dy);
        match self {
            Shape::Polygon(poly) => {
                for c in &mut poly.corners {
                    *c = *c + shift;
                }
            }
            Shape::Circle(circle) => circle.center = circle.center + shift,
            Shape::Box(rect) => {
                rect.x += dx;
                rect.y += dy;
            }
        }
    }
}

// -- Polygon -------------------------------------------------------

impl Polygon {
    pub fn new(corners: Vec<Point>) -> Self {
        Self { corners }
    }

    /// Edge `i` runs from corner `i` to corner `i + 1`, wrapping.
    pub fn edges(&self) -> impl Iterator<Item = LineSegment> + '_ {
        let n = self.corners.len();
        (0..n).map(move |i| LineSegment::new(self.corners[i], self.corners[(i + 1) % n]))
    }

    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, &self.corners)
    }

    /// A corner qualifies when the sight line from `viewpoint` crosses no
    /// edge other than the two that meet at the corner.
    pub fn corners_visible_from(&self, viewpoint: Point) -> Vec<Point> {
        let n = self.corners.len();
        if n < 2 || self.contains(viewpoint) {
            return Vec::new();
        }
        self.corners
            .iter()
            .enumerate()
            .filter(|&(i, &corner)| {
                let sight = LineSegment::new(viewpoint, corner);
                let prev = (i + n - 1) % n;
                !self
                    .edges()
                    .enumerate()
                    .any(|(j, edge)| j != i && j != prev && sight.intersect(&edge).is_some())
            })
            .map(|(_, &corner)| corner)
            .collect()
    }

    pub fn intersect(&self, ray: &LineSegment) -> Option<Point> {
        nearest_edge_hit(ray, self.edges())
    }
}

/// Nearest crossing of `ray` with any of `edges`, skipping crossings
/// that land on an edge endpoint.
fn nearest_edge_hit(
    ray: &LineSegment,
    edges: impl IntoIterator<Item = LineSegment>,
) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;
    for edge in edges {
        let Some(p) = ray.intersect(&edge) else {
            continue;
        };
        if p.distance_to(edge.start) < EDGE_EPSILON || p.distance_to(edge.end) < EDGE_EPSILON {
            continue;
        }
        let d = ray.start.distance_to(p);
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, p));
        }
    }
    best.map(|(_, p)| p)
}

// -- Box -----------------------------------------------------------

fn side(value: f64, lo: f64, hi: f64) -> Ordering {
    if value < lo {
        Ordering::Less
    } else if value > hi {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// The 0-2 corners whose sight lines are tangent to the rectangle,
/// picked from which of the nine regions around it holds the viewpoint.
fn box_silhouette(rect: &Rect, viewpoint: Point) -> Vec<Point> {
    use Ordering::{Equal, Greater, Less};

    let (l, r, t, b) = (rect.left(), rect.right(), rect.top(), rect.bottom());
    let (p, q) = match (side(viewpoint.x, l, r), side(viewpoint.y, t, b)) {
        (Equal, Equal) => return Vec::new(),
        (Less, Less) => ((r, t), (l, b)),
        (Less, Equal) => ((l, t), (l, b)),
        (Less, Greater) => ((l, t), (r, b)),
        (Equal, Less) => ((l, t), (r, t)),
        (Equal, Greater) => ((l, b), (r, b)),
        (Greater, Less) => ((l, t), (r, b)),
        (Greater, Equal) => ((r, t), (r, b)),
        (Greater, Greater) => ((r, t), (l, b)),
    };
    let mut corners = vec![Point::new(p.0, p.1)];
    if q != p {
        corners.push(Point::new(q.0, q.1));
    }
    corners
}

// -- Circle --------------------------------------------------------

impl Circle {
    /// Boundary counts as inside.
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance_to(p) <= self.radius
    }

    /// The two points where lines from `viewpoint` touch the circle.
    pub fn tangent_points(&self, viewpoint: Point) -> Vec<Point> {
        let d = self.center.distance_to(viewpoint);
        if self.radius <= 0.0 || !(d > self.radius) {
            return Vec::new();
        }
        let base = self.center.angle_to(viewpoint);
        let spread = (self.radius / d).acos();
        vec![
            self.center.offset(base - spread, self.radius),
            self.center.offset(base + spread, self.radius),
        ]
    }

    /// First crossing of the circle along `ray`. A graze whose chord is
    /// shorter than [`EDGE_EPSILON`] is a miss, so a ray aimed at a
    /// tangent point passes it the way polygon rays pass corners.
    pub fn intersect(&self, ray: &LineSegment) -> Option<Point> {
        if self.radius <= 0.0 || ray.is_degenerate() {
            return None;
        }
        let d = ray.delta();
        let f = ray.start - self.center;
        let a = d.dot(d);
        let b = 2.0 * f.dot(d);
        let c = f.dot(f) - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if !(disc >= 0.0) {
            return None;
        }
        let root = disc.sqrt();
        if root / a.sqrt() < EDGE_EPSILON {
            return None;
        }
        let t_near = (-b - root) / (2.0 * a);
        let t_far = (-b + root) / (2.0 * a);
        let t = if (0.0..=1.0).contains(&t_near) {
            t_near
        } else if (0.0..=1.0).contains(&t_far) {
            t_far
        } else {
            return None;
        };
        Some(ray.start + d * t)
    }
}

// -- Fingerprint ---------------------------------------------------

/// Content hash of an obstacle set. Coordinates are hashed by their bit
/// patterns, so any change to any shape, or to the order, changes it.
pub fn fingerprint(shapes: &[Shape]) -> u64 {
    let mut hasher = DefaultHasher::new();
    shapes.len().hash(&mut hasher);
    for shape in shapes {
        match shape {
            Shape::Polygon(poly) => {
                0u8.hash(&mut hasher);
                poly.corners.len().hash(&mut hasher);
                for c in &poly.corners {
                    hash_coords(&mut hasher, &[c.x, c.y]);
                }
            }
            Shape::Circle(c) => {
                1u8.hash(&mut hasher);
                hash_coords(&mut hasher, &[c.center.x, c.center.y, c.radius]);
            }
            Shape::Box(r) => {
                2u8.hash(&mut hasher);
                hash_coords(&mut hasher, &[r.x, r.y, r.width, r.height]);
            }
        }
    }
    hasher.finish()
}

fn hash_coords(hasher: &mut DefaultHasher, values: &[f64]) {
    for v in values {
        v.to_bits().hash(hasher);
    }
}
