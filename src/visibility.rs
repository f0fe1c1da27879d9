//! Field-of-view visibility by angular sweep.
//!
//! Critical rays are cast at every silhouette corner inside the view
//! cone plus the two cone edges, ordered by pseudo-angle, and the
//! boundary is stitched from their nearest hits. Stretches where the
//! view runs out to max range become arcs around the observer.

use crate::boundary::{CastRay, PathBuilder, VisibilityBoundary};
use crate::geometry::{normalize_angle, LineSegment, Point};
use crate::observer::ObserverPose;
use crate::shapes::{Shape, EDGE_EPSILON};

/// Sideways distance, measured at the corner, of the probe rays cast
/// just beside a critical ray. Must stay well above [`EDGE_EPSILON`] or
/// probes slip through the corner they are meant to graze.
const PROBE_OFFSET: f64 = 10.0 * EDGE_EPSILON;

/// Relative depth jump, seen by a probe ray, that counts as a shadow
/// edge rather than the same surface continuing.
const SHADOW_RATIO: f64 = 1e-2;

/// One critical direction of the sweep.
struct Entry {
    /// The corner that produced the ray, or the far end of a cone edge.
    corner: Point,
    /// Absolute angle, unwrapped so angles grow monotonically along the
    /// sweep from `facing - fov/2` to `facing + fov/2`.
    angle: f64,
    ray: LineSegment,
    hit: Option<Point>,
}

impl Entry {
    fn new(origin: Point, corner: Point, angle: f64, reach: f64) -> Self {
        Self {
            corner,
            angle,
            ray: LineSegment::ray(origin, angle, reach),
            hit: None,
        }
    }

    /// Corner or hit, whichever is nearer the observer.
    fn near(&self, origin: Point) -> Point {
        match self.hit {
            Some(h) if origin.distance_to(h) < origin.distance_to(self.corner) => h,
            _ => self.corner,
        }
    }

    /// Where the ray lands once past its corner: the hit if it lies
    /// beyond, else the end of the ray. `None` when something in front
    /// of the corner already stopped the ray.
    fn far(&self, origin: Point) -> Option<Point> {
        match self.hit {
            Some(h) if origin.distance_to(h) < origin.distance_to(self.corner) => None,
            Some(h) => Some(h),
            None => Some(self.ray.end),
        }
    }
}

/// Nearest point on any of `shapes` crossed by `ray`, measured from the
/// ray's start.
fn nearest_hit(ray: &LineSegment, shapes: &[&Shape]) -> Option<Point> {
    shapes
        .iter()
        .filter_map(|s| s.intersect(ray))
        .min_by(|a, b| {
            ray.start
                .distance_to(*a)
                .total_cmp(&ray.start.distance_to(*b))
        })
}

fn hit_distance(origin: Point, angle: f64, reach: f64, shapes: &[&Shape]) -> f64 {
    nearest_hit(&LineSegment::ray(origin, angle, reach), shapes)
        .map_or(reach, |p| origin.distance_to(p))
}

/// Angle between a critical ray at distance `dist` and its probe, never
/// more than half the `gap` to the neighbouring critical ray.
fn probe_angle(dist: f64, gap: f64) -> f64 {
    (PROBE_OFFSET / dist.max(PROBE_OFFSET)).min(gap / 2.0)
}

/// True when a probe beside `entry` sees noticeably deeper than the
/// entry's own nearest point.
fn opens_shadow(origin: Point, entry: &Entry, probe: f64, reach: f64, shapes: &[&Shape]) -> bool {
    let depth = origin.distance_to(entry.near(origin));
    hit_distance(origin, probe, reach, shapes) > depth * (1.0 + SHADOW_RATIO)
}

/// Compute the visibility boundary for `pose` among `shapes`.
///
/// Pure: the same pose and obstacles always give the same boundary.
pub fn cast_rays(pose: &ObserverPose, shapes: &[Shape]) -> VisibilityBoundary {
    let origin = pose.position;
    let reach = pose.max_distance;
    let half = pose.fov / 2.0;

    // Shapes wholly out of reach can neither occlude nor add corners.
    let nearby: Vec<&Shape> = shapes
        .iter()
        .filter(|s| s.bounding_rect().is_some_and(|r| r.distance_to(origin) <= reach))
        .collect();

    // Corners inside the cone and within range, keyed by pseudo-angle.
    let mut critical: Vec<(f64, Point, f64)> = Vec::new();
    for shape in &nearby {
        for corner in shape.corners_visible_from(origin) {
            let dist = origin.distance_to(corner);
            if dist == 0.0 || dist > reach {
                continue;
            }
            let diff = normalize_angle(origin.angle_to(corner) - pose.facing);
            if diff > -half && diff < half {
                let key = LineSegment::new(origin, corner).pseudo_angle();
                critical.push((key, corner, pose.facing + diff));
            }
        }
    }
    critical.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Rotate so the sweep starts at the cone's start edge; corners whose
    // key sorts before it sit past the +/-pi seam and wrap to the end.
    let start_angle = pose.facing - half;
    let end_angle = pose.facing + half;
    let start_key = LineSegment::ray(origin, start_angle, 1.0).pseudo_angle();
    let offset = critical.partition_point(|c| c.0 < start_key);
    critical.rotate_left(offset);

    let mut entries: Vec<Entry> = Vec::with_capacity(critical.len() + 2);
    let start_edge = origin.offset(start_angle, reach);
    entries.push(Entry::new(origin, start_edge, start_angle, reach));
    for &(_, corner, angle) in &critical {
        entries.push(Entry::new(origin, corner, angle, reach));
    }
    let end_edge = origin.offset(end_angle, reach);
    entries.push(Entry::new(origin, end_edge, end_angle, reach));

    for entry in &mut entries {
        entry.hit = nearest_hit(&entry.ray, &nearby);
        log::trace!(
            "ray at {:.6} rad: corner ({:.3}, {:.3}) hit {:?}",
            entry.angle,
            entry.corner.x,
            entry.corner.y,
            entry.hit
        );
    }

    let mut path = PathBuilder::new();
    path.move_to(origin);
    for (i, cur) in entries.iter().enumerate() {
        path.line_to(cur.near(origin));
        let Some(next) = entries.get(i + 1) else {
            break;
        };

        let mid_angle = (cur.angle + next.angle) / 2.0;
        let mid_hit = nearest_hit(&LineSegment::ray(origin, mid_angle, reach), &nearby);
        if mid_hit.is_none() && cur.hit.is_none() {
            // Open sky between the two rays.
            path.arc(origin, reach, cur.angle, next.angle);
            continue;
        }

        // Follow a ray out past its corner when the view just beside it
        // continues much deeper than the corner: that is a shadow edge.
        let gap = next.angle - cur.angle;
        let leaving = cur.angle + probe_angle(origin.distance_to(cur.near(origin)), gap);
        if opens_shadow(origin, cur, leaving, reach, &nearby) {
            if let Some(far) = cur.far(origin) {
                path.line_to(far);
            }
        }
        let arriving = next.angle - probe_angle(origin.distance_to(next.near(origin)), gap);
        if opens_shadow(origin, next, arriving, reach, &nearby) {
            if let Some(far) = next.far(origin) {
                path.line_to(far);
            }
        }
    }
    path.close();

    log::debug!(
        "visibility from ({:.3}, {:.3}) facing {:.4}: {} corners, {}/{} shapes in reach",
        origin.x,
        origin.y,
        pose.facing,
        critical.len(),
        nearby.len(),
        shapes.len()
    );

    let rays = entries
        .iter()
        .map(|e| CastRay {
            ray: e.ray,
            hit: e.hit,
        })
        .collect();
    path.finish(rays)
}
