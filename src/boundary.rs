//! The computed visibility boundary, in the form rendering and
//! diagnostic collaborators consume it.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::{point_in_polygon, polygon_area, LineSegment, Point};

/// Arc flattening step used by [`VisibilityBoundary::area`] and
/// [`VisibilityBoundary::is_visible`]: one degree.
pub const DEFAULT_ARC_STEP: f64 = PI / 180.0;

/// Finest arc step [`VisibilityBoundary::to_polygon`] honours. A full
/// circle then flattens to at most about 63k points.
pub const MIN_ARC_STEP: f64 = 1e-4;

/// Consecutive path points closer than this are merged.
const POINT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo {
        to: Point,
    },
    LineTo {
        to: Point,
    },
    /// Arc around `center` sweeping from `start_angle` toward increasing
    /// angle up to `end_angle`. The builder always places the current
    /// point at the arc's start first.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Close,
}

/// One critical ray and the nearest obstacle point it reached, if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CastRay {
    pub ray: LineSegment,
    pub hit: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisibilityBoundary {
    path: Vec<PathCommand>,
    rays: Vec<CastRay>,
}

impl VisibilityBoundary {
    /// Closed path suitable for fill or stroke.
    pub fn path(&self) -> &[PathCommand] {
        &self.path
    }

    /// Critical rays in sweep order, for debug overlays.
    pub fn rays(&self) -> &[CastRay] {
        &self.rays
    }

    /// Every explicit point on the path: move/line targets plus the two
    /// ends of each arc.
    pub fn vertices(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.path.len() + 2);
        for cmd in &self.path {
            match *cmd {
                PathCommand::MoveTo { to } | PathCommand::LineTo { to } => out.push(to),
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    out.push(center.offset(start_angle, radius));
                    out.push(center.offset(end_angle, radius));
                }
                PathCommand::Close => {}
            }
        }
        out
    }

    /// Flatten the path into a polygon, splitting arcs into chords no
    /// wider than `max_arc_step` radians. Steps below [`MIN_ARC_STEP`]
    /// are raised to it; non-positive or NaN steps use the default.
    pub fn to_polygon(&self, max_arc_step: f64) -> Vec<Point> {
        let step = if max_arc_step > 0.0 {
            max_arc_step.max(MIN_ARC_STEP)
        } else {
            DEFAULT_ARC_STEP
        };
        let mut out: Vec<Point> = Vec::new();
        for cmd in &self.path {
            match *cmd {
                PathCommand::MoveTo { to } | PathCommand::LineTo { to } => {
                    push_distinct(&mut out, to)
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let sweep = end_angle - start_angle;
                    let pieces = (sweep.abs() / step).ceil().max(1.0) as usize;
                    for k in 0..=pieces {
                        let angle = start_angle + sweep * k as f64 / pieces as f64;
                        push_distinct(&mut out, center.offset(angle, radius));
                    }
                }
                PathCommand::Close => {}
            }
        }
        if out.len() > 1 && out[0].distance_to(out[out.len() - 1]) < POINT_EPSILON {
            out.pop();
        }
        out
    }

    /// Area of the visible region.
    pub fn area(&self) -> f64 {
        polygon_area(&self.to_polygon(DEFAULT_ARC_STEP))
    }

    /// Even-odd test of `p` against the flattened boundary.
    pub fn is_visible(&self, p: Point) -> bool {
        point_in_polygon(p, &self.to_polygon(DEFAULT_ARC_STEP))
    }
}

fn push_distinct(out: &mut Vec<Point>, p: Point) {
    if out.last().map_or(true, |last| last.distance_to(p) >= POINT_EPSILON) {
        out.push(p);
    }
}

/// Accumulates path commands, dropping zero-length line steps.
#[derive(Debug, Default)]
pub(crate) struct PathBuilder {
    path: Vec<PathCommand>,
    current: Option<Point>,
}

impl PathBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn move_to(&mut self, to: Point) {
        self.path.push(PathCommand::MoveTo { to });
        self.current = Some(to);
    }

    pub(crate) fn line_to(&mut self, to: Point) {
        match self.current {
            Some(cur) if cur.distance_to(to) < POINT_EPSILON => {}
            Some(_) => {
                self.path.push(PathCommand::LineTo { to });
                self.current = Some(to);
            }
            None => self.move_to(to),
        }
    }

    pub(crate) fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.line_to(center.offset(start_angle, radius));
        self.path.push(PathCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
        self.current = Some(center.offset(end_angle, radius));
    }

    pub(crate) fn close(&mut self) {
        self.path.push(PathCommand::Close);
    }

    pub(crate) fn finish(self, rays: Vec<CastRay>) -> VisibilityBoundary {
        VisibilityBoundary {
            path: self.path,
            rays,
        }
    }
}
