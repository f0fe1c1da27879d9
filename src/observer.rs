//! Observer pose and its lazily recomputed visibility boundary.
//!
//! The cached boundary is either stale or fresh. Every pose setter makes
//! it stale; it becomes fresh only when [`Observer::visibility_boundary`]
//! recomputes it. A fresh cache also remembers a fingerprint of the
//! obstacle set it was computed against and is treated as stale for any
//! set with a different fingerprint.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::boundary::VisibilityBoundary;
use crate::error::{Error, Result};
use crate::geometry::{unit_vector, Point};
use crate::shapes::{self, Shape};
use crate::visibility;

pub const DEFAULT_FOV: f64 = FRAC_PI_2;
pub const DEFAULT_MAX_DISTANCE: f64 = 200.0;

fn default_fov() -> f64 {
    DEFAULT_FOV
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE
}

/// Where the observer stands and what it can see.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverPose {
    pub position: Point,
    /// Radians, measured like `atan2`.
    #[serde(default)]
    pub facing: f64,
    /// Full cone width in radians.
    #[serde(default = "default_fov")]
    pub fov: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
}

impl ObserverPose {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            facing: 0.0,
            fov: DEFAULT_FOV,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Reject poses the sweep cannot make sense of.
    pub fn validate(&self) -> Result<()> {
        let p = self.position;
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(Error::InvalidObserver(format!(
                "position ({}, {}) is not finite",
                p.x, p.y
            )));
        }
        if !self.facing.is_finite() {
            return Err(Error::InvalidObserver(format!(
                "facing {} is not finite",
                self.facing
            )));
        }
        if !(0.0..=TAU).contains(&self.fov) {
            return Err(Error::InvalidObserver(format!(
                "fov {} is outside [0, 2pi]",
                self.fov
            )));
        }
        if !(self.max_distance.is_finite() && self.max_distance >= 0.0) {
            return Err(Error::InvalidObserver(format!(
                "max_distance {} must be finite and non-negative",
                self.max_distance
            )));
        }
        Ok(())
    }
}

impl Default for ObserverPose {
    fn default() -> Self {
        Self::new(Point::default())
    }
}

#[derive(Debug, Clone)]
struct CachedBoundary {
    fingerprint: u64,
    boundary: VisibilityBoundary,
}

#[derive(Debug, Clone)]
pub struct Observer {
    pose: ObserverPose,
    /// `None` is stale.
    cache: Option<CachedBoundary>,
}

impl Observer {
    pub fn new(position: Point) -> Self {
        Self::with_pose(ObserverPose::new(position))
    }

    /// Out-of-range fields fall back to the defaults.
    pub fn with_pose(pose: ObserverPose) -> Self {
        let mut observer = Self {
            pose: ObserverPose::new(Point::default()),
            cache: None,
        };
        observer.set_pose(
            pose.position,
            pose.facing,
            Some(pose.fov),
            Some(pose.max_distance),
        );
        observer
    }

    pub fn pose(&self) -> &ObserverPose {
        &self.pose
    }

    pub fn position(&self) -> Point {
        self.pose.position
    }

    pub fn facing(&self) -> f64 {
        self.pose.facing
    }

    pub fn fov(&self) -> f64 {
        self.pose.fov
    }

    pub fn max_distance(&self) -> f64 {
        self.pose.max_distance
    }

    // -- Mutators ------------------------------------------------------

    /// Update the whole pose at once. `None` keeps the current fov or
    /// range.
    pub fn set_pose(
        &mut self,
        position: Point,
        facing: f64,
        fov: Option<f64>,
        max_distance: Option<f64>,
    ) {
        self.set_position(position);
        self.set_facing(facing);
        if let Some(fov) = fov {
            self.set_fov(fov);
        }
        if let Some(d) = max_distance {
            self.set_max_distance(d);
        }
    }

    pub fn set_position(&mut self, position: Point) {
        if !(position.x.is_finite() && position.y.is_finite()) {
            log::warn!("ignoring non-finite observer position {position:?}");
            return;
        }
        self.pose.position = position;
        self.invalidate();
    }

    pub fn set_facing(&mut self, facing: f64) {
        if !facing.is_finite() {
            log::warn!("ignoring non-finite facing {facing}");
            return;
        }
        self.pose.facing = facing;
        self.invalidate();
    }

    /// Clamped to [0, 2pi].
    pub fn set_fov(&mut self, fov: f64) {
        if fov.is_nan() {
            log::warn!("ignoring NaN fov");
            return;
        }
        self.pose.fov = fov.clamp(0.0, TAU);
        self.invalidate();
    }

    /// Negative ranges are clamped to zero.
    pub fn set_max_distance(&mut self, max_distance: f64) {
        if !max_distance.is_finite() {
            log::warn!("ignoring non-finite max distance {max_distance}");
            return;
        }
        self.pose.max_distance = max_distance.max(0.0);
        self.invalidate();
    }

    /// Turn to face `target`. Facing is unchanged when the target is the
    /// observer's own position.
    pub fn look_at(&mut self, target: Point) {
        if let Some(dir) = unit_vector(self.pose.position, target) {
            self.set_facing(dir.y.atan2(dir.x));
        }
    }

    /// Mark the cached boundary stale. Collaborators that change the
    /// obstacle set call this; pose setters call it themselves.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    // -- Boundary ------------------------------------------------------

    pub fn is_stale(&self) -> bool {
        self.cache.is_none()
    }

    /// True when the cached boundary was computed for the current pose
    /// and an obstacle set with the same fingerprint as `obstacles`.
    pub fn is_fresh_for(&self, obstacles: &[Shape]) -> bool {
        self.is_fresh_for_fingerprint(shapes::fingerprint(obstacles))
    }

    pub(crate) fn is_fresh_for_fingerprint(&self, fingerprint: u64) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|c| c.fingerprint == fingerprint)
    }

    /// Last computed boundary, if still fresh.
    pub fn cached_boundary(&self) -> Option<&VisibilityBoundary> {
        self.cache.as_ref().map(|c| &c.boundary)
    }

    /// The visibility boundary among `obstacles`, recomputed only if the
    /// cache is stale or was built for a different obstacle set.
    pub fn visibility_boundary(&mut self, obstacles: &[Shape]) -> &VisibilityBoundary {
        self.boundary_for(obstacles, shapes::fingerprint(obstacles))
    }

    /// As [`Observer::visibility_boundary`], with the obstacle
    /// fingerprint already computed by the caller.
    pub(crate) fn boundary_for(
        &mut self,
        obstacles: &[Shape],
        fingerprint: u64,
    ) -> &VisibilityBoundary {
        if !self.is_fresh_for_fingerprint(fingerprint) {
            self.invalidate();
        }
        self.cast_rays(obstacles, fingerprint)
    }

    /// Recompute into the cache when stale; returns the fresh boundary.
    fn cast_rays(&mut self, obstacles: &[Shape], fingerprint: u64) -> &VisibilityBoundary {
        let pose = self.pose;
        &self
            .cache
            .get_or_insert_with(|| CachedBoundary {
                fingerprint,
                boundary: visibility::cast_rays(&pose, obstacles),
            })
            .boundary
    }
}
