//! Obstacle set plus the observers looking at it.
//!
//! Every obstacle mutation invalidates every observer, so a boundary is
//! only ever served for the obstacles currently in the scene.

use rayon::prelude::*;

use crate::boundary::VisibilityBoundary;
use crate::geometry::Point;
use crate::observer::Observer;
use crate::shapes::{self, Shape};

#[derive(Debug, Clone, Default)]
pub struct Scene {
    obstacles: Vec<Shape>,
    observers: Vec<Observer>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn obstacles(&self) -> &[Shape] {
        &self.obstacles
    }

    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    fn invalidate_all(&mut self) {
        for observer in &mut self.observers {
            observer.invalidate();
        }
    }

    // -- Obstacles -----------------------------------------------------

    /// Returns the new obstacle's index.
    pub fn add_obstacle(&mut self, shape: Shape) -> usize {
        self.obstacles.push(shape);
        self.invalidate_all();
        log::debug!("added obstacle {}", self.obstacles.len() - 1);
        self.obstacles.len() - 1
    }

    /// Later obstacles shift down by one.
    pub fn remove_obstacle(&mut self, idx: usize) -> Option<Shape> {
        if idx >= self.obstacles.len() {
            return None;
        }
        let removed = self.obstacles.remove(idx);
        self.invalidate_all();
        log::debug!("removed obstacle {idx}");
        Some(removed)
    }

    /// Replace obstacle `idx`; false if there is no such obstacle.
    pub fn update_obstacle(&mut self, idx: usize, shape: Shape) -> bool {
        let Some(slot) = self.obstacles.get_mut(idx) else {
            return false;
        };
        *slot = shape;
        self.invalidate_all();
        log::debug!("updated obstacle {idx}");
        true
    }

    pub fn move_obstacle(&mut self, idx: usize, dx: f64, dy: f64) -> bool {
        let Some(shape) = self.obstacles.get_mut(idx) else {
            return false;
        };
        shape.translate(dx, dy);
        self.invalidate_all();
        log::debug!("moved obstacle {idx} by ({dx}, {dy})");
        true
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        self.invalidate_all();
        log::debug!("cleared obstacles");
    }

    /// Index of the topmost (most recently added) obstacle containing `p`.
    pub fn obstacle_at(&self, p: Point) -> Option<usize> {
        self.obstacles.iter().rposition(|shape| shape.contains(p))
    }

    // -- Observers -----------------------------------------------------

    pub fn add_observer(&mut self, observer: Observer) -> usize {
        self.observers.push(observer);
        self.observers.len() - 1
    }

    pub fn observer(&self, idx: usize) -> Option<&Observer> {
        self.observers.get(idx)
    }

    /// Mutable access for pose changes; the observer's own setters take
    /// care of invalidation.
    pub fn observer_mut(&mut self, idx: usize) -> Option<&mut Observer> {
        self.observers.get_mut(idx)
    }

    pub fn update_observer(&mut self, idx: usize, observer: Observer) -> bool {
        let Some(slot) = self.observers.get_mut(idx) else {
            return false;
        };
        *slot = observer;
        true
    }

    pub fn remove_observer(&mut self, idx: usize) -> Option<Observer> {
        (idx < self.observers.len()).then(|| self.observers.remove(idx))
    }

    /// Boundary for observer `idx`, recomputed if stale.
    pub fn boundary(&mut self, idx: usize) -> Option<&VisibilityBoundary> {
        let Self {
            obstacles,
            observers,
        } = self;
        observers
            .get_mut(idx)
            .map(|observer| observer.visibility_boundary(obstacles))
    }

    /// Recompute every stale observer in parallel. Returns how many were
    /// recomputed.
    pub fn refresh_all(&mut self) -> usize {
        let obstacles = &self.obstacles;
        let fingerprint = shapes::fingerprint(obstacles);
        let refreshed = self
            .observers
            .par_iter_mut()
            .filter(|observer| !observer.is_fresh_for_fingerprint(fingerprint))
            .map(|observer| {
                observer.boundary_for(obstacles, fingerprint);
            })
            .count();
        log::debug!(
            "refreshed {refreshed} of {} observers against {} obstacles",
            self.observers.len(),
            obstacles.len()
        );
        refreshed
    }
}
