//! JSON interchange types for one-shot visibility queries.
//!
//! Every struct here derives Serialize + Deserialize so it can
//! round-trip through the JSON interchange format.

use serde::{Deserialize, Serialize};

use crate::boundary::{CastRay, PathCommand};
use crate::geometry::Point;
use crate::observer::ObserverPose;
use crate::shapes::Shape;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityParams {
    #[serde(default)]
    pub obstacles: Vec<Shape>,
    pub observer: ObserverPose,
    /// Leave the diagnostic rays out of the result.
    #[serde(default)]
    pub skip_rays: bool,
    /// When set, also return the boundary flattened with this arc step
    /// (radians).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_arc_step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    pub path: Vec<PathCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rays: Vec<CastRay>,
    pub area: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<Point>,
}
