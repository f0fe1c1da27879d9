//! Sightcone: 2D field-of-view visibility among polygon, box and circle
//! obstacles.
//!
//! An [`Observer`] with a position, facing, cone width and range keeps a
//! lazily recomputed [`VisibilityBoundary`]; a [`Scene`] holds the
//! obstacles and observers together. One-shot queries go through
//! [`compute_visibility_json`], which takes a `VisibilityParams` JSON
//! string and returns a `VisibilityResult` JSON string. With the
//! `python` feature the same call is importable from Python.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod observer;
pub mod scene;
pub mod shapes;
pub mod types;
pub mod visibility;

pub use boundary::{CastRay, PathCommand, VisibilityBoundary, DEFAULT_ARC_STEP, MIN_ARC_STEP};
pub use error::{Error, Result};
pub use geometry::{LineSegment, Point, Rect};
pub use observer::{Observer, ObserverPose};
pub use scene::Scene;
pub use shapes::{Circle, Polygon, Shape};
pub use types::{VisibilityParams, VisibilityResult};

fn finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn validate_shape(index: usize, shape: &Shape) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidShape {
        index,
        reason: reason.to_string(),
    };
    match shape {
        Shape::Polygon(poly) => {
            if !poly.corners.iter().copied().all(finite) {
                return Err(invalid("polygon corner is not finite"));
            }
        }
        Shape::Circle(circle) => {
            if !finite(circle.center) {
                return Err(invalid("circle center is not finite"));
            }
            if !(circle.radius.is_finite() && circle.radius >= 0.0) {
                return Err(invalid("circle radius must be finite and non-negative"));
            }
        }
        Shape::Box(rect) => {
            if ![rect.x, rect.y, rect.width, rect.height]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(invalid("box extent is not finite"));
            }
        }
    }
    Ok(())
}

/// Compute the visibility boundary for a single observer pose.
pub fn evaluate(params: &VisibilityParams) -> Result<VisibilityResult> {
    params.observer.validate()?;
    for (index, shape) in params.obstacles.iter().enumerate() {
        validate_shape(index, shape)?;
    }

    let boundary = visibility::cast_rays(&params.observer, &params.obstacles);
    let polygon = params
        .polygon_arc_step
        .map(|step| boundary.to_polygon(step))
        .unwrap_or_default();
    let rays = if params.skip_rays {
        Vec::new()
    } else {
        boundary.rays().to_vec()
    };

    Ok(VisibilityResult {
        path: boundary.path().to_vec(),
        rays,
        area: boundary.area(),
        polygon,
    })
}

/// Run a visibility query.
///
/// Takes a JSON string matching `VisibilityParams` and returns a JSON
/// string matching `VisibilityResult`.
pub fn compute_visibility_json(params_json: &str) -> Result<String> {
    let params: VisibilityParams = serde_json::from_str(params_json)?;
    let result = evaluate(&params)?;
    Ok(serde_json::to_string(&result)?)
}

#[cfg(feature = "python")]
#[pyfunction]
fn visibility_json(params_json: &str) -> PyResult<String> {
    compute_visibility_json(params_json)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))
}

/// Sightcone visibility engine, importable from Python.
#[cfg(feature = "python")]
#[pymodule]
fn sightcone(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(visibility_json, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_JSON: &str = r#"{
        "obstacles": [{"type": "box", "x": 50.0, "y": -5.0, "width": 10.0, "height": 10.0}],
        "observer": {
            "position": {"x": 0.0, "y": 0.0},
            "fov": 1.5707963267948966,
            "max_distance": 100.0
        }
    }"#;

    #[test]
    fn json_query_round_trip() {
        let out = compute_visibility_json(BOX_JSON).expect("query");
        let result: VisibilityResult = serde_json::from_str(&out).expect("result JSON");
        assert!(matches!(result.path[0], PathCommand::MoveTo { .. }));
        assert!(matches!(result.path.last(), Some(PathCommand::Close)));
        assert!(!result.rays.is_empty());
        assert!(result.polygon.is_empty());
        // Less than the open quarter disc.
        let wedge = std::f64::consts::PI * 100.0 * 100.0 / 4.0;
        assert!(result.area > 0.0 && result.area < wedge);
    }

    #[test]
    fn json_matches_direct_observer() {
        let params: VisibilityParams = serde_json::from_str(BOX_JSON).expect("params");
        let result = evaluate(&params).expect("evaluate");
        let mut observer = Observer::with_pose(params.observer);
        let boundary = observer.visibility_boundary(&params.obstacles);
        assert_eq!(result.path, boundary.path());
        assert_eq!(result.rays, boundary.rays());
    }

    #[test]
    fn optional_outputs() {
        let mut params: VisibilityParams = serde_json::from_str(BOX_JSON).expect("params");
        params.skip_rays = true;
        params.polygon_arc_step = Some(0.1);
        let result = evaluate(&params).expect("evaluate");
        assert!(result.rays.is_empty());
        assert!(result.polygon.len() > 4);
    }

    #[test]
    fn tiny_arc_step_stays_bounded() {
        let json = r#"{
            "observer": {"position": {"x": 0.0, "y": 0.0}, "fov": 6.283185307179586},
            "skip_rays": true,
            "polygon_arc_step": 1e-12
        }"#;
        let out = compute_visibility_json(json).expect("query");
        let result: VisibilityResult = serde_json::from_str(&out).expect("result JSON");
        let limit = (std::f64::consts::TAU / boundary::MIN_ARC_STEP).ceil() as usize + 2;
        assert!(!result.polygon.is_empty());
        assert!(result.polygon.len() <= limit);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            compute_visibility_json("{not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            compute_visibility_json(r#"{"obstacles": []}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn bad_observer_is_rejected() {
        let json = r#"{"observer": {"position": {"x": 0.0, "y": 0.0}, "max_distance": -1.0}}"#;
        assert!(matches!(
            compute_visibility_json(json),
            Err(Error::InvalidObserver(_))
        ));
    }

    #[test]
    fn bad_shape_reports_its_index() {
        let json = r#"{
            "obstacles": [
                {"type": "box", "x": 0.0, "y": 0.0, "w": 1.0, "h": 1.0},
                {"type": "circle", "center": {"x": 5.0, "y": 5.0}, "radius": -2.0}
            ],
            "observer": {"position": {"x": 10.0, "y": 10.0}}
        }"#;
        match compute_visibility_json(json) {
            Err(Error::InvalidShape { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidShape, got {other:?}"),
        }
    }
}
