//! Criterion benchmarks for the sightcone visibility sweep.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sightcone::geometry::Point;
use sightcone::observer::Observer;
use sightcone::scene::Scene;
use sightcone::shapes::Shape;
use sightcone::types::VisibilityParams;
use sightcone::{compute_visibility_json, visibility};

// -- JSON fixtures --

/// Open field, nothing to hit.
const OPEN_SKY_JSON: &str = r#"{
  "obstacles": [],
  "observer": {
    "position": {"x": 0.0, "y": 0.0},
    "facing": 0.0,
    "fov": 1.5707963267948966,
    "max_distance": 100.0
  }
}"#;

/// A handful of mixed shapes in front of a wide cone.
const MIXED_JSON: &str = r#"{
  "obstacles": [
    {"type": "box", "x": 50.0, "y": -5.0, "width": 10.0, "height": 10.0},
    {"type": "box", "x": 20.0, "y": 30.0, "width": 6.0, "height": 4.0},
    {"type": "circle", "center": {"x": 35.0, "y": -20.0}, "radius": 5.0},
    {"type": "circle", "center": {"x": 80.0, "y": 25.0}, "radius": 8.0},
    {"type": "polygon", "corners": [
      {"x": 60.0, "y": 40.0}, {"x": 75.0, "y": 45.0}, {"x": 68.0, "y": 60.0}
    ]},
    {"type": "polygon", "corners": [
      {"x": 25.0, "y": -50.0}, {"x": 45.0, "y": -48.0},
      {"x": 48.0, "y": -40.0}, {"x": 30.0, "y": -38.0}
    ]}
  ],
  "observer": {
    "position": {"x": 0.0, "y": 0.0},
    "facing": 0.0,
    "fov": 2.6,
    "max_distance": 120.0
  }
}"#;

/// Grid of boxes and circles, roughly a cluttered room.
fn cluttered_obstacles() -> Vec<Shape> {
    let mut shapes = Vec::new();
    for i in 0..8 {
        for j in 0..8 {
            let x = 20.0 + i as f64 * 18.0;
            let y = -70.0 + j as f64 * 18.0;
            if (i + j) % 2 == 0 {
                shapes.push(Shape::rect(x, y, 6.0, 6.0));
            } else {
                shapes.push(Shape::circle(Point::new(x + 3.0, y + 3.0), 3.0));
            }
        }
    }
    shapes
}

fn bench_sweep(c: &mut Criterion) {
    let open: VisibilityParams = serde_json::from_str(OPEN_SKY_JSON).expect("fixture");
    let mixed: VisibilityParams = serde_json::from_str(MIXED_JSON).expect("fixture");
    let cluttered = cluttered_obstacles();

    let mut group = c.benchmark_group("cast_rays");
    group.bench_function("open_sky", |b| {
        b.iter(|| visibility::cast_rays(black_box(&open.observer), black_box(&open.obstacles)))
    });
    group.bench_function("mixed", |b| {
        b.iter(|| visibility::cast_rays(black_box(&mixed.observer), black_box(&mixed.obstacles)))
    });
    group.bench_function("cluttered_64", |b| {
        b.iter(|| visibility::cast_rays(black_box(&mixed.observer), black_box(&cluttered)))
    });
    group.finish();
}

fn bench_json(c: &mut Criterion) {
    c.bench_function("compute_visibility_json/mixed", |b| {
        b.iter(|| compute_visibility_json(black_box(MIXED_JSON)).expect("query"))
    });
}

fn bench_scene_refresh(c: &mut Criterion) {
    c.bench_function("scene/refresh_all_32", |b| {
        b.iter_batched(
            || {
                let mut scene = Scene::new();
                for shape in cluttered_obstacles() {
                    scene.add_obstacle(shape);
                }
                for k in 0..32 {
                    let mut o = Observer::new(Point::new(0.0, -64.0 + k as f64 * 4.0));
                    o.look_at(Point::new(100.0, 0.0));
                    scene.add_observer(o);
                }
                scene
            },
            |mut scene| scene.refresh_all(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_sweep, bench_json, bench_scene_refresh);
criterion_main!(benches);
