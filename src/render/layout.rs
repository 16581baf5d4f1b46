//! Deterministic force-directed placement.
//!
//! A cooling-schedule energy minimization: every round each node gets a
//! displacement from pairwise repulsion, edge springs and gravity, capped by
//! the current temperature. The temperature shrinks by `cooling_factor` each
//! round and the run stops at `iterations` rounds or once it drops under
//! `min_temperature`. No randomness: the same input always lands on the same
//! coordinates.

use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::Serialize;

use crate::config::LayoutConfig;

/// Converts `gravity` into a linear pull per unit of distance from the center.
const GRAVITY_SCALE: f64 = 2.5e-4;
/// Distances below this are treated as coincident.
const EPSILON: f64 = 1e-6;
/// Floor for squared distance in the repulsion term.
const MIN_DISTANCE_SQ: f64 = 1.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Drawing area of a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Place `node_count` nodes connected by `edges` (index pairs).
///
/// Returns one point per node, centered on the origin.
pub fn place(node_count: usize, edges: &[(usize, usize)], config: &LayoutConfig) -> Vec<Point> {
    let mut positions = initial_ring(node_count, config.ideal_edge_length);
    if node_count < 2 {
        return positions;
    }

    let cooling = config.cooling_factor.clamp(0.0, 1.0);
    let elasticity = config.edge_elasticity.max(EPSILON);
    let gravity = config.gravity.max(0.0) * GRAVITY_SCALE;
    let mut temperature = config.initial_temperature.max(0.0);
    let mut displacement = vec![Point::ORIGIN; node_count];

    for _ in 0..config.iterations {
        if temperature < config.min_temperature {
            break;
        }
        displacement.fill(Point::ORIGIN);

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let (dir, dist) = direction(positions[i] - positions[j], i, j);
                let push = config.node_repulsion / (dist * dist).max(MIN_DISTANCE_SQ);
                displacement[i] += dir * push;
                displacement[j] -= dir * push;
            }
        }

        for &(from, to) in edges {
            if from == to || from >= node_count || to >= node_count {
                continue;
            }
            let delta = positions[to] - positions[from];
            let dist = delta.length();
            if dist < EPSILON {
                continue;
            }
            let stretch = dist - config.ideal_edge_length;
            let pull = stretch * stretch.abs() / elasticity;
            let dir = delta * (1.0 / dist);
            displacement[from] += dir * pull;
            displacement[to] -= dir * pull;
        }

        for (pos, disp) in positions.iter_mut().zip(displacement.iter_mut()) {
            *disp -= *pos * gravity;

            let len = disp.length();
            if len > temperature {
                *disp = *disp * (temperature / len);
            }
            if disp.is_finite() {
                *pos += *disp;
            }
        }

        temperature *= cooling;
    }

    positions
}

/// Scale and translate `positions` so they fill `viewport` minus `padding`.
///
/// `radii` holds the drawn radius of each position. Centres are inset by the
/// largest one so every circle stays inside the viewport. Returns `None` when
/// the viewport is not visible; callers keep the raw layout coordinates in
/// that case.
pub fn fit(
    positions: &[Point],
    radii: &[f64],
    viewport: Viewport,
    padding: f64,
) -> Option<Vec<Point>> {
    if !viewport.is_visible() {
        return None;
    }
    if positions.is_empty() {
        return Some(Vec::new());
    }

    let (min, max) = bounds(positions);
    let span_x = max.x - min.x;
    let span_y = max.y - min.y;
    let inset = padding + radii.iter().copied().fold(0.0, f64::max);
    let room_x = (viewport.width - 2.0 * inset).max(0.0);
    let room_y = (viewport.height - 2.0 * inset).max(0.0);

    let scale = match (span_x > EPSILON, span_y > EPSILON) {
        (true, true) => (room_x / span_x).min(room_y / span_y),
        (true, false) => room_x / span_x,
        (false, true) => room_y / span_y,
        (false, false) => 1.0,
    };

    let mid = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let center = viewport.center();
    Some(
        positions
            .iter()
            .map(|p| center + (*p - mid) * scale)
            .collect(),
    )
}

/// Axis-aligned bounding box as (min, max).
pub fn bounds(positions: &[Point]) -> (Point, Point) {
    positions.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}

/// Evenly spaced ring sized so neighbours start about one edge length apart.
fn initial_ring(node_count: usize, edge_length: f64) -> Vec<Point> {
    match node_count {
        0 => Vec::new(),
        1 => vec![Point::ORIGIN],
        n => {
            let radius = (n as f64 * edge_length.max(1.0)) / TAU;
            (0..n)
                .map(|i| {
                    let angle = TAU * i as f64 / n as f64;
                    Point::new(radius * angle.cos(), radius * angle.sin())
                })
                .collect()
        }
    }
}

/// Unit vector and length of `delta`, with a fixed tie-break for coincident nodes.
fn direction(delta: Point, i: usize, j: usize) -> (Point, f64) {
    let dist = delta.length();
    if dist > EPSILON {
        (delta * (1.0 / dist), dist)
    } else {
        let angle = (i + j) as f64 * GOLDEN_ANGLE;
        (Point::new(angle.cos(), angle.sin()), 0.0)
    }
}
