//! Separating-axis narrow phase.
//!
//! Every body is reduced to one or more convex hulls (a circle, or a convex
//! outline in world space). Concave bodies contribute one hull per convex
//! piece. The test is symmetric: swapping the operands negates the normal.

use crate::collision::info::CollisionInfo;
use crate::math::{BoundingBox, Projection, Vec2};
use crate::objects::PhysicsObject;
use crate::shapes::polygon::edge_normals;
use crate::shapes::Shape;

/// Convex piece of a body as seen by the narrow phase.
#[derive(Debug, Clone)]
pub(crate) struct Hull {
    pub center: Vec2,
    pub bounds: BoundingBox,
    pub kind: HullKind,
}

#[derive(Debug, Clone)]
pub(crate) enum HullKind {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl Hull {
    /// Hulls of a body: one for circles and convex shapes, one per piece for concave ones.
    pub fn of(object: &PhysicsObject) -> Vec<Hull> {
        match &object.shape {
            Shape::Circle(c) => vec![Hull {
                center: object.position,
                bounds: object.bounding_box(),
                kind: HullKind::Circle { radius: c.radius },
            }],
            Shape::Concave(_) => object
                .sub_polygons()
                .iter()
                .map(|sub| Hull {
                    center: sub.position(),
                    bounds: sub.bounding_box(),
                    kind: HullKind::Polygon {
                        vertices: sub.vertices().to_vec(),
                    },
                })
                .collect(),
            _ => vec![Hull {
                center: object.position,
                bounds: object.bounding_box(),
                kind: HullKind::Polygon {
                    vertices: object.world_vertices(),
                },
            }],
        }
    }
}

/// Tests two bodies for overlap.
///
/// On a hit the normal points from `a` to `b` and the depth is positive.
/// Bodies that only touch do not collide.
pub fn test_collision(a: &PhysicsObject, b: &PhysicsObject) -> CollisionInfo {
    let mut info = CollisionInfo::none(a.id(), Some(b.id()));
    if !a.bounding_box().overlaps(&b.bounding_box()) {
        return info;
    }

    let hulls_a = Hull::of(a);
    let hulls_b = Hull::of(b);
    let piecewise = a.shape.is_concave() || b.shape.is_concave();

    let mut deepest: Option<(Vec2, f32)> = None;
    for hull_a in &hulls_a {
        for hull_b in &hulls_b {
            if piecewise && !hull_a.bounds.overlaps(&hull_b.bounds) {
                continue;
            }
            if let Some((normal, depth)) = test_hulls(hull_a, hull_b) {
                if deepest.map_or(true, |(_, best)| depth.abs() > best.abs()) {
                    deepest = Some((normal, depth));
                }
            }
        }
    }

    if let Some((mut normal, depth)) = deepest {
        if piecewise && normal.dot(b.position - a.position) < 0.0 {
            normal = -normal;
        }
        info.normal = normal;
        info.depth = depth;
    }
    info
}

/// SAT between two convex hulls. Returns the normal (A to B) and depth.
pub(crate) fn test_hulls(a: &Hull, b: &Hull) -> Option<(Vec2, f32)> {
    match (&a.kind, &b.kind) {
        (HullKind::Circle { radius: ra }, HullKind::Circle { radius: rb }) => {
            circle_circle(a.center, *ra, b.center, *rb)
        }
        (HullKind::Circle { radius }, HullKind::Polygon { vertices }) => {
            circle_polygon(a.center, *radius, b.center, vertices)
        }
        (HullKind::Polygon { vertices }, HullKind::Circle { radius }) => {
            circle_polygon(b.center, *radius, a.center, vertices).map(|(normal, depth)| (-normal, depth))
        }
        (HullKind::Polygon { vertices: va }, HullKind::Polygon { vertices: vb }) => {
            polygon_polygon(a.center, va, b.center, vb)
        }
    }
}

fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> Option<(Vec2, f32)> {
    let dist_vec = center_b - center_a;
    let dist_sq = dist_vec.magnitude_squared();
    let radii_sum = radius_a + radius_b;

    if dist_sq >= radii_sum * radii_sum {
        return None;
    }

    let distance = dist_sq.sqrt();
    let normal = if distance > 1e-10 {
        dist_vec * (1.0 / distance)
    } else {
        // Concentric circles, any direction separates them
        Vec2::UP
    };
    Some((normal, radii_sum - distance))
}

/// Circle against a convex outline. The normal points from the circle to the polygon.
fn circle_polygon(center: Vec2, radius: f32, polygon_center: Vec2, vertices: &[Vec2]) -> Option<(Vec2, f32)> {
    let circle_box = BoundingBox::from_circle(center, radius);
    let polygon_box = BoundingBox::from_points(vertices)?;
    if !circle_box.overlaps(&polygon_box) {
        return None;
    }

    let mut axes = edge_normals(vertices);
    let closest = closest_boundary_point(vertices, center);
    let to_closest = (closest - center).normalize();
    if to_closest != Vec2::ZERO {
        axes.push(to_closest);
    }

    let (mut normal, depth) = min_overlap(&axes, |axis| {
        (Projection::of_circle(center, radius, axis), Projection::of_points(vertices, axis))
    })?;

    if normal.dot(polygon_center - center) < 0.0 {
        normal = -normal;
    }
    Some((normal, depth))
}

fn polygon_polygon(center_a: Vec2, va: &[Vec2], center_b: Vec2, vb: &[Vec2]) -> Option<(Vec2, f32)> {
    let mut axes = edge_normals(va);
    axes.extend(edge_normals(vb));

    let (mut normal, depth) = min_overlap(&axes, |axis| {
        (Projection::of_points(va, axis), Projection::of_points(vb, axis))
    })?;

    if normal.dot(center_b - center_a) < 0.0 {
        normal = -normal;
    }
    Some((normal, depth))
}

/// Axis of least overlap, or `None` as soon as a separating axis is found.
fn min_overlap<F>(axes: &[Vec2], project: F) -> Option<(Vec2, f32)>
where
    F: Fn(Vec2) -> (Projection, Projection),
{
    let mut best: Option<(Vec2, f32)> = None;
    for &axis in axes {
        if axis.magnitude_squared() < 1e-10 {
            continue;
        }
        let (pa, pb) = project(axis);
        if !pa.overlaps(&pb) {
            return None;
        }
        let overlap = pa.overlap(&pb);
        if best.map_or(true, |(_, min)| overlap < min) {
            best = Some((axis, overlap));
        }
    }
    best
}

/// Finds the point on a line segment closest to a given point.
/// Returns the closest point and its squared distance to `point`.
pub(crate) fn closest_point_on_segment(segment_a: Vec2, segment_b: Vec2, point: Vec2) -> (Vec2, f32) {
    let segment_vec = segment_b - segment_a;
    let length_sq = segment_vec.magnitude_squared();
    if length_sq < 1e-12 {
        return (segment_a, segment_a.distance_squared(point));
    }

    let t = ((point - segment_a).dot(segment_vec) / length_sq).clamp(0.0, 1.0);
    let closest = segment_a + segment_vec * t;
    (closest, closest.distance_squared(point))
}

fn closest_boundary_point(vertices: &[Vec2], point: Vec2) -> Vec2 {
    let n = vertices.len();
    let mut best = vertices[0];
    let mut best_distance = f32::INFINITY;
    for i in 0..n {
        let (closest, distance) = closest_point_on_segment(vertices[i], vertices[(i + 1) % n], point);
        if distance < best_distance {
            best = closest;
            best_distance = distance;
        }
    }
    best
}
