//! Contact points for a colliding pair, computed on the separated pose.

use smallvec::SmallVec;

use crate::collision::border::BorderEdge;
use crate::collision::detection::{closest_point_on_segment, Hull, HullKind};
use crate::collision::info::CollisionInfo;
use crate::math::vec2::Vec2;
use crate::objects::PhysicsObject;
use crate::shapes::Shape;

/// Squared distance below which two points are treated as the same.
pub const EPSILON: f32 = 1e-4;

/// Up to two points for convex pairs; concave unions may spill to the heap.
pub type ContactPoints = SmallVec<[Vec2; 2]>;

fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn push_unique(points: &mut ContactPoints, point: Vec2) {
    if !points.iter().any(|p| p.nearly_equals(point, EPSILON)) {
        points.push(point);
    }
}

/// Contact points between two bodies that `info` reports as colliding.
pub fn find_contact_points(a: &PhysicsObject, b: &PhysicsObject, info: &CollisionInfo) -> ContactPoints {
    let mut points = ContactPoints::new();

    if let Shape::Circle(c) = &a.shape {
        points.push(a.position + info.normal * c.radius);
        return points;
    }
    if let Shape::Circle(c) = &b.shape {
        points.push(b.position - info.normal * c.radius);
        return points;
    }

    if !a.shape.is_concave() && !b.shape.is_concave() {
        return polygon_contacts(&a.world_vertices(), &b.world_vertices());
    }

    let hulls_a = Hull::of(a);
    let hulls_b = Hull::of(b);
    for hull_a in &hulls_a {
        for hull_b in &hulls_b {
            if !hull_a.bounds.overlaps(&hull_b.bounds) {
                continue;
            }
            let (HullKind::Polygon { vertices: va }, HullKind::Polygon { vertices: vb }) = (&hull_a.kind, &hull_b.kind)
            else {
                continue;
            };
            for point in polygon_contacts(va, vb) {
                push_unique(&mut points, point);
            }
        }
    }
    retain_on_outlines(&mut points, &a.world_vertices(), &b.world_vertices());
    points
}

fn on_outline(point: Vec2, outline: &[Vec2]) -> bool {
    let n = outline.len();
    (0..n).any(|i| closest_point_on_segment(outline[i], outline[(i + 1) % n], point).1 <= EPSILON)
}

/// Drops points lying on the internal seams between convex pieces, keeping
/// only those on both outer outlines. Leaves `points` alone if that would
/// remove every point.
fn retain_on_outlines(points: &mut ContactPoints, outline_a: &[Vec2], outline_b: &[Vec2]) {
    if points.iter().any(|&p| on_outline(p, outline_a) && on_outline(p, outline_b)) {
        points.retain(|p| on_outline(*p, outline_a) && on_outline(*p, outline_b));
    }
}

/// Closest vertex-to-edge points in both directions.
///
/// Keeps every point within `EPSILON` of the best distance, at most two.
/// Returns nothing if the outlines are further apart than `EPSILON`.
pub fn polygon_contacts(va: &[Vec2], vb: &[Vec2]) -> ContactPoints {
    let mut points = ContactPoints::new();
    let mut min_distance = f32::INFINITY;

    for (vertices, edges) in [(va, vb), (vb, va)] {
        let n = edges.len();
        for &vertex in vertices {
            for i in 0..n {
                let (closest, distance) = closest_point_on_segment(edges[i], edges[(i + 1) % n], vertex);
                if nearly_equal(distance, min_distance) {
                    if points.len() < 2 && !points.iter().any(|p| p.nearly_equals(closest, EPSILON)) {
                        points.push(closest);
                    }
                } else if distance < min_distance {
                    min_distance = distance;
                    points.clear();
                    points.push(closest);
                }
            }
        }
    }

    if min_distance > EPSILON {
        points.clear();
    }
    points
}

/// Contact points between a body and a border edge it was just pushed back behind.
pub fn border_contact_points(object: &PhysicsObject, edge: &BorderEdge) -> ContactPoints {
    let mut points = ContactPoints::new();
    if let Shape::Circle(c) = &object.shape {
        points.push(object.position + edge.normal * c.radius);
        return points;
    }

    let tangent = Vec2::new(-edge.normal.y, edge.normal.x);
    for vertex in object.world_vertices() {
        let on_edge = edge.edge_corner + tangent * (vertex - edge.edge_corner).dot(tangent);
        if vertex.distance_squared(on_edge) <= EPSILON {
            push_unique(&mut points, on_edge);
            if points.len() == 2 {
                break;
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::border::Border;
    use crate::collision::detection::test_collision;
    use crate::math::BoundingBox;
    use crate::objects::ObjectFactory;
    use approx::assert_relative_eq;

    fn factory() -> ObjectFactory {
        ObjectFactory::default()
    }

    #[test]
    fn test_circle_contact_on_surface() {
        let a = factory().circle(Vec2::new(0.0, 0.0), 1.0).unwrap();
        let b = factory().rectangle(Vec2::new(1.9, 0.0), 2.0, 2.0, 0.0).unwrap();
        let info = test_collision(&a, &b);
        let points = find_contact_points(&a, &b, &info);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 1.0, epsilon = 1e-5);

        let info = test_collision(&b, &a);
        let points = find_contact_points(&b, &a, &info);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_stacked_boxes_touch_along_an_edge() {
        let a = factory().rectangle(Vec2::new(0.0, 0.0), 2.0, 2.0, 0.0).unwrap();
        let b = factory().rectangle(Vec2::new(0.5, 2.0), 2.0, 2.0, 0.0).unwrap();
        let points = polygon_contacts(&a.world_vertices(), &b.world_vertices());
        assert_eq!(points.len(), 2);
        for p in &points {
            assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_corner_on_face_gives_one_point() {
        let floor = factory().rectangle(Vec2::new(0.0, 0.0), 10.0, 2.0, 0.0).unwrap();
        let diamond = factory()
            .rectangle(Vec2::new(0.0, 1.0 + 2f32.sqrt() * 0.5), 1.0, 1.0, std::f32::consts::FRAC_PI_4)
            .unwrap();
        let points = polygon_contacts(&floor.world_vertices(), &diamond.world_vertices());
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(points[0].y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_polygon_contacts_never_exceed_two() {
        // Identical squares put every vertex on an edge
        let a = factory().rectangle(Vec2::new(0.0, 0.0), 2.0, 2.0, 0.0).unwrap();
        let b = factory().rectangle(Vec2::new(0.0, 0.0), 2.0, 2.0, 0.0).unwrap();
        assert!(polygon_contacts(&a.world_vertices(), &b.world_vertices()).len() <= 2);
    }

    #[test]
    fn test_distant_polygons_have_no_contacts() {
        let a = factory().rectangle(Vec2::new(0.0, 0.0), 2.0, 2.0, 0.0).unwrap();
        let b = factory().rectangle(Vec2::new(0.0, 2.5), 2.0, 2.0, 0.0).unwrap();
        assert!(polygon_contacts(&a.world_vertices(), &b.world_vertices()).is_empty());
    }

    #[test]
    fn test_concave_contacts_come_from_touching_pieces() {
        let l = factory()
            .polygon(
                &[
                    Vec2::new(0.0, 0.0),
                    Vec2::new(4.0, 0.0),
                    Vec2::new(4.0, 2.0),
                    Vec2::new(2.0, 2.0),
                    Vec2::new(2.0, 4.0),
                    Vec2::new(0.0, 4.0),
                ],
                0.0,
            )
            .unwrap();
        // Resting on the top of the bottom arm
        let block = factory().rectangle(Vec2::new(3.0, 2.5), 1.0, 1.0, 0.0).unwrap();
        let info = CollisionInfo::new(l.id(), Some(block.id()), Vec2::UP, 0.0);
        let points = find_contact_points(&l, &block, &info);
        assert_eq!(points.len(), 2);
        for p in &points {
            assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_seam_points_are_dropped() {
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let below = [
            Vec2::new(0.5, -1.0),
            Vec2::new(1.5, -1.0),
            Vec2::new(1.5, 0.0),
            Vec2::new(0.5, 0.0),
        ];
        // (1.0, 0.5) lies inside the L, away from its outline
        let mut points: ContactPoints = [Vec2::new(0.5, 0.0), Vec2::new(1.0, 0.5), Vec2::new(1.5, 0.0)]
            .into_iter()
            .collect();
        retain_on_outlines(&mut points, &outline, &below);
        assert_eq!(points.as_slice(), &[Vec2::new(0.5, 0.0), Vec2::new(1.5, 0.0)]);

        let mut stray: ContactPoints = [Vec2::new(1.0, 0.5)].into_iter().collect();
        retain_on_outlines(&mut stray, &outline, &below);
        assert_eq!(stray.len(), 1);
    }

    #[test]
    fn test_border_contacts_for_box_on_floor() {
        let border = Border::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        let floor = border.edge_with_normal(Vec2::new(0.0, -1.0)).unwrap();
        let block = factory().rectangle(Vec2::new(50.0, 1.0), 4.0, 2.0, 0.0).unwrap();
        let points = border_contact_points(&block, floor);
        assert_eq!(points.len(), 2);
        for p in &points {
            assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        }

        let ball = factory().circle(Vec2::new(10.0, 1.0), 1.0).unwrap();
        let points = border_contact_points(&ball, floor);
        assert_eq!(points.as_slice(), &[Vec2::new(10.0, 0.0)]);
    }
}
