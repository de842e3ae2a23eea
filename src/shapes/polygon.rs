use crate::math::vec2::Vec2;

/// Represents a convex polygon shape defined by its vertices in local space.
/// Vertices are ordered counter-clockwise around the local origin, which is the centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    pub vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    /// Creates a new polygon from a vector of local vertices.
    ///
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<Vec2>) -> Self {
        if vertices.len() < 3 {
            panic!("Polygon must have at least 3 vertices.");
        }
        ConvexPolygon { vertices }
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    pub fn centroid(&self) -> Vec2 {
        polygon_centroid(&self.vertices)
    }

    /// Polar moment of inertia about the centroid at unit density.
    pub fn unit_inertia(&self) -> f32 {
        polygon_unit_inertia(&self.vertices)
    }
}

/// Signed area using the Shoelace formula. Positive for counter-clockwise order.
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    area / 2.0
}

/// Calculates the area of a simple polygon (convex or not).
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    signed_area(vertices).abs()
}

/// Calculates the centroid (center of mass for uniform density) of a simple polygon.
pub fn polygon_centroid(vertices: &[Vec2]) -> Vec2 {
    let n = vertices.len();
    if n == 0 {
        return Vec2::ZERO;
    }

    let mut centroid = Vec2::ZERO;
    let mut signed_area_sum = 0.0;
    let origin = vertices[0];

    // Fan of signed triangles from the first vertex; works for concave outlines too
    for i in 1..n.saturating_sub(1) {
        let v1 = origin;
        let v2 = vertices[i];
        let v3 = vertices[i + 1];

        let triangle_signed_area = (v2 - v1).cross(v3 - v1) / 2.0;
        signed_area_sum += triangle_signed_area;
        centroid += (v1 + v2 + v3) / 3.0 * triangle_signed_area;
    }

    if signed_area_sum.abs() < 1e-10 {
        // Degenerate (collinear) outline: fall back to the vertex average
        let sum = vertices.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
        sum / n as f32
    } else {
        centroid / signed_area_sum
    }
}

/// Moment of inertia about the origin (0,0) at unit density.
fn inertia_about_origin(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut inertia_sum = 0.0;
    for i in 0..n {
        let v1 = vertices[i];
        let v2 = vertices[(i + 1) % n];
        inertia_sum += v1.cross(v2) * (v1.magnitude_squared() + v1.dot(v2) + v2.magnitude_squared());
    }
    (inertia_sum / 12.0).abs()
}

/// Polar moment of inertia about the centroid at unit density (mass == area).
pub fn polygon_unit_inertia(vertices: &[Vec2]) -> f32 {
    let area = polygon_area(vertices);
    if area < 1e-10 {
        return 0.0;
    }
    let centroid = polygon_centroid(vertices);
    // Parallel axis theorem
    (inertia_about_origin(vertices) - area * centroid.magnitude_squared()).max(0.0)
}

/// Returns the outward-facing unit normal of every edge.
/// Assumes vertices are ordered counter-clockwise.
pub fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let edge = vertices[(i + 1) % n] - vertices[i];
            // Clockwise perpendicular points outwards for CCW winding
            Vec2::new(edge.y, -edge.x).normalize()
        })
        .collect()
}
