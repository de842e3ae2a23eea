pub mod circle;
pub mod concave;
pub mod decomposition;
pub mod polygon;
pub mod rectangle;

// Re-export the specific shape types
pub use circle::Circle;
pub use concave::{ConcavePolygon, ConvexPiece};
pub use polygon::ConvexPolygon;
pub use rectangle::Rectangle;

use crate::math::vec2::Vec2;

/// Enum representing the geometric shape of a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(ConvexPolygon),
    Concave(ConcavePolygon),
}

impl Shape {
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.area(),
            Shape::Rectangle(r) => r.area(),
            Shape::Polygon(p) => p.area(),
            Shape::Concave(p) => p.area(),
        }
    }

    /// Moment of inertia about the centroid for a body of the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        match self {
            Shape::Circle(c) => c.inertia(mass),
            Shape::Rectangle(r) => r.inertia(mass),
            Shape::Polygon(p) => scale_unit_inertia(p.unit_inertia(), p.area(), mass),
            Shape::Concave(p) => scale_unit_inertia(p.unit_inertia(), p.area(), mass),
        }
    }

    /// Local outline for polygonal shapes, `None` for circles.
    pub fn local_vertices(&self) -> Option<&[Vec2]> {
        match self {
            Shape::Circle(_) => None,
            Shape::Rectangle(r) => Some(&r.vertices),
            Shape::Polygon(p) => Some(&p.vertices),
            Shape::Concave(p) => Some(&p.vertices),
        }
    }

    pub fn is_concave(&self) -> bool {
        matches!(self, Shape::Concave(_))
    }
}

// Unit-density inertia scaled to the requested mass
fn scale_unit_inertia(unit_inertia: f32, area: f32, mass: f32) -> f32 {
    if area <= 0.0 {
        0.0
    } else {
        unit_inertia * mass / area
    }
}
