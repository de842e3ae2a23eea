use crate::math::vec2::Vec2;

/// Axis-aligned (in local space) box centered on its local origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub width: f32,
    pub height: f32,
    /// Corners in counter-clockwise order, starting bottom-left.
    pub vertices: [Vec2; 4],
}

impl Rectangle {
    pub fn new(width: f32, height: f32) -> Self {
        assert!(
            width >= 0.0 && height >= 0.0,
            "Rectangle dimensions cannot be negative"
        );
        let hw = width / 2.0;
        let hh = height / 2.0;
        Rectangle {
            width,
            height,
            vertices: [
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn inertia(&self, mass: f32) -> f32 {
        mass * (self.width * self.width + self.height * self.height) / 12.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_rectangle_inertia() {
        let rect = Rectangle::new(3.0, 2.0);
        assert!((rect.inertia(2.0) - 2.1667).abs() < EPSILON);
        // Unit density: mass equals area
        assert!((rect.inertia(rect.area()) - 6.5).abs() < EPSILON);
    }

    #[test]
    fn test_rectangle_vertices_are_centered() {
        let rect = Rectangle::new(4.0, 2.0);
        assert_eq!(rect.vertices[0], Vec2::new(-2.0, -1.0));
        assert_eq!(rect.vertices[2], Vec2::new(2.0, 1.0));
    }
}
