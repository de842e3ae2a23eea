use crate::math::vec2::Vec2;

/// Rotation followed by translation, mapping shape-local points to world space.
/// The sine and cosine are computed once so that transforming a whole vertex list
/// costs no trigonometry per point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub angle: f32,
    sin: f32,
    cos: f32,
}

impl Transform {
    /// Creates a new transform.
    pub fn new(position: Vec2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            position,
            angle,
            sin,
            cos,
        }
    }

    /// Creates an identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }

    /// Applies the transform (rotation then translation) to a point.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        point.rotate_by(self.sin, self.cos) + self.position
    }

    /// Applies only the rotation part, for directions and offsets.
    pub fn rotate(&self, vector: Vec2) -> Vec2 {
        vector.rotate_by(self.sin, self.cos)
    }

    /// Applies the inverse transform (inverse translation then inverse rotation) to a point.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        let translated = point - self.position;
        // sin(-a) = -sin(a)
        translated.rotate_by(-self.sin, self.cos)
    }

    /// Transforms every point of a local-space vertex list.
    pub fn apply_all(&self, points: &[Vec2]) -> Vec<Vec2> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}
