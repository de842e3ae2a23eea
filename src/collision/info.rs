use crate::math::vec2::Vec2;
use crate::objects::ObjectId;

/// Result of a narrow-phase test between two bodies, or a body and the border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub object_a: ObjectId,
    /// `None` when the other side is a border edge.
    pub object_b: Option<ObjectId>,
    /// Unit normal pointing from A towards B.
    pub normal: Vec2,
    /// Penetration along the normal. `f32::INFINITY` means no collision.
    pub depth: f32,
}

impl CollisionInfo {
    /// Info that reports no collision between the two bodies.
    pub fn none(object_a: ObjectId, object_b: Option<ObjectId>) -> Self {
        CollisionInfo {
            object_a,
            object_b,
            normal: Vec2::ZERO,
            depth: f32::INFINITY,
        }
    }

    pub fn new(object_a: ObjectId, object_b: Option<ObjectId>, normal: Vec2, depth: f32) -> Self {
        CollisionInfo {
            object_a,
            object_b,
            normal,
            depth,
        }
    }

    pub fn has_collision(&self) -> bool {
        self.depth.is_finite()
    }
}
