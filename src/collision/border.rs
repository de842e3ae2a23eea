//! The world border as four one-sided edges.

use crate::collision::info::CollisionInfo;
use crate::math::{BoundingBox, Vec2};
use crate::objects::PhysicsObject;

/// One side of the border. Everything beyond the edge along `normal` is outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderEdge {
    /// Outward unit normal.
    pub normal: Vec2,
    /// Position of the edge line measured along `normal`.
    pub border_position: f32,
    /// A point on the edge line.
    pub edge_corner: Vec2,
}

impl BorderEdge {
    /// Reports how far the body reaches past this edge.
    /// The normal of a hit points out of the world, from the body to the edge.
    pub fn test_collision(&self, object: &PhysicsObject) -> CollisionInfo {
        let depth = object.project(self.normal).max - self.border_position;
        if depth > 0.0 {
            CollisionInfo::new(object.id(), None, self.normal, depth)
        } else {
            CollisionInfo::none(object.id(), None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub bounds: BoundingBox,
    /// Left, right, bottom, top.
    pub edges: [BorderEdge; 4],
}

impl Border {
    pub fn new(bounds: BoundingBox) -> Self {
        let BoundingBox { x, y, width, height } = bounds;
        let edges = [
            BorderEdge {
                normal: Vec2::new(-1.0, 0.0),
                border_position: -x,
                edge_corner: Vec2::new(x, y + height),
            },
            BorderEdge {
                normal: Vec2::new(1.0, 0.0),
                border_position: x + width,
                edge_corner: Vec2::new(x + width, y),
            },
            BorderEdge {
                normal: Vec2::new(0.0, -1.0),
                border_position: -y,
                edge_corner: Vec2::new(x, y),
            },
            BorderEdge {
                normal: Vec2::new(0.0, 1.0),
                border_position: y + height,
                edge_corner: Vec2::new(x + width, y + height),
            },
        ];
        Border { bounds, edges }
    }

    pub fn edge_with_normal(&self, normal: Vec2) -> Option<&BorderEdge> {
        self.edges.iter().find(|edge| edge.normal == normal)
    }

    /// Pushes a dynamic body back inside every edge it crosses. Velocity is untouched.
    /// Returns true if the body was moved.
    pub fn move_inside_border(&self, object: &mut PhysicsObject) -> bool {
        if object.is_static() {
            return false;
        }
        let mut moved = false;
        for edge in &self.edges {
            let info = edge.test_collision(object);
            if info.has_collision() {
                object.position -= edge.normal * info.depth;
                object.update_bounding_box();
                moved = true;
            }
        }
        moved
    }
}
