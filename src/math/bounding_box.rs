// Axis-aligned bounding box stored as lower-left corner plus extents

use serde::{Deserialize, Serialize};

use crate::math::vec2::Vec2;

/// An axis-aligned box defined by its lower-left corner and its size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Creates a new box. Negative extents are clamped to zero.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        BoundingBox {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Creates a box spanning two corner points in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        BoundingBox::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Creates a box that encompasses a set of points.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min_pt = *first;
        let mut max_pt = *first;
        for point in rest {
            min_pt = min_pt.min(*point);
            max_pt = max_pt.max(*point);
        }
        Some(BoundingBox::from_corners(min_pt, max_pt))
    }

    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        BoundingBox::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Checks if this box overlaps with another box. Touching edges count as overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x <= other.x + other.width
            && self.x + self.width >= other.x
            && self.y <= other.y + other.height
            && self.y + self.height >= other.y
    }

    /// Checks if the point lies inside the box or on its edge.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Checks if `other` lies completely inside this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Merges another box into this one, expanding this box to contain both.
    pub fn merge(&mut self, other: &BoundingBox) {
        let min = self.min().min(other.min());
        let max = self.max().max(other.max());
        *self = BoundingBox::from_corners(min, max);
    }

    /// Returns the four quadrants split at the center, ordered top-left,
    /// top-right, bottom-left, bottom-right (y grows upwards).
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let cx = self.x + hw;
        let cy = self.y + hh;
        [
            BoundingBox::new(self.x, cy, hw, hh),
            BoundingBox::new(cx, cy, hw, hh),
            BoundingBox::new(self.x, self.y, hw, hh),
            BoundingBox::new(cx, self.y, hw, hh),
        ]
    }
}
