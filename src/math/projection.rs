use crate::math::vec2::Vec2;

/// The interval a shape covers when projected onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Projects a set of points onto `axis`. An empty set yields an inverted interval.
    pub fn of_points(points: &[Vec2], axis: Vec2) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for p in points {
            let d = p.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        Self { min, max }
    }

    /// Projects a circle onto `axis`. `axis` is expected to be normalized.
    pub fn of_circle(center: Vec2, radius: f32, axis: Vec2) -> Self {
        let c = center.dot(axis);
        Self {
            min: c - radius,
            max: c + radius,
        }
    }

    /// Penetration of the two intervals. Zero or negative means they are apart.
    pub fn overlap(&self, other: &Projection) -> f32 {
        (self.max - other.min).min(other.max - self.min)
    }

    /// Strict test: intervals that merely touch do not overlap.
    pub fn overlaps(&self, other: &Projection) -> bool {
        self.overlap(other) > 0.0
    }
}
