//! Constructors for bodies, explicit or randomized.

use std::f32::consts::TAU;

use rand::Rng;

use crate::common::error::{PhysicsError, Result};
use crate::common::Material;
use crate::math::{BoundingBox, Vec2};
use crate::objects::PhysicsObject;
use crate::shapes::decomposition::{decompose, ensure_ccw, is_concave, validate_outline};
use crate::shapes::polygon::polygon_centroid;
use crate::shapes::{Circle, ConcavePolygon, ConvexPolygon, Rectangle, Shape};

/// Builds bodies with a shared starting material.
#[derive(Debug, Clone, Default)]
pub struct ObjectFactory {
    pub material: Material,
}

impl ObjectFactory {
    pub fn new(material: Material) -> Self {
        ObjectFactory { material }
    }

    pub fn circle(&self, position: Vec2, radius: f32) -> Result<PhysicsObject> {
        check_dimension("radius", radius)?;
        Ok(self.finish(PhysicsObject::new(
            Shape::Circle(Circle::new(radius)),
            position,
            0.0,
        )))
    }

    pub fn rectangle(&self, position: Vec2, width: f32, height: f32, angle: f32) -> Result<PhysicsObject> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        Ok(self.finish(PhysicsObject::new(
            Shape::Rectangle(Rectangle::new(width, height)),
            position,
            angle,
        )))
    }

    /// Creates a polygon from world-space vertices in either winding order.
    /// Concave outlines are decomposed into convex pieces.
    pub fn polygon(&self, vertices: &[Vec2], angle: f32) -> Result<PhysicsObject> {
        validate_outline(vertices)?;

        let mut outline = vertices.to_vec();
        ensure_ccw(&mut outline);
        let centroid = polygon_centroid(&outline);
        let local: Vec<Vec2> = outline.iter().map(|&v| v - centroid).collect();

        let shape = if is_concave(&local) {
            let pieces = decompose(&local);
            Shape::Concave(ConcavePolygon::new(local, pieces))
        } else {
            Shape::Polygon(ConvexPolygon::new(local))
        };
        Ok(self.finish(PhysicsObject::new(shape, centroid, angle)))
    }

    /// Circle with a random radius in `[min_radius, max_radius]` fully inside `area`.
    pub fn random_circle<R: Rng>(
        &self,
        rng: &mut R,
        area: &BoundingBox,
        min_radius: f32,
        max_radius: f32,
    ) -> Result<PhysicsObject> {
        let radius = random_in(rng, min_radius, max_radius);
        let position = random_point(rng, area, radius);
        self.circle(position, radius)
    }

    pub fn random_rectangle<R: Rng>(
        &self,
        rng: &mut R,
        area: &BoundingBox,
        min_side: f32,
        max_side: f32,
    ) -> Result<PhysicsObject> {
        let width = random_in(rng, min_side, max_side);
        let height = random_in(rng, min_side, max_side);
        let margin = 0.5 * (width * width + height * height).sqrt();
        let position = random_point(rng, area, margin);
        self.rectangle(position, width, height, rng.gen_range(0.0..TAU))
    }

    /// Star-shaped polygon with 3 to 8 corners jittered around a circle.
    /// Uneven corner distances can make it concave.
    pub fn random_polygon<R: Rng>(&self, rng: &mut R, area: &BoundingBox, radius: f32) -> Result<PhysicsObject> {
        check_dimension("radius", radius)?;
        let corners: usize = rng.gen_range(3..=8);
        let center = random_point(rng, area, radius);
        let step = TAU / corners as f32;
        let vertices: Vec<Vec2> = (0..corners)
            .map(|i| {
                // Jitter stays inside the slice so the outline cannot fold over
                let angle = step * (i as f32 + rng.gen_range(0.1..0.9));
                let distance = radius * rng.gen_range(0.6..=1.0);
                center + Vec2::new(angle.cos(), angle.sin()) * distance
            })
            .collect();
        self.polygon(&vertices, 0.0)
    }

    fn finish(&self, mut object: PhysicsObject) -> PhysicsObject {
        object.set_material(self.material);
        object
    }
}

fn check_dimension(name: &str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::InvalidGeometry {
            reason: format!("{name} must be a non-negative number, got {value}"),
        })
    }
}

fn random_in<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

// Keeps `margin` distance from every side where the area allows it
fn random_point<R: Rng>(rng: &mut R, area: &BoundingBox, margin: f32) -> Vec2 {
    let min = area.min() + Vec2::new(margin, margin);
    let max = area.max() - Vec2::new(margin, margin);
    Vec2::new(
        random_in(rng, min.x, max.x.max(min.x)),
        random_in(rng, min.y, max.y.max(min.y)),
    )
}
