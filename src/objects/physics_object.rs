use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::common::error::{PhysicsError, Result};
use crate::common::Material;
use crate::math::{BoundingBox, Projection, Transform, Vec2};
use crate::objects::sub_polygon::SubPolygon;
use crate::shapes::polygon::edge_normals;
use crate::shapes::Shape;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Process-wide unique identity of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulated body: a shape plus its pose, motion and mass properties.
///
/// `position` is the world-space centroid. Polygon vertices are stored relative
/// to it, so the shape rotates about its center of mass.
#[derive(Debug)]
pub struct PhysicsObject {
    id: ObjectId,
    pub shape: Shape,

    // Primary state
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub angle: f32, // Radians
    pub angular_velocity: f32,

    // Physical properties
    mass: f32,
    inv_mass: f32, // 0.0 for static
    inertia: f32,
    inv_inertia: f32, // 0.0 for static
    material: Material,
    is_static: bool,

    bounding_box: BoundingBox,
    /// Tick in which the body was last integrated.
    pub(crate) last_update: u64,
}

impl PhysicsObject {
    /// Creates a dynamic body at `position` with unit density (mass equals area).
    pub fn new(shape: Shape, position: Vec2, angle: f32) -> Self {
        let mass = shape.area();
        let inertia = shape.inertia(mass);
        let mut object = PhysicsObject {
            id: ObjectId::next(),
            shape,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            angle,
            angular_velocity: 0.0,
            mass,
            inv_mass: invert(mass),
            inertia,
            inv_inertia: invert(inertia),
            material: Material::default(),
            is_static: false,
            bounding_box: BoundingBox::default(),
            last_update: 0,
        };
        object.update_bounding_box();
        object
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Sets the mass and recomputes the moment of inertia from the shape.
    pub fn set_mass(&mut self, mass: f32) -> Result<()> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(PhysicsError::InvalidGeometry {
                reason: format!("mass must be positive and finite, got {mass}"),
            });
        }
        self.mass = mass;
        self.inertia = self.shape.inertia(mass);
        if !self.is_static {
            self.inv_mass = invert(self.mass);
            self.inv_inertia = invert(self.inertia);
        }
        Ok(())
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Mutable access for the clamping setters of [`Material`].
    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Static bodies keep colliding but absorb no impulse and never move.
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.acceleration = Vec2::ZERO;
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
        } else {
            self.inv_mass = invert(self.mass);
            self.inv_inertia = invert(self.inertia);
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.angle)
    }

    /// Circle radius, `None` for polygonal shapes.
    pub fn radius(&self) -> Option<f32> {
        match &self.shape {
            Shape::Circle(c) => Some(c.radius),
            _ => None,
        }
    }

    /// World-space outline. Empty for circles.
    pub fn world_vertices(&self) -> Vec<Vec2> {
        match self.shape.local_vertices() {
            Some(local) => self.transform().apply_all(local),
            None => Vec::new(),
        }
    }

    /// Outward normals of the world-space outline.
    pub fn world_edge_normals(&self) -> Vec<Vec2> {
        edge_normals(&self.world_vertices())
    }

    /// Convex parts of a concave body. Empty for every other shape.
    pub fn sub_polygons(&self) -> Vec<SubPolygon<'_>> {
        match &self.shape {
            Shape::Concave(concave) => concave
                .pieces
                .iter()
                .map(|piece| SubPolygon::new(self, piece))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Recomputes the cached box from the current pose.
    pub fn update_bounding_box(&mut self) {
        self.bounding_box = match &self.shape {
            Shape::Circle(c) => BoundingBox::from_circle(self.position, c.radius),
            _ => BoundingBox::from_points(&self.world_vertices())
                .unwrap_or_else(|| BoundingBox::new(self.position.x, self.position.y, 0.0, 0.0)),
        };
    }

    /// Projects the body onto `axis`, which is expected to be normalized.
    pub fn project(&self, axis: Vec2) -> Projection {
        match &self.shape {
            Shape::Circle(c) => Projection::of_circle(self.position, c.radius, axis),
            _ => Projection::of_points(&self.world_vertices(), axis),
        }
    }

    /// Exact point containment against the shape, not just its box.
    pub fn contains(&self, point: Vec2) -> bool {
        if !self.bounding_box.contains_point(point) {
            return false;
        }
        match &self.shape {
            Shape::Circle(c) => self.position.distance_squared(point) <= c.radius * c.radius,
            Shape::Concave(_) => self
                .sub_polygons()
                .iter()
                .any(|sub| convex_contains(sub.vertices(), point)),
            _ => convex_contains(&self.world_vertices(), point),
        }
    }

    /// Applies an impulse at a world-space point, changing linear and angular velocity.
    pub fn apply_impulse(&mut self, impulse: Vec2, point: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += (point - self.position).cross(impulse) * self.inv_inertia;
    }
}

impl PartialEq for PhysicsObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PhysicsObject {}

impl Hash for PhysicsObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn invert(value: f32) -> f32 {
    if value > 0.0 && value.is_finite() {
        1.0 / value
    } else {
        0.0
    }
}

/// Point-in-convex-polygon test for a counter-clockwise outline. Edges count as inside.
pub(crate) fn convex_contains(vertices: &[Vec2], point: Vec2) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        (b - a).cross(point - a) >= 0.0
    })
}
