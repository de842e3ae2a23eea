use crate::math::{BoundingBox, Projection, Vec2};
use crate::objects::physics_object::{ObjectId, PhysicsObject};
use crate::shapes::ConvexPiece;

/// Read-only view of one convex part of a concave body.
///
/// It has no pose of its own: position and vertices are derived from the
/// parent every time the view is built, so it can never drift from the body.
#[derive(Debug, Clone)]
pub struct SubPolygon<'a> {
    parent: &'a PhysicsObject,
    piece: &'a ConvexPiece,
    vertices: Vec<Vec2>,
    bounding_box: BoundingBox,
}

impl<'a> SubPolygon<'a> {
    pub(crate) fn new(parent: &'a PhysicsObject, piece: &'a ConvexPiece) -> Self {
        let transform = parent.transform();
        let local = parent.shape.local_vertices().unwrap_or(&[]);
        let vertices: Vec<Vec2> = piece
            .indices
            .iter()
            .filter_map(|&i| local.get(i))
            .map(|&v| transform.apply(v))
            .collect();
        let bounding_box = BoundingBox::from_points(&vertices).unwrap_or_default();
        SubPolygon {
            parent,
            piece,
            vertices,
            bounding_box,
        }
    }

    pub fn parent_id(&self) -> ObjectId {
        self.parent.id()
    }

    /// Parent position plus the piece offset rotated by the parent angle.
    pub fn position(&self) -> Vec2 {
        self.parent.position + self.piece.offset.rotate(self.parent.angle)
    }

    pub fn angle(&self) -> f32 {
        self.parent.angle
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        Projection::of_points(&self.vertices, axis)
    }
}
