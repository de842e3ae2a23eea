use crate::math::vec2::Vec2;
use crate::shapes::polygon::{polygon_area, polygon_centroid, polygon_unit_inertia};

/// One convex part of a concave polygon, stored as indices into the parent's vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPiece {
    pub indices: Vec<usize>,
    /// Centroid of the piece in the parent's local space.
    pub offset: Vec2,
}

/// A concave polygon with its convex decomposition.
/// Vertices are local, counter-clockwise, centered on the outline's centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcavePolygon {
    pub vertices: Vec<Vec2>,
    pub pieces: Vec<ConvexPiece>,
}

impl ConcavePolygon {
    /// Builds the polygon from local vertices and the index lists of its convex parts.
    ///
    /// Panics if fewer than 3 vertices are provided or a piece index is out of range.
    pub fn new(vertices: Vec<Vec2>, pieces: Vec<Vec<usize>>) -> Self {
        if vertices.len() < 3 {
            panic!("Polygon must have at least 3 vertices.");
        }
        let pieces = pieces
            .into_iter()
            .map(|indices| {
                let outline: Vec<Vec2> = indices.iter().map(|&i| vertices[i]).collect();
                ConvexPiece {
                    offset: polygon_centroid(&outline),
                    indices,
                }
            })
            .collect();
        ConcavePolygon { vertices, pieces }
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    pub fn unit_inertia(&self) -> f32 {
        polygon_unit_inertia(&self.vertices)
    }

    /// Local-space outline of one piece.
    pub fn piece_vertices(&self, piece: &ConvexPiece) -> Vec<Vec2> {
        piece.indices.iter().map(|&i| self.vertices[i]).collect()
    }
}
