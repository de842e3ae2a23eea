//! Splits a concave outline into convex pieces.
//!
//! The outline is triangulated by ear clipping, then neighbouring pieces that
//! share an edge are merged greedily for as long as the merged piece stays
//! convex. Pieces are returned as index lists into the original vertex slice,
//! each in counter-clockwise order.

use tracing::warn;

use crate::common::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;
use crate::shapes::polygon::signed_area;

// Turns flatter than this count as straight, not concave
const TURN_EPSILON: f32 = 1e-6;

/// Reverses the vertex order if the outline is clockwise.
pub fn ensure_ccw(vertices: &mut [Vec2]) {
    if signed_area(vertices) < 0.0 {
        vertices.reverse();
    }
}

/// Signed turn at `b` when walking `a -> b -> c`. Positive is a left turn.
fn turn(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

/// True if any corner of the counter-clockwise outline turns right.
pub fn is_concave(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    (0..n).any(|i| turn(vertices[i], vertices[(i + 1) % n], vertices[(i + 2) % n]) < -TURN_EPSILON)
}

/// Rejects outlines that cannot be turned into a body: fewer than 3 vertices,
/// zero area, or edges crossing each other.
pub fn validate_outline(vertices: &[Vec2]) -> Result<()> {
    if vertices.len() < 3 {
        return Err(PhysicsError::InvalidGeometry {
            reason: format!("polygon needs at least 3 vertices, got {}", vertices.len()),
        });
    }
    if signed_area(vertices).abs() < 1e-8 {
        return Err(PhysicsError::InvalidGeometry {
            reason: "polygon has zero area".to_string(),
        });
    }
    if has_crossing_edges(vertices) {
        return Err(PhysicsError::InvalidGeometry {
            reason: "polygon edges intersect each other".to_string(),
        });
    }
    Ok(())
}

fn has_crossing_edges(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            let (c, d) = (vertices[j], vertices[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

// Proper crossing only; shared endpoints of neighbouring edges do not count
fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let denominator = (b - a).cross(d - c);
    if denominator == 0.0 {
        return false;
    }
    let r = (c - a).cross(d - c) / denominator;
    let s = (c - a).cross(b - a) / denominator;
    (0.0 < r && r < 1.0) && (0.0 < s && s < 1.0)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = turn(a, b, p);
    let d2 = turn(b, c, p);
    let d3 = turn(c, a, p);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

fn is_ear(vertices: &[Vec2], remaining: &[usize], i: usize) -> bool {
    let n = remaining.len();
    let prev = remaining[(i + n - 1) % n];
    let curr = remaining[i];
    let next = remaining[(i + 1) % n];
    let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);

    if turn(a, b, c) <= TURN_EPSILON {
        return false;
    }

    remaining
        .iter()
        .filter(|&&k| k != prev && k != curr && k != next)
        .map(|&k| vertices[k])
        .filter(|&v| v != a && v != b && v != c)
        .all(|v| !point_in_triangle(v, a, b, c))
}

/// Ear-clipping triangulation of a counter-clockwise simple outline.
pub fn triangulate(vertices: &[Vec2]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..vertices.len()).collect();
    let mut triangles = Vec::with_capacity(vertices.len().saturating_sub(2));

    while remaining.len() > 3 {
        let Some(ear) = (0..remaining.len()).find(|&i| is_ear(vertices, &remaining, i)) else {
            warn!(
                remaining = remaining.len(),
                "no ear found while triangulating, outline is degenerate"
            );
            break;
        };
        let n = remaining.len();
        triangles.push([
            remaining[(ear + n - 1) % n],
            remaining[ear],
            remaining[(ear + 1) % n],
        ]);
        remaining.remove(ear);
    }

    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    triangles
}

/// Finds an edge `a -> b` of `first` that appears as `b -> a` in `second`.
/// Returns the positions of `a` in `first` and of `b` in `second`.
fn shared_edge(first: &[usize], second: &[usize]) -> Option<(usize, usize)> {
    let (n, m) = (first.len(), second.len());
    for i in 0..n {
        let (a, b) = (first[i], first[(i + 1) % n]);
        for j in 0..m {
            if second[j] == b && second[(j + 1) % m] == a {
                return Some((i, j));
            }
        }
    }
    None
}

/// Joins two pieces across their shared edge, keeping counter-clockwise order.
fn merge_pieces(first: &[usize], second: &[usize], edge: (usize, usize)) -> Vec<usize> {
    let (i, j) = edge;
    let (n, m) = (first.len(), second.len());
    let mut merged = Vec::with_capacity(n + m - 2);
    // Walk `first` from b all the way round to a
    merged.extend((1..=n).map(|k| first[(i + k) % n]));
    // Then the part of `second` strictly between a and b
    merged.extend((2..m).map(|k| second[(j + k) % m]));
    merged
}

fn is_convex_piece(vertices: &[Vec2], piece: &[usize]) -> bool {
    let outline: Vec<Vec2> = piece.iter().map(|&i| vertices[i]).collect();
    !is_concave(&outline)
}

/// Greedily merges edge-sharing pieces while the result stays convex.
pub fn merge_convex(vertices: &[Vec2], triangles: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut pieces: Vec<Vec<usize>> = triangles.iter().map(|t| t.to_vec()).collect();

    'search: loop {
        for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                let Some(edge) = shared_edge(&pieces[i], &pieces[j]) else {
                    continue;
                };
                let merged = merge_pieces(&pieces[i], &pieces[j], edge);
                if is_convex_piece(vertices, &merged) {
                    pieces[i] = merged;
                    pieces.remove(j);
                    continue 'search;
                }
            }
        }
        break;
    }

    pieces
}

/// Full decomposition of a counter-clockwise outline into convex index lists.
pub fn decompose(vertices: &[Vec2]) -> Vec<Vec<usize>> {
    let triangles = triangulate(vertices);
    merge_convex(vertices, &triangles)
}
