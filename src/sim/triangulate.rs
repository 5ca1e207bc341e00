//! Polygon triangulation by ear clipping
//!
//! Input is a ring of points describing a simple polygon. The ring is cleaned
//! (near-duplicate neighbours merged), wound counter-clockwise, then ears are
//! clipped until one triangle remains. Malformed rings never panic: the clip
//! loop is bounded and returns whatever triangles it produced.

use glam::Vec2;

use crate::consts::DEDUP_EPSILON_SQ;

/// A cleaned ring and the triangle list indexing into it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Signed area (shoelace). Positive for counter-clockwise rings in y-up space.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut p = n - 1;
    for q in 0..n {
        area += points[p].perp_dot(points[q]);
        p = q;
    }
    area * 0.5
}

/// Edge sum `(b.x - a.x) * (b.y + a.y)` over the ring. Positive means clockwise.
pub fn winding_sum(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            (b.x - a.x) * (b.y + a.y)
        })
        .sum()
}

/// Drop points closer than `DEDUP_EPSILON_SQ` (squared) to the previously kept
/// point, including the wrap-around pair (last, first).
pub fn dedup_points(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        let duplicate = out
            .last()
            .is_some_and(|last| last.distance_squared(p) < DEDUP_EPSILON_SQ);
        if !duplicate {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) < DEDUP_EPSILON_SQ {
        out.pop();
    }
    out
}

/// Drop every point closer than `DEDUP_EPSILON_SQ` (squared) to any point
/// already kept, not just its neighbour. Keeps first occurrences in order.
///
/// Closed sweeps revisit their start point at the end of the ring; this
/// removes the repeat so the ring stays simple.
pub fn remove_duplicates(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if !out.iter().any(|kept| kept.distance_squared(p) < DEDUP_EPSILON_SQ) {
            out.push(p);
        }
    }
    out
}

/// Reverse the ring if it is wound clockwise. Returns true if it was reversed.
pub fn ensure_ccw(points: &mut [Vec2]) -> bool {
    if winding_sum(points) > 0.0 {
        points.reverse();
        true
    } else {
        false
    }
}

/// Clip ears off the ring and return triangle indices into `points`.
///
/// Accepts either winding. Each pass over the ring has a budget of twice the
/// remaining vertex count; when it runs out without finding an ear the loop
/// stops and the partial result is returned.
pub fn ear_clip(points: &[Vec2]) -> Vec<u32> {
    let n = points.len();
    let mut indices = Vec::with_capacity(n.saturating_sub(2) * 3);
    if n < 3 {
        return indices;
    }

    // Work list, always visited counter-clockwise
    let mut ring: Vec<usize> = if signed_area(points) > 0.0 {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };

    let mut budget = 2 * ring.len();
    let mut v = ring.len() - 1;
    while ring.len() > 2 {
        if budget == 0 {
            log::warn!(
                "Ear clipping gave up with {} of {} vertices left (degenerate polygon?)",
                ring.len(),
                n
            );
            break;
        }
        budget -= 1;

        let nv = ring.len();
        let u = if v >= nv { 0 } else { v };
        v = if u + 1 >= nv { 0 } else { u + 1 };
        let w = if v + 1 >= nv { 0 } else { v + 1 };

        if is_ear(points, &ring, u, v, w) {
            indices.extend([ring[u], ring[v], ring[w]].map(|i| i as u32));
            ring.remove(v);
            budget = 2 * ring.len();
        }
    }

    indices
}

fn is_ear(points: &[Vec2], ring: &[usize], u: usize, v: usize, w: usize) -> bool {
    let a = points[ring[u]];
    let b = points[ring[v]];
    let c = points[ring[w]];

    // Reflex corner
    if (b - a).perp_dot(c - a) < 0.0 {
        return false;
    }

    !ring
        .iter()
        .enumerate()
        .filter(|&(p, _)| p != u && p != v && p != w)
        .any(|(_, &idx)| point_in_triangle(a, b, c, points[idx]))
}

/// Inclusive point-in-triangle test for a counter-clockwise triangle
#[inline]
fn point_in_triangle(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    (b - a).perp_dot(p - a) >= 0.0 && (c - b).perp_dot(p - b) >= 0.0 && (a - c).perp_dot(p - c) >= 0.0
}

/// Clean, orient and triangulate a ring in one go.
///
/// Rings with fewer than three unique points come back with no triangles.
pub fn triangulate_polygon(points: &[Vec2]) -> Triangulation {
    let mut vertices = dedup_points(points);
    if vertices.len() < 3 {
        return Triangulation {
            vertices,
            indices: Vec::new(),
        };
    }
    ensure_ccw(&mut vertices);
    let indices = ear_clip(&vertices);
    Triangulation { vertices, indices }
}

/// Sum of the unsigned areas of all triangles in an index list
pub fn triangle_area_sum(vertices: &[Vec2], indices: &[u32]) -> f32 {
    indices
        .chunks_exact(3)
        .map(|tri| {
            let a = vertices[tri[0] as usize];
            let b = vertices[tri[1] as usize];
            let c = vertices[tri[2] as usize];
            ((b - a).perp_dot(c - a) * 0.5).abs()
        })
        .sum()
}
