//! Arc wall geometry
//!
//! An arc wall is a ring segment centred on the local +X axis:
//! - radius: outer edge distance from the arc centre
//! - thickness: radial extent inward (inner edge = radius - thickness)
//! - angle: sweep in degrees, spanning [-angle/2, +angle/2]
//! - subdivisions: number of uniform angular steps along each edge
//!
//! The outline is the outer edge swept one way followed by the inner edge
//! swept back, which closes the ring without extra points.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::triangulate::{ear_clip, ensure_ccw, remove_duplicates};
use crate::consts::{MAX_SUBDIVISIONS, MIN_SUBDIVISIONS};
use crate::polar_to_cartesian;

/// Why an arc could not be turned into a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    NonPositiveRadius(f32),
    InvalidThickness { thickness: f32, radius: f32 },
    InvalidAngle(f32),
    TooFewSubdivisions(u32),
    /// Fewer than three unique points survived cleaning
    TooFewPoints(usize),
    IndexOutOfRange { index: u32, len: usize },
    NoTriangles,
    /// Ear clipping stopped before covering the whole outline
    PartialTriangulation { triangles: usize, expected: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NonPositiveRadius(r) => write!(f, "radius must be positive (got {r})"),
            GeometryError::InvalidThickness { thickness, radius } => write!(
                f,
                "thickness must be in (0, radius] (got {thickness} for radius {radius})"
            ),
            GeometryError::InvalidAngle(a) => write!(f, "angle must be in (0, 360] degrees (got {a})"),
            GeometryError::TooFewSubdivisions(n) => {
                write!(f, "need at least {MIN_SUBDIVISIONS} subdivisions (got {n})")
            }
            GeometryError::TooFewPoints(n) => write!(f, "only {n} unique outline points"),
            GeometryError::IndexOutOfRange { index, len } => {
                write!(f, "triangle index {index} out of range for {len} vertices")
            }
            GeometryError::NoTriangles => write!(f, "triangulation produced no triangles"),
            GeometryError::PartialTriangulation {
                triangles,
                expected,
            } => write!(f, "triangulation stopped at {triangles} of {expected} triangles"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Shape parameters of an arc wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcParams {
    /// Outer radius
    pub radius: f32,
    /// Radial thickness (extends inward from the outer radius)
    pub thickness: f32,
    /// Sweep angle in degrees, centred on 0°
    pub angle: f32,
    /// Angular steps along each edge
    pub subdivisions: u32,
}

impl ArcParams {
    pub fn new(radius: f32, thickness: f32, angle: f32, subdivisions: u32) -> Self {
        Self {
            radius,
            thickness,
            angle,
            subdivisions,
        }
    }

    /// Inner radius of the arc band
    #[inline]
    pub fn inner_radius(&self) -> f32 {
        self.radius - self.thickness
    }

    /// First sample angle (degrees)
    #[inline]
    pub fn start_angle(&self) -> f32 {
        -self.angle * 0.5
    }

    /// Angle between neighbouring samples (degrees)
    #[inline]
    pub fn angle_step(&self) -> f32 {
        self.angle / self.subdivisions as f32
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius(self.radius));
        }
        if !(self.thickness > 0.0 && self.thickness <= self.radius) {
            return Err(GeometryError::InvalidThickness {
                thickness: self.thickness,
                radius: self.radius,
            });
        }
        if !(self.angle > 0.0 && self.angle <= 360.0) {
            return Err(GeometryError::InvalidAngle(self.angle));
        }
        if self.subdivisions < MIN_SUBDIVISIONS {
            return Err(GeometryError::TooFewSubdivisions(self.subdivisions));
        }
        Ok(())
    }

    fn sample(&self, radius: f32) -> impl Iterator<Item = Vec2> + '_ {
        let start = self.start_angle();
        let step = self.angle_step();
        (0..=self.subdivisions)
            .map(move |i| polar_to_cartesian(radius, (start + step * i as f32).to_radians()))
    }
}

/// Subdivision count for a sweep, scaled by a smoothness multiplier.
///
/// `ceil(angle / 360 * smoothness)`, kept within [3, 64].
pub fn subdivisions_for(angle: f32, smoothness: u32) -> u32 {
    let raw = (angle / 360.0 * smoothness as f32).ceil();
    // Negative / NaN saturate to 0 and get clamped up
    (raw as u32).clamp(MIN_SUBDIVISIONS, MAX_SUBDIVISIONS)
}

/// `subdivisions + 1` points along the outer edge, from -angle/2 to +angle/2
pub fn sample_outer_arc(params: &ArcParams) -> Vec<Vec2> {
    params.sample(params.radius).collect()
}

/// `subdivisions + 1` points along the inner edge, from +angle/2 back to -angle/2
pub fn sample_inner_arc(params: &ArcParams) -> Vec<Vec2> {
    let mut inner: Vec<Vec2> = params.sample(params.inner_radius()).collect();
    inner.reverse();
    inner
}

/// Closed, cleaned, counter-clockwise outline of the arc.
///
/// A full 360° sweep ends where it starts on both edges; those repeats are
/// dropped, leaving a ring with a hairline gap at the seam.
pub fn arc_outline(params: &ArcParams) -> Vec<Vec2> {
    let mut ring = sample_outer_arc(params);
    ring.extend(sample_inner_arc(params));
    let mut ring = remove_duplicates(&ring);
    ensure_ccw(&mut ring);
    ring
}

/// Triangulated arc. The vertex ring doubles as the collision polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcMesh {
    pub vertices: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl ArcMesh {
    /// Ordered outline for physics registration
    pub fn collider(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the outline and triangle list for an arc.
///
/// Fails instead of producing an unusable mesh: callers are expected to drop
/// the render mesh and collider on error.
pub fn build_arc_mesh(params: &ArcParams) -> Result<ArcMesh, GeometryError> {
    params.validate()?;

    let vertices = arc_outline(params);
    if vertices.len() < 3 {
        return Err(GeometryError::TooFewPoints(vertices.len()));
    }

    let indices = ear_clip(&vertices);
    if indices.len() < 3 {
        return Err(GeometryError::NoTriangles);
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(GeometryError::IndexOutOfRange {
            index,
            len: vertices.len(),
        });
    }
    let expected = vertices.len() - 2;
    if indices.len() / 3 != expected {
        return Err(GeometryError::PartialTriangulation {
            triangles: indices.len() / 3,
            expected,
        });
    }

    Ok(ArcMesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::triangulate::{signed_area, triangle_area_sum};

    fn reference() -> ArcParams {
        ArcParams::new(2.0, 0.5, 90.0, 16)
    }

    fn angle_deg(p: Vec2) -> f32 {
        p.y.atan2(p.x).to_degrees()
    }

    #[test]
    fn test_outer_arc_endpoints() {
        let outer = sample_outer_arc(&reference());
        assert_eq!(outer.len(), 17);
        let first = outer[0];
        let last = outer[16];
        assert!((angle_deg(first) + 45.0).abs() < 1e-3);
        assert!((angle_deg(last) - 45.0).abs() < 1e-3);
        assert!(outer.iter().all(|p| (p.length() - 2.0).abs() < 1e-5));
    }

    #[test]
    fn test_inner_arc_reversed_at_inner_radius() {
        let inner = sample_inner_arc(&reference());
        assert_eq!(inner.len(), 17);
        assert!(inner.iter().all(|p| (p.length() - 1.5).abs() < 1e-5));
        assert!((angle_deg(inner[0]) - 45.0).abs() < 1e-3);
        assert!((angle_deg(inner[16]) + 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_uniform_angular_steps() {
        let outer = sample_outer_arc(&reference());
        for pair in outer.windows(2) {
            let step = angle_deg(pair[1]) - angle_deg(pair[0]);
            assert!((step - 90.0 / 16.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_outline_is_ccw() {
        let ring = arc_outline(&reference());
        assert_eq!(ring.len(), 34);
        assert!(signed_area(&ring) > 0.0);
    }

    #[test]
    fn test_mesh_area_matches_band() {
        let params = reference();
        let mesh = build_arc_mesh(&params).expect("reference arc should build");
        assert_eq!(mesh.triangle_count(), mesh.vertices.len() - 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));

        let polygon = signed_area(&mesh.vertices);
        let triangles = triangle_area_sum(&mesh.vertices, &mesh.indices);
        assert!((polygon - triangles).abs() < 1e-4);

        // Chord polygon is slightly smaller than the true band
        let band = std::f32::consts::FRAC_PI_4 * (2.0f32.powi(2) - 1.5f32.powi(2));
        assert!(polygon < band && polygon > band * 0.98);
    }

    #[test]
    fn test_rebuild_is_bit_identical() {
        let a = build_arc_mesh(&reference()).unwrap();
        let b = build_arc_mesh(&reference()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_thickness_collapses_inner_arc() {
        // Inner radius 0: inner samples all merge into the centre point
        let params = ArcParams::new(1.0, 1.0, 90.0, 8);
        let mesh = build_arc_mesh(&params).unwrap();
        assert_eq!(mesh.vertices.len(), 10);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn test_full_circle_triangulates_completely() {
        for (radius, thickness) in [(2.0, 0.5), (100.0, 0.1), (1.0, 1.0), (5.0, 4.9)] {
            for subdivisions in [3, 4, 16, 31, 64] {
                let params = ArcParams::new(radius, thickness, 360.0, subdivisions);
                let mesh = build_arc_mesh(&params).unwrap_or_else(|err| {
                    panic!("r={radius} t={thickness} n={subdivisions}: {err}")
                });
                assert_eq!(mesh.triangle_count(), mesh.vertices.len() - 2);
                assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
            }
        }

        // Seam repeats are gone: n outer + n inner points
        let mesh = build_arc_mesh(&ArcParams::new(2.0, 0.5, 360.0, 16)).unwrap();
        assert_eq!(mesh.vertices.len(), 32);
        assert_eq!(mesh.triangle_count(), 30);
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert_eq!(
            build_arc_mesh(&ArcParams::new(0.0, 0.5, 90.0, 16)),
            Err(GeometryError::NonPositiveRadius(0.0))
        );
        assert!(matches!(
            build_arc_mesh(&ArcParams::new(1.0, 2.0, 90.0, 16)),
            Err(GeometryError::InvalidThickness { .. })
        ));
        assert_eq!(
            build_arc_mesh(&ArcParams::new(1.0, 0.5, 400.0, 16)),
            Err(GeometryError::InvalidAngle(400.0))
        );
        assert_eq!(
            build_arc_mesh(&ArcParams::new(1.0, 0.5, 90.0, 2)),
            Err(GeometryError::TooFewSubdivisions(2))
        );
    }

    #[test]
    fn test_tiny_arc_is_degenerate() {
        // Everything lies within 1e-3 of the first point
        let params = ArcParams::new(0.0004, 0.0002, 10.0, 3);
        assert_eq!(build_arc_mesh(&params), Err(GeometryError::TooFewPoints(1)));
    }

    #[test]
    fn test_subdivisions_for() {
        assert_eq!(subdivisions_for(90.0, 16), 4);
        assert_eq!(subdivisions_for(10.0, 16), 3);
        assert_eq!(subdivisions_for(359.0, 64), 64);
        assert_eq!(subdivisions_for(180.0, 64), 32);
        assert_eq!(subdivisions_for(-5.0, 16), 3);
    }
}
