//! Per-field-point weights for the face and edge dyads.
//!
//! The face factor is the signed solid angle subtended by a triangle
//! (Van Oosterom–Strackee form); the edge factor is the logarithmic
//! potential of a uniform wire along the edge. Both are evaluated per
//! element with no unwrapping across faces: summed over a closed surface
//! the solid angles give 4π inside and 0 outside.
//!
//! A field point on the surface makes these terms singular. Instead of
//! failing, the edge logarithm is clamped and the offending terms are
//! counted so callers can treat the result as low confidence.

use nalgebra::{Point3, Vector3};

use crate::geometry::{EdgeGeometry, FaceGeometry, MeshGeometry};

/// Relative distance below which a field point counts as lying on an edge,
/// vertex or face.
pub const BOUNDARY_TOLERANCE: f64 = 1e-10;

/// A face or edge weight, with whether it had to be regularized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub value: f64,
    pub singular: bool,
}

/// Signed solid angle of the triangle (r1, r2, r3), given as vertex
/// positions relative to the field point.
///
/// Positive when the field point is on the inner side of a counter-clockwise
/// face. Flagged singular when the point lies inside the triangle or on its
/// boundary, where the value jumps by 4π.
pub fn face_factor(r1: &Vector3<f64>, r2: &Vector3<f64>, r3: &Vector3<f64>) -> Factor {
    let (a, b, c) = (r1.norm(), r2.norm(), r3.norm());
    let numerator = r1.dot(&r2.cross(r3));
    let denominator = a * b * c + a * r2.dot(r3) + b * r1.dot(r3) + c * r1.dot(r2);

    let scale = BOUNDARY_TOLERANCE * a * b * c;
    let singular = numerator.abs() <= scale && denominator <= scale;

    Factor {
        value: 2.0 * numerator.atan2(denominator),
        singular,
    }
}

/// Edge logarithm `ln((R_p + R_q + e) / (R_p + R_q - e))` for an edge of
/// length `length` whose endpoints sit at `rp`, `rq` relative to the field point.
///
/// On the edge (or at a vertex) the denominator vanishes; it is clamped to
/// `BOUNDARY_TOLERANCE * length` and the factor is flagged singular.
pub fn edge_factor(rp: &Vector3<f64>, rq: &Vector3<f64>, length: f64) -> Factor {
    let sum = rp.norm() + rq.norm();
    let floor = BOUNDARY_TOLERANCE * length;
    let denominator = sum - length;

    if denominator > floor {
        Factor {
            value: ((sum + length) / denominator).ln(),
            singular: false,
        }
    } else {
        Factor {
            value: ((sum + length) / floor).ln(),
            singular: true,
        }
    }
}

/// Face factor of `face` seen from `point`.
#[inline]
pub fn face_factor_at(
    geometry: &MeshGeometry,
    face: &FaceGeometry,
    point: &Point3<f64>,
) -> Factor {
    let [a, b, c] = face.vertices;
    face_factor(
        &(geometry.vertex(a) - point),
        &(geometry.vertex(b) - point),
        &(geometry.vertex(c) - point),
    )
}

/// Edge factor of `edge` seen from `point`.
#[inline]
pub fn edge_factor_at(
    geometry: &MeshGeometry,
    edge: &EdgeGeometry,
    point: &Point3<f64>,
) -> Factor {
    let (p, q) = edge.vertices;
    edge_factor(
        &(geometry.vertex(p) - point),
        &(geometry.vertex(q) - point),
        edge.length,
    )
}

/// All face and edge factors for one field point.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularityFactors {
    /// Face factor per face id.
    pub faces: Vec<f64>,
    /// Edge factor per edge id.
    pub edges: Vec<f64>,
    /// Number of face terms flagged singular.
    pub singular_faces: usize,
    /// Number of edge terms flagged singular.
    pub singular_edges: usize,
}

impl SingularityFactors {
    /// Evaluate every face and edge factor at `point`.
    pub fn compute(geometry: &MeshGeometry, point: &Point3<f64>) -> Self {
        let mut singular_faces = 0;
        let faces = geometry
            .faces()
            .iter()
            .map(|face| {
                let f = face_factor_at(geometry, face, point);
                singular_faces += usize::from(f.singular);
                f.value
            })
            .collect();

        let mut singular_edges = 0;
        let edges = geometry
            .edges()
            .iter()
            .map(|edge| {
                let f = edge_factor_at(geometry, edge, point);
                singular_edges += usize::from(f.singular);
                f.value
            })
            .collect();

        Self {
            faces,
            edges,
            singular_faces,
            singular_edges,
        }
    }

    /// Total solid angle: 4π inside a closed body, 0 outside.
    pub fn solid_angle(&self) -> f64 {
        self.faces.iter().sum()
    }

    /// Whether any term had to be regularized.
    pub fn is_singular(&self) -> bool {
        self.singular_faces > 0 || self.singular_edges > 0
    }
}

impl MeshGeometry {
    /// Winding-number inside test for a point off the surface.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let total: f64 = self
            .faces()
            .iter()
            .map(|face| face_factor_at(self, face, point).value)
            .sum();
        total > 2.0 * std::f64::consts::PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use std::f64::consts::PI;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_octant_solid_angle() {
        // Triangle spanning the three unit axes subtends one octant (4π / 8)
        // seen from the origin.
        let f = face_factor(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
            &Vector3::new(0.0, 0.0, 1.0),
        );
        assert!(approx_eq(f.value, PI / 2.0, 1e-12));
        assert!(!f.singular);

        let reversed = face_factor(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 1.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert!(approx_eq(reversed.value, -PI / 2.0, 1e-12));
    }

    #[test]
    fn test_coplanar_outside_vanishes() {
        let f = face_factor(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(2.0, 0.0, 0.0),
            &Vector3::new(1.0, 1.0, 0.0),
        );
        assert!(f.value.abs() < 1e-15);
        assert!(!f.singular);
    }

    #[test]
    fn test_coplanar_inside_is_singular() {
        let f = face_factor(
            &Vector3::new(-1.0, -1.0, 0.0),
            &Vector3::new(1.0, -1.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert!(f.singular);
        assert!(f.value.is_finite());
    }

    #[test]
    fn test_face_factor_at_vertex_is_finite() {
        let f = face_factor(
            &Vector3::zeros(),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert!(f.singular);
        assert_eq!(f.value, 0.0);
    }

    #[test]
    fn test_edge_factor_broadside() {
        // Point at unit distance from the midpoint of an edge of length 2.
        let rp = Vector3::new(-1.0, 1.0, 0.0);
        let rq = Vector3::new(1.0, 1.0, 0.0);
        let f = edge_factor(&rp, &rq, 2.0);
        let s = 2.0 * 2f64.sqrt();
        assert!(approx_eq(f.value, ((s + 2.0) / (s - 2.0)).ln(), 1e-12));
        assert!(!f.singular);
    }

    #[test]
    fn test_edge_factor_on_edge_is_clamped() {
        let rp = Vector3::new(-0.5, 0.0, 0.0);
        let rq = Vector3::new(1.5, 0.0, 0.0);
        let f = edge_factor(&rp, &rq, 2.0);
        assert!(f.singular);
        assert!(f.value.is_finite());
        assert!(f.value > 20.0);
    }

    #[test]
    fn test_edge_factor_beyond_segment_is_regular() {
        // On the edge's line but outside the segment.
        let rp = Vector3::new(1.0, 0.0, 0.0);
        let rq = Vector3::new(3.0, 0.0, 0.0);
        let f = edge_factor(&rp, &rq, 2.0);
        assert!(!f.singular);
        assert!(approx_eq(f.value, (6.0f64 / 2.0).ln(), 1e-12));
    }

    #[test]
    fn test_solid_angle_sums_closed_surface() {
        let mesh = primitives::ellipsoid([2.0, 1.0, 0.5], 2);
        let geom = crate::MeshGeometry::from_mesh(&mesh).unwrap();

        let inside = SingularityFactors::compute(&geom, &Point3::new(0.3, -0.2, 0.1));
        assert!(approx_eq(inside.solid_angle(), 4.0 * PI, 1e-10));
        assert!(!inside.is_singular());

        let outside = SingularityFactors::compute(&geom, &Point3::new(3.0, 1.0, -2.0));
        assert!(approx_eq(outside.solid_angle(), 0.0, 1e-10));
        assert_eq!(outside.faces.len(), geom.face_count());
        assert_eq!(outside.edges.len(), geom.edge_count());
    }

    #[test]
    fn test_solid_angle_in_face_plane() {
        // Points in the plane of a cube face but outside the cube: each
        // coplanar face contributes exactly zero and the sum stays at 0.
        let geom = crate::MeshGeometry::from_mesh(&primitives::cube(1.0)).unwrap();
        let factors = SingularityFactors::compute(&geom, &Point3::new(2.5, 0.3, 1.0));
        assert!(approx_eq(factors.solid_angle(), 0.0, 1e-12));
        assert!(!factors.is_singular());
    }

    #[test]
    fn test_contains() {
        let geom = crate::MeshGeometry::from_mesh(&primitives::cube(1.0)).unwrap();
        assert!(geom.contains(&Point3::new(0.9, -0.9, 0.5)));
        assert!(!geom.contains(&Point3::new(1.1, 0.0, 0.0)));
    }
}
