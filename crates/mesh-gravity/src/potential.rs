//! Closed-form potential of a constant-density polyhedron.
//!
//! With `r_e = p - r` for one endpoint `p` of each edge and `r_f = V1 - r`
//! for the first vertex of each face:
//!
//! ```text
//! U      =  Gσ/2 [ Σ_e r_eᵀ E_e r_e L_e - Σ_f r_fᵀ F_f r_f w_f ]
//! ∇U     = -Gσ   [ Σ_e E_e r_e L_e      - Σ_f F_f r_f w_f      ]
//! ∇∇U    =  Gσ   [ Σ_e E_e L_e          - Σ_f F_f w_f          ]
//! ∇²U    =  Gσ   [ Σ_e tr(E_e) L_e      - Σ_f tr(F_f) w_f      ]  = -Gσ Σ_f w_f
//! ```
//!
//! `U` uses the positive sign convention (`U ≈ GM/|r|` far from the body), so
//! `∇U` is the gravitational acceleration. Every edge and face contributes
//! exactly once; the two sums are independent and, with the `parallel`
//! feature, are reduced across rayon worker threads.

use std::ops::Add;

use nalgebra::{Matrix3, Point3, Vector3};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{GravityError, GravityResult};
use crate::factors::{edge_factor_at, face_factor_at};
use crate::geometry::MeshGeometry;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Gravitational constant in km³ / (kg s²).
pub const G: f64 = 6.673e-20;

/// Field point that touched the surface during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundarySingularity {
    /// Where the field was evaluated.
    pub point: Point3<f64>,
    /// Edge terms whose logarithm was clamped.
    pub edges: usize,
    /// Face terms evaluated on their own triangle.
    pub faces: usize,
}

/// Potential quantities at one field point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Potential {
    /// Scalar potential U (km²/s²).
    pub potential: f64,
    /// Gradient ∇U, the attraction (km/s²).
    pub gradient: Vector3<f64>,
    /// Gradient matrix ∇∇U (1/s²).
    pub gradient_matrix: Matrix3<f64>,
    /// Laplacian ∇²U (1/s²).
    pub laplacian: f64,
    /// Set when the point lies on an edge, vertex or face.
    pub singularity: Option<BoundarySingularity>,
}

impl Potential {
    /// Gravitational acceleration, identical to the gradient.
    #[inline]
    pub fn acceleration(&self) -> Vector3<f64> {
        self.gradient
    }

    /// Whether some terms were regularized because the point is on the surface.
    #[inline]
    pub fn is_low_confidence(&self) -> bool {
        self.singularity.is_some()
    }

    /// Reject results that required regularization.
    pub fn into_strict(self) -> GravityResult<Self> {
        match self.singularity {
            None => Ok(self),
            Some(s) => Err(GravityError::OnBoundarySingularity {
                point: s.point,
                edges: s.edges,
                faces: s.faces,
            }),
        }
    }
}

/// Running sum of one family of terms (all edges or all faces).
#[derive(Debug, Clone, Copy)]
struct Sums {
    scalar: f64,
    vector: Vector3<f64>,
    matrix: Matrix3<f64>,
    trace: f64,
    singular: usize,
}

impl Sums {
    fn zero() -> Self {
        Self {
            scalar: 0.0,
            vector: Vector3::zeros(),
            matrix: Matrix3::zeros(),
            trace: 0.0,
            singular: 0,
        }
    }

    #[inline]
    fn term(dyad: &Matrix3<f64>, r: &Vector3<f64>, factor: f64, singular: bool) -> Self {
        let dr = dyad * r;
        Self {
            scalar: r.dot(&dr) * factor,
            vector: dr * factor,
            matrix: dyad * factor,
            trace: dyad.trace() * factor,
            singular: usize::from(singular),
        }
    }
}

impl Add for Sums {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            scalar: self.scalar + rhs.scalar,
            vector: self.vector + rhs.vector,
            matrix: self.matrix + rhs.matrix,
            trace: self.trace + rhs.trace,
            singular: self.singular + rhs.singular,
        }
    }
}

#[cfg(feature = "parallel")]
fn sum_terms<T, F>(items: &[T], term: F) -> Sums
where
    T: Sync,
    F: Fn(&T) -> Sums + Sync + Send,
{
    items.par_iter().map(term).reduce(Sums::zero, Sums::add)
}

#[cfg(not(feature = "parallel"))]
fn sum_terms<T, F>(items: &[T], term: F) -> Sums
where
    F: Fn(&T) -> Sums,
{
    items.iter().map(term).fold(Sums::zero(), Sums::add)
}

#[cfg(feature = "parallel")]
fn join<A, B>(a: impl FnOnce() -> A + Send, b: impl FnOnce() -> B + Send) -> (A, B)
where
    A: Send,
    B: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B>(a: impl FnOnce() -> A, b: impl FnOnce() -> B) -> (A, B) {
    (a(), b())
}

/// Evaluate the field at `point` for a body of the given density (kg/km³),
/// using the standard gravitational constant [`G`].
pub fn evaluate(point: &Point3<f64>, geometry: &MeshGeometry, density: f64) -> Potential {
    evaluate_with_constant(point, geometry, density, G)
}

/// Evaluate the field at `point` with an explicit gravitational constant.
///
/// Never fails: a point on the surface is reported through
/// [`Potential::singularity`] after clamping the affected terms.
pub fn evaluate_with_constant(
    point: &Point3<f64>,
    geometry: &MeshGeometry,
    density: f64,
    gravitational_constant: f64,
) -> Potential {
    let (edges, faces) = join(
        || {
            sum_terms(geometry.edges(), |edge| {
                let r_e = geometry.vertex(edge.vertices.0) - point;
                let l = edge_factor_at(geometry, edge, point);
                Sums::term(&edge.dyad, &r_e, l.value, l.singular)
            })
        },
        || {
            sum_terms(geometry.faces(), |face| {
                let r_f = geometry.vertex(face.vertices[0]) - point;
                let w = face_factor_at(geometry, face, point);
                Sums::term(&face.dyad, &r_f, w.value, w.singular)
            })
        },
    );

    let g_sigma = gravitational_constant * density;
    let singularity = (edges.singular > 0 || faces.singular > 0).then(|| BoundarySingularity {
        point: *point,
        edges: edges.singular,
        faces: faces.singular,
    });

    if let Some(s) = &singularity {
        warn!(
            "Field point [{:.6}, {:.6}, {:.6}] lies on the surface: clamped {} edge and {} face terms",
            point.x, point.y, point.z, s.edges, s.faces
        );
    }

    let result = Potential {
        potential: 0.5 * g_sigma * (edges.scalar - faces.scalar),
        gradient: -g_sigma * (edges.vector - faces.vector),
        gradient_matrix: g_sigma * (edges.matrix - faces.matrix),
        laplacian: g_sigma * (edges.trace - faces.trace),
        singularity,
    };

    debug!(
        "U = {:.6e}, |∇U| = {:.6e}, ∇²U = {:.6e} at [{:.4}, {:.4}, {:.4}]",
        result.potential,
        result.gradient.norm(),
        result.laplacian,
        point.x,
        point.y,
        point.z
    );

    result
}
