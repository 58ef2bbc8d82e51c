//! Error types for gravity model construction and evaluation.

use nalgebra::Point3;
use thiserror::Error;

/// Result type alias for gravity operations.
pub type GravityResult<T> = Result<T, GravityError>;

/// Errors that can occur while building or evaluating a polyhedral gravity model.
#[derive(Debug, Error)]
pub enum GravityError {
    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    EmptyMesh { details: String },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    InvalidFaceIndex {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    /// A face normal cannot be computed (collinear or repeated vertices).
    #[error("face {face} is degenerate (area {area:.3e})")]
    DegenerateFace { face: usize, area: f64 },

    /// An edge is not shared by exactly two consistently wound faces.
    #[error("non-manifold edge ({}, {}): {details}", .edge.0, .edge.1)]
    NonManifoldMesh { edge: (u32, u32), details: String },

    /// The field point lies on (or numerically on) an edge, vertex or face.
    #[error(
        "field point [{:.6}, {:.6}, {:.6}] lies on the body surface ({edges} edge terms, {faces} face terms clamped)",
        .point.x, .point.y, .point.z
    )]
    OnBoundarySingularity {
        point: Point3<f64>,
        edges: usize,
        faces: usize,
    },

    /// Named asteroid is not in the parameter table.
    #[error("unknown asteroid: {name:?}")]
    UnknownAsteroid { name: String },

    /// Model parameter is out of range.
    #[error("invalid parameter: {details}")]
    InvalidParameter { details: String },

    /// Parameter file could not be parsed.
    #[error("failed to parse asteroid parameters: {details}")]
    Config { details: String },
}
