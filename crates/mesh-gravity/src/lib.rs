//! Gravity field of constant-density polyhedral bodies.
//!
//! This crate evaluates the potential, attraction, gradient matrix and
//! Laplacian of a closed triangle mesh of uniform density at any field
//! point, using the closed-form polyhedron method of Werner and Scheeres.
//!
//! - **Geometry**: face and edge dyads, unique-edge matching and
//!   vertex-face adjacency, computed once per mesh
//! - **Factors**: per-point solid angles and edge logarithms, with
//!   on-surface points flagged instead of producing NaN
//! - **Potential**: face and edge sums, optionally reduced in parallel
//! - **Asteroid**: a spinning body with named physical parameters that
//!   keeps its most recent evaluation
//!
//! # Example
//!
//! ```
//! use mesh_gravity::{primitives, AsteroidModel, AsteroidParams};
//! use nalgebra::Point3;
//!
//! let mesh = primitives::cube(0.5);
//! let mut model = AsteroidModel::new(AsteroidParams::new("cube", 1000.0), &mesh).unwrap();
//!
//! let field = model.evaluate_at(&Point3::new(0.0, 0.0, 0.0));
//! let expected = -4.0 * std::f64::consts::PI * mesh_gravity::G * 1000.0;
//! assert!((field.laplacian - expected).abs() < 1e-6 * expected.abs());
//! ```

mod error;
mod types;

pub mod adjacency;
pub mod asteroid;
pub mod factors;
pub mod geometry;
pub mod potential;
pub mod primitives;
pub mod rotation;
pub mod validate;

// Re-export core types at crate root
pub use error::{GravityError, GravityResult};
pub use types::{Mesh, Triangle};

pub use adjacency::MeshAdjacency;
pub use asteroid::{AsteroidModel, AsteroidParams};
pub use factors::{edge_factor, face_factor, SingularityFactors};
pub use geometry::{precompute, EdgeGeometry, FaceGeometry, GeometryHandle, MeshGeometry};
pub use potential::{evaluate, evaluate_with_constant, BoundarySingularity, Potential, G};
pub use rotation::rotate_vertices;
pub use validate::{validate_mesh, MeshReport};
