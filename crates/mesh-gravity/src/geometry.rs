//! Per-face and per-edge geometry for the polyhedron gravity sums.
//!
//! Everything here depends only on the mesh, so it is computed once and
//! shared read-only by every field-point evaluation. Each face carries its
//! outward normal and face dyad `n nᵀ`; each undirected edge carries its two
//! adjacent faces and the edge dyad `n_A n_Aeᵀ + n_B n_Beᵀ`, where `n_Ae` is
//! the in-plane normal of the edge pointing out of face A.

use std::sync::Arc;

use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{debug, info};

use crate::adjacency::{edge_direction_in_face, edge_key, MeshAdjacency};
use crate::error::{GravityError, GravityResult};
use crate::{Mesh, Triangle};

/// Shared read-only handle to precomputed geometry.
pub type GeometryHandle = Arc<MeshGeometry>;

/// Geometry of one triangular face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    /// Vertex indices [a, b, c] in winding order.
    pub vertices: [u32; 3],
    /// Edge vectors e1 = V2 - V1, e2 = V3 - V2, e3 = V1 - V3.
    pub edges: [Vector3<f64>; 3],
    /// Outward unit normal.
    pub normal: Vector3<f64>,
    /// Centroid.
    pub center: Point3<f64>,
    /// Face dyad n nᵀ.
    pub dyad: Matrix3<f64>,
}

/// Geometry of one undirected edge shared by faces A and B.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    /// Sorted vertex index pair.
    pub vertices: (u32, u32),
    /// Adjacent faces (A, B); A is the lower face index.
    pub faces: (u32, u32),
    /// Edge length.
    pub length: f64,
    /// Edge dyad n_A n_Aeᵀ + n_B n_Beᵀ.
    pub dyad: Matrix3<f64>,
}

/// Precomputed geometry for a closed, consistently oriented triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    vertices: Vec<Point3<f64>>,
    faces: Vec<FaceGeometry>,
    edges: Vec<EdgeGeometry>,
    vertex_faces: Vec<Vec<u32>>,
}

/// Precompute geometry for a mesh and wrap it in a shareable handle.
pub fn precompute(mesh: &Mesh) -> GravityResult<GeometryHandle> {
    MeshGeometry::from_mesh(mesh).map(Arc::new)
}

impl MeshGeometry {
    /// Build geometry from a validated mesh.
    ///
    /// Fails with [`GravityError::DegenerateFace`] if any face has no
    /// well-defined normal, or [`GravityError::NonManifoldMesh`] if any edge
    /// is not shared by exactly two faces traversing it in opposite directions.
    pub fn from_mesh(mesh: &Mesh) -> GravityResult<Self> {
        Self::build(mesh.vertices.clone(), &mesh.faces)
    }

    /// Build geometry from raw coordinate rows and 0-based index rows.
    pub fn from_arrays(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> GravityResult<Self> {
        let mesh = Mesh::from_arrays(vertices, faces)?;
        Self::build(mesh.vertices, &mesh.faces)
    }

    fn build(vertices: Vec<Point3<f64>>, faces: &[[u32; 3]]) -> GravityResult<Self> {
        let mesh = Mesh::new(vertices, faces.to_vec())?;

        let face_geometry = mesh
            .faces
            .iter()
            .zip(mesh.triangles())
            .enumerate()
            .map(|(face_idx, (&face, tri))| {
                face_geometry(face, &tri).ok_or(GravityError::DegenerateFace {
                    face: face_idx,
                    area: tri.area(),
                })
            })
            .collect::<GravityResult<Vec<_>>>()?;

        let adjacency = MeshAdjacency::build(&mesh.faces, mesh.vertex_count());
        let edges = unique_edges(&mesh, &face_geometry, &adjacency)?;

        debug_assert_eq!(2 * edges.len(), 3 * face_geometry.len());
        info!(
            "Precomputed polyhedron geometry: {} vertices, {} faces, {} edges",
            mesh.vertex_count(),
            face_geometry.len(),
            edges.len()
        );

        Ok(Self {
            vertices: mesh.vertices,
            faces: face_geometry,
            edges,
            vertex_faces: adjacency.vertex_to_faces,
        })
    }

    /// Vertex positions the geometry was built from.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Per-face geometry, indexed by face id.
    pub fn faces(&self) -> &[FaceGeometry] {
        &self.faces
    }

    /// Unique edges, indexed by edge id.
    pub fn edges(&self) -> &[EdgeGeometry] {
        &self.edges
    }

    /// Vertex → incident faces map.
    pub fn vertex_faces(&self) -> &[Vec<u32>] {
        &self.vertex_faces
    }

    /// Position of a vertex by index.
    #[inline]
    pub fn vertex(&self, idx: u32) -> &Point3<f64> {
        &self.vertices[idx as usize]
    }

    /// Signed enclosed volume (km³), positive for outward winding.
    pub fn volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.vertices.map(|i| self.vertex(i).coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn face_geometry(vertices: [u32; 3], tri: &Triangle) -> Option<FaceGeometry> {
    if vertices[0] == vertices[1] || vertices[1] == vertices[2] || vertices[2] == vertices[0] {
        return None;
    }
    let normal = tri.normal()?;
    Some(FaceGeometry {
        vertices,
        edges: tri.edge_vectors(),
        normal,
        center: tri.centroid(),
        dyad: normal * normal.transpose(),
    })
}

/// Match every directed edge with its reversed partner and build one record
/// per undirected edge, in order of first appearance.
fn unique_edges(
    mesh: &Mesh,
    faces: &[FaceGeometry],
    adjacency: &MeshAdjacency,
) -> GravityResult<Vec<EdgeGeometry>> {
    let mut edges = Vec::with_capacity(faces.len() * 3 / 2);

    for (face_idx, face) in faces.iter().enumerate() {
        let face_idx = face_idx as u32;
        let [v0, v1, v2] = face.vertices;

        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            let key = edge_key(a, b);
            let sharing = adjacency.faces_for_edge(a, b).unwrap_or_default();

            if sharing.len() != 2 {
                return Err(GravityError::NonManifoldMesh {
                    edge: key,
                    details: format!("shared by {} faces, expected 2", sharing.len()),
                });
            }

            let other = if sharing[0] == face_idx {
                sharing[1]
            } else {
                sharing[0]
            };

            let other_face = &mesh.faces[other as usize];
            if edge_direction_in_face(other_face, a, b) != Some(false) {
                return Err(GravityError::NonManifoldMesh {
                    edge: key,
                    details: format!(
                        "faces {} and {} traverse it in the same direction",
                        face_idx, other
                    ),
                });
            }

            // emit once, from the lower-indexed face
            if sharing[0] != face_idx {
                continue;
            }

            let face_a = face;
            let face_b = &faces[other as usize];
            let pa = mesh.vertices[a as usize];
            let pb = mesh.vertices[b as usize];

            let normal_a = edge_normal(face_a, &pa, &pb);
            let normal_b = edge_normal(face_b, &pb, &pa);
            let dyad = face_a.normal * normal_a.transpose() + face_b.normal * normal_b.transpose();

            edges.push(EdgeGeometry {
                vertices: key,
                faces: (face_idx, other),
                length: (pb - pa).norm(),
                dyad,
            });
        }
    }

    debug!("Matched {} unique edges", edges.len());
    Ok(edges)
}

/// In-plane unit normal of the directed edge `from -> to`, pointing out of `face`.
fn edge_normal(face: &FaceGeometry, from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    let n = (to - from).cross(&face.normal).normalize();
    let midpoint = from + (to - from) * 0.5;
    if n.dot(&(midpoint - face.center)) < 0.0 {
        -n
    } else {
        n
    }
}
