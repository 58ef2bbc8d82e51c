//! Core mesh data types.

use nalgebra::{Point3, Vector3};

use crate::error::{GravityError, GravityResult};

/// A closed triangle mesh describing the shape of a body.
///
/// Coordinates are in kilometers to match the density and gravitational
/// constant units used elsewhere in the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as 0-based indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding seen from outside.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a mesh from vertex positions and 0-based faces.
    ///
    /// Fails if the mesh is empty or a face references a missing vertex.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> GravityResult<Self> {
        let mesh = Self { vertices, faces };
        mesh.check_indices()?;
        Ok(mesh)
    }

    /// Create a mesh from raw coordinate rows and 0-based index rows.
    pub fn from_arrays(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> GravityResult<Self> {
        let vertices = vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        Self::new(vertices, faces.to_vec())
    }

    /// Create a mesh from 1-based face indices (Wavefront OBJ convention).
    pub fn from_one_based(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> GravityResult<Self> {
        let mut zero_based = Vec::with_capacity(faces.len());
        for (face_idx, face) in faces.iter().enumerate() {
            let mut converted = [0u32; 3];
            for (slot, &index) in face.iter().enumerate() {
                converted[slot] = index.checked_sub(1).ok_or(GravityError::InvalidFaceIndex {
                    face: face_idx,
                    index: i64::from(index) - 1,
                    vertex_count: vertices.len(),
                })?;
            }
            zero_based.push(converted);
        }
        Self::from_arrays(vertices, &zero_based)
    }

    pub(crate) fn check_indices(&self) -> GravityResult<()> {
        if self.vertices.is_empty() || self.faces.is_empty() {
            return Err(GravityError::EmptyMesh {
                details: format!(
                    "{} vertices, {} faces",
                    self.vertices.len(),
                    self.faces.len()
                ),
            });
        }

        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(GravityError::InvalidFaceIndex {
                    face: face_idx,
                    index: i64::from(bad),
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices[1..].iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Signed enclosed volume via the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing normals.
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Center of mass of the enclosed solid, assuming uniform density.
    ///
    /// Returns None when the enclosed volume is zero.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        let mut weighted = Vector3::zeros();
        let mut volume = 0.0;
        for t in self.triangles() {
            let v = t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)) / 6.0;
            weighted += (t.v0.coords + t.v1.coords + t.v2.coords) * (v / 4.0);
            volume += v;
        }
        if volume.abs() < f64::EPSILON {
            None
        } else {
            Some(Point3::from(weighted / volume))
        }
    }

    /// Translate mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Scale mesh independently along each axis.
    pub fn scale(&mut self, factors: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.coords.component_mul_assign(&factors);
        }
    }
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from outside the body
/// (normal points away from the interior).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Edge vectors e1 = v1 - v0, e2 = v2 - v1, e3 = v0 - v2.
    #[inline]
    pub fn edge_vectors(&self) -> [Vector3<f64>; 3] {
        [self.v1 - self.v0, self.v2 - self.v1, self.v0 - self.v2]
    }

    /// Compute the (unnormalized) face normal e1 × e2.
    /// Its length is twice the triangle area.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let [e1, e2, _] = self.edge_vectors();
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (near-zero area relative to edge length).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let scale = self
            .edge_vectors()
            .iter()
            .map(|e| e.norm_squared())
            .fold(0.0, f64::max);
        let len = n.norm();
        if scale > 0.0 && len > f64::EPSILON * scale {
            Some(n / len)
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_triangle_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );

        let normal = tri.normal().expect("non-degenerate triangle");
        assert!(approx_eq(normal.x, 0.0));
        assert!(approx_eq(normal.y, 0.0));
        assert!(approx_eq(normal.z, 1.0));
        assert!(approx_eq(tri.area(), 0.5));
    }

    #[test]
    fn test_edge_vectors_close_the_loop() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 1.0),
        );
        let [e1, e2, e3] = tri.edge_vectors();
        assert!((e1 + e2 + e3).norm() < 1e-12);
        let c = tri.centroid();
        assert!(approx_eq(c.x, 1.0));
        assert!(approx_eq(c.y, 1.0));
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let result = Mesh::from_arrays(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 3]]);
        assert!(matches!(
            result,
            Err(GravityError::InvalidFaceIndex { face: 0, index: 3, .. })
        ));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        assert!(matches!(
            Mesh::new(Vec::new(), Vec::new()),
            Err(GravityError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn test_one_based_conversion() {
        let verts = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mesh = Mesh::from_one_based(&verts, &[[1, 2, 3]]).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);

        let bad = Mesh::from_one_based(&verts, &[[0, 1, 2]]);
        assert!(matches!(bad, Err(GravityError::InvalidFaceIndex { index: -1, .. })));
    }

    #[test]
    fn test_cube_volume_and_centroid() {
        let mut mesh = primitives::cube(1.0);
        assert!(approx_eq(mesh.volume(), 8.0));

        mesh.translate(Vector3::new(1.0, -2.0, 0.5));
        let c = mesh.centroid().expect("closed mesh");
        assert!(approx_eq(c.x, 1.0));
        assert!(approx_eq(c.y, -2.0));
        assert!(approx_eq(c.z, 0.5));
        assert!(approx_eq(mesh.volume(), 8.0));
    }

    #[test]
    fn test_mesh_bounds() {
        let mut mesh = primitives::cube(1.0);
        mesh.scale(Vector3::new(2.0, 1.0, 0.5));
        let (min, max) = mesh.bounds().expect("non-empty mesh");
        assert!(approx_eq(min.x, -2.0));
        assert!(approx_eq(max.y, 1.0));
        assert!(approx_eq(max.z, 0.5));
    }
}
