//! Mesh topology queries via adjacency structures.

use hashbrown::HashMap;

/// Lightweight topology structure for mesh queries.
///
/// Provides vertex-to-face and edge-to-face lookups without the overhead of
/// a full half-edge data structure.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAdjacency {
    /// Vertex index → face indices incident to it, in face order.
    pub vertex_to_faces: Vec<Vec<u32>>,

    /// Edge (min_idx, max_idx) → face indices sharing it, in face order.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,
}

/// Canonical key for an undirected edge.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MeshAdjacency {
    /// Build adjacency structures from a face list.
    ///
    /// Face indices must already be checked against `vertex_count`.
    pub fn build(faces: &[[u32; 3]], vertex_count: usize) -> Self {
        let mut vertex_to_faces: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> =
            HashMap::with_capacity(faces.len() * 3 / 2);

        for (face_idx, &[v0, v1, v2]) in faces.iter().enumerate() {
            let face_idx = face_idx as u32;

            for v in [v0, v1, v2] {
                let incident = &mut vertex_to_faces[v as usize];
                // a face repeating a vertex is degenerate, but record it once
                if incident.last() != Some(&face_idx) {
                    incident.push(face_idx);
                }
            }

            for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                edge_to_faces.entry(edge_key(a, b)).or_default().push(face_idx);
            }
        }

        Self {
            vertex_to_faces,
            edge_to_faces,
        }
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Find boundary edges (edges with exactly 1 adjacent face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Find non-manifold edges (edges with more than 2 adjacent faces).
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, _)| edge)
    }

    /// Check that every edge is shared by exactly two faces.
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() == 2)
    }

    /// Count boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Count non-manifold edges.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    /// Get faces adjacent to a vertex.
    pub fn faces_for_vertex(&self, vertex_idx: u32) -> Option<&[u32]> {
        self.vertex_to_faces
            .get(vertex_idx as usize)
            .map(|v| v.as_slice())
    }

    /// Get faces adjacent to an edge.
    /// The edge is automatically canonicalized (min, max).
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[u32]> {
        self.edge_to_faces
            .get(&edge_key(v0, v1))
            .map(|v| v.as_slice())
    }
}

/// Check if edge (a, b) appears in face in the same direction (a -> b).
/// Returns Some(true) if same direction, Some(false) if opposite, None if edge not found.
pub fn edge_direction_in_face(face: &[u32; 3], a: u32, b: u32) -> Option<bool> {
    (0..3).find_map(|i| {
        let v0 = face[i];
        let v1 = face[(i + 1) % 3];
        if v0 == a && v1 == b {
            Some(true)
        } else if v0 == b && v1 == a {
            Some(false)
        } else {
            None
        }
    })
}
