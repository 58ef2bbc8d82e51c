//! Mesh validation and reporting ahead of gravity precomputation.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::adjacency::MeshAdjacency;
use crate::Mesh;

/// Validation report for a shape model.
#[derive(Debug, Clone)]
pub struct MeshReport {
    /// Total vertex count.
    pub vertex_count: usize,

    /// Total face count.
    pub face_count: usize,

    /// Number of distinct undirected edges.
    pub edge_count: usize,

    /// Number of boundary edges (edges with 1 adjacent face).
    pub boundary_edge_count: usize,

    /// Number of non-manifold edges (edges with >2 adjacent faces).
    pub non_manifold_edge_count: usize,

    /// Euler characteristic V - E + F.
    pub euler_characteristic: i64,

    /// Signed enclosed volume; positive when faces wind outward.
    pub volume: f64,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,
}

impl MeshReport {
    /// Every edge is shared by exactly two faces.
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edge_count == 0 && self.non_manifold_edge_count == 0
    }

    /// Genus of a closed surface, `(2 - χ) / 2`.
    pub fn genus(&self) -> Option<i64> {
        if self.is_closed_manifold() && self.euler_characteristic <= 2 {
            Some((2 - self.euler_characteristic) / 2)
        } else {
            None
        }
    }

    /// Closed, outward oriented, with `E = 3F/2`.
    pub fn is_valid_body(&self) -> bool {
        self.is_closed_manifold() && 2 * self.edge_count == 3 * self.face_count && self.volume > 0.0
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Shape Model Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        writeln!(f, "  Volume: {:.6}", self.volume)?;
        writeln!(
            f,
            "  Closed manifold: {} (boundary edges: {}, non-manifold edges: {})",
            if self.is_closed_manifold() { "yes" } else { "NO" },
            self.boundary_edge_count,
            self.non_manifold_edge_count
        )?;

        match self.genus() {
            Some(genus) => writeln!(f, "  Genus: {}", genus)?,
            None => writeln!(f, "  Euler characteristic: {}", self.euler_characteristic)?,
        }

        Ok(())
    }
}

/// Validate a mesh and return a report.
///
/// Faces referencing missing vertices are left out of the report.
pub fn validate_mesh(mesh: &Mesh) -> MeshReport {
    let vertex_count = mesh.vertex_count();
    let in_range = |face: &[u32; 3]| face.iter().all(|&i| (i as usize) < vertex_count);

    let filtered;
    let mesh = if mesh.faces.iter().all(in_range) {
        mesh
    } else {
        let faces: Vec<[u32; 3]> = mesh.faces.iter().copied().filter(in_range).collect();
        warn!(
            "Skipping {} faces with out-of-range vertex indices",
            mesh.face_count() - faces.len()
        );
        filtered = Mesh {
            vertices: mesh.vertices.clone(),
            faces,
        };
        &filtered
    };

    let adjacency = MeshAdjacency::build(&mesh.faces, mesh.vertex_count());

    let edge_count = adjacency.edge_count();
    let report = MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count,
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        euler_characteristic: mesh.vertex_count() as i64 - edge_count as i64
            + mesh.face_count() as i64,
        volume: mesh.volume(),
        bounds: mesh.bounds(),
    };

    if report.boundary_edge_count > 0 {
        warn!(
            "Mesh is not closed: {} boundary edges",
            report.boundary_edge_count
        );
    }

    if report.non_manifold_edge_count > 0 {
        warn!(
            "Mesh is not manifold: {} non-manifold edges",
            report.non_manifold_edge_count
        );
    }

    if report.volume <= 0.0 {
        warn!("Mesh encloses non-positive volume {:.6}; faces may wind inward", report.volume);
    }

    debug!("{}", report);

    report
}

/// Log a summary of mesh validation.
pub fn log_validation(report: &MeshReport) {
    info!(
        "Shape model: {} verts, {} faces, {} edges, volume {:.6}",
        report.vertex_count, report.face_count, report.edge_count, report.volume
    );

    if !report.is_valid_body() {
        warn!("Shape model is not a closed, outward-oriented body");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn test_validate_closed_mesh() {
        let mesh = primitives::icosphere(1.0, 1);
        let report = validate_mesh(&mesh);

        assert!(report.is_closed_manifold());
        assert!(report.is_valid_body());
        assert_eq!(report.edge_count, 3 * report.face_count / 2);
        assert_eq!(report.euler_characteristic, 2);
        assert_eq!(report.genus(), Some(0));
    }

    #[test]
    fn test_validate_open_mesh() {
        let mut mesh = primitives::cube(1.0);
        mesh.faces.truncate(10);
        let report = validate_mesh(&mesh);

        assert!(!report.is_closed_manifold());
        assert!(!report.is_valid_body());
        assert_eq!(report.boundary_edge_count, 4);
        assert_eq!(report.genus(), None);
    }

    #[test]
    fn test_out_of_range_faces_are_skipped() {
        let mut mesh = primitives::cube(1.0);
        mesh.faces[0] = [0, 2, 99];
        let report = validate_mesh(&mesh);

        assert_eq!(report.face_count, 11);
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_valid_body());
    }

    #[test]
    fn test_inverted_mesh_is_not_valid_body() {
        let mut mesh = primitives::cube(1.0);
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        let report = validate_mesh(&mesh);
        assert!(report.is_closed_manifold());
        assert!(report.volume < 0.0);
        assert!(!report.is_valid_body());
    }

    #[test]
    fn test_report_display() {
        let report = validate_mesh(&primitives::cube(1.0));
        let output = format!("{}", report);

        assert!(output.contains("Vertices: 8"));
        assert!(output.contains("Faces: 12"));
        assert!(output.contains("Edges: 18"));
        assert!(output.contains("Closed manifold: yes"));
        assert!(output.contains("Genus: 0"));
    }
}
