//! Closed, outward-oriented reference shapes.
//!
//! These stand in for loaded shape models in tests and make quick
//! ellipsoidal approximations of a body from its semi-axes.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::Mesh;

/// Axis-aligned cube centered at the origin, 8 vertices and 12 faces.
pub fn cube(half_extent: f64) -> Mesh {
    let h = half_extent;
    let vertices = vec![
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ];

    let faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [2, 3, 7],
        [2, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    Mesh { vertices, faces }
}

/// Geodesic sphere built by recursively subdividing an icosahedron.
///
/// Has `20 * 4^subdivisions` faces; every vertex lies on the sphere.
pub fn icosphere(radius: f64, subdivisions: u32) -> Mesh {
    let t = (1.0 + 5f64.sqrt()) / 2.0;
    let mut vertices: Vec<Point3<f64>> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|&[x, y, z]| Point3::from(Vector3::new(x, y, z).normalize()))
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Point3<f64>>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (vertices[a as usize].coords + vertices[b as usize].coords).normalize();
                vertices.push(Point3::from(mid));
                (vertices.len() - 1) as u32
            })
        };

        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    for v in &mut vertices {
        v.coords *= radius;
    }

    Mesh { vertices, faces }
}

/// Triaxial ellipsoid with semi-axes `axes`, from a scaled icosphere.
pub fn ellipsoid(axes: [f64; 3], subdivisions: u32) -> Mesh {
    let mut mesh = icosphere(1.0, subdivisions);
    mesh.scale(Vector3::from(axes));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &Mesh) {
        for (idx, tri) in mesh.triangles().enumerate() {
            let n = tri.normal().expect("non-degenerate");
            assert!(
                n.dot(&tri.centroid().coords) > 0.0,
                "face {} points inward",
                idx
            );
        }
    }

    #[test]
    fn test_cube_is_outward() {
        let mesh = cube(0.5);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_outward(&mesh);
    }

    #[test]
    fn test_icosphere_counts_and_radius() {
        let mesh = icosphere(2.0, 2);
        assert_eq!(mesh.face_count(), 320);
        // V - E + F = 2 with E = 3F/2
        assert_eq!(mesh.vertex_count(), 2 + 320 / 2);
        for v in &mesh.vertices {
            assert!((v.coords.norm() - 2.0).abs() < 1e-12);
        }
        assert_outward(&mesh);
    }

    #[test]
    fn test_ellipsoid_bounds() {
        let mesh = ellipsoid([3.0, 2.0, 1.0], 1);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.x - 3.0).abs() < 1e-12);
        assert!((min.z + 1.0).abs() < 1e-12);
        assert_outward(&mesh);
    }
}
