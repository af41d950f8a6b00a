//! Mesh generation for the cubes and the container outline.

use glam::Vec3;

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices, counter-clockwise seen from outside.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| {
                let p = Vec3::from_array(*p);
                (min.min(p), max.max(p))
            },
        )
    }
}

/// One face of the unit cube: outward normal and the two in-plane axes,
/// ordered so that `u × v == normal`.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Box with rounded edges and corners.
///
/// A unit cube is subdivided into `2 * segments + 1` cells per edge. Every
/// vertex is then moved onto the inner box of half-extent `size / 2 - radius`
/// and pushed out by `radius` along its rounding normal. The outermost cell
/// ring forms the bevel; inner vertices collapse onto the flat faces.
pub fn rounded_box(width: f32, height: f32, depth: f32, segments: u32, radius: f32) -> MeshData {
    let cells = segments * 2 + 1;
    let radius = radius.min(width / 2.0).min(height / 2.0).min(depth / 2.0);
    let inner = Vec3::new(width, height, depth) / 2.0 - Vec3::splat(radius);
    let half_cell = 0.5 / cells as f32;

    let row = cells + 1;
    let mut mesh = MeshData {
        positions: Vec::with_capacity((6 * row * row) as usize),
        indices: Vec::with_capacity((6 * cells * cells * 6) as usize),
    };

    for (normal, u, v) in FACES {
        let base = mesh.positions.len() as u32;

        for j in 0..row {
            for i in 0..row {
                let a = i as f32 / cells as f32 - 0.5;
                let b = j as f32 / cells as f32 - 0.5;
                let p = normal * 0.5 + u * a + v * b;
                mesh.positions.push(round_vertex(p, inner, radius, half_cell).to_array());
            }
        }

        for j in 0..cells {
            for i in 0..cells {
                let a = base + j * row + i;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }

    mesh
}

fn round_vertex(p: Vec3, inner: Vec3, radius: f32, half_cell: f32) -> Vec3 {
    let s = Vec3::new(sign(p.x), sign(p.y), sign(p.z));
    let normal = (p - s * half_cell).normalize_or_zero();
    inner * s + normal * radius
}

// Unlike `f32::signum`, zero maps to zero.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// The 12 edges of an axis-aligned cube of edge `size` centered at the origin.
pub fn box_edges(size: f32) -> Vec<(Vec3, Vec3)> {
    let s = 0.5 * size;
    let v000 = Vec3::new(-s, -s, -s);
    let v001 = Vec3::new(-s, -s, s);
    let v010 = Vec3::new(-s, s, -s);
    let v011 = Vec3::new(-s, s, s);
    let v100 = Vec3::new(s, -s, -s);
    let v101 = Vec3::new(s, -s, s);
    let v110 = Vec3::new(s, s, -s);
    let v111 = Vec3::new(s, s, s);

    vec![
        // Bottom face
        (v000, v100),
        (v100, v101),
        (v101, v001),
        (v001, v000),
        // Top face
        (v010, v110),
        (v110, v111),
        (v111, v011),
        (v011, v010),
        // Vertical edges
        (v000, v010),
        (v100, v110),
        (v101, v111),
        (v001, v011),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_box_counts() {
        let mesh = rounded_box(0.03, 0.03, 0.03, 2, 0.006);
        // 5 cells per edge, 6 faces.
        assert_eq!(mesh.positions.len(), 6 * 6 * 6);
        assert_eq!(mesh.triangle_count(), 6 * 5 * 5 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn test_rounded_box_fits_its_size() {
        let mesh = rounded_box(0.03, 0.03, 0.03, 2, 0.006);
        let (min, max) = mesh.bounds();
        for axis in 0..3 {
            assert!((max[axis] - 0.015).abs() < 1e-5, "max {:?}", max);
            assert!((min[axis] + 0.015).abs() < 1e-5, "min {:?}", min);
        }
    }

    #[test]
    fn test_rounded_box_corners_are_rounded() {
        let mesh = rounded_box(1.0, 1.0, 1.0, 2, 0.2);
        let farthest = mesh
            .positions
            .iter()
            .map(|p| Vec3::from_array(*p).length())
            .fold(0.0_f32, f32::max);
        // A sharp cube corner would sit at sqrt(3) / 2.
        assert!(farthest < 3.0_f32.sqrt() / 2.0 - 0.05);
    }

    #[test]
    fn test_rounded_box_winding_faces_outward() {
        let mesh = rounded_box(1.0, 1.0, 1.0, 2, 0.2);
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
            let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
            let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
            let n = (b - a).cross(c - a);
            if n.length() < 1e-6 {
                // Collapsed cell on a flat face.
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0, "inward triangle at {:?}", centroid);
        }
    }

    #[test]
    fn test_radius_is_clamped() {
        let mesh = rounded_box(0.2, 0.2, 0.2, 2, 5.0);
        let (min, max) = mesh.bounds();
        assert!((max.x - 0.1).abs() < 1e-5);
        assert!((min.y + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_box_edges() {
        let edges = box_edges(1.0);
        assert_eq!(edges.len(), 12);
        for (a, b) in &edges {
            assert!(((*a - *b).length() - 1.0).abs() < 1e-6);
            assert_eq!(a.abs(), Vec3::splat(0.5));
        }
    }
}
