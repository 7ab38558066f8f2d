//! Point source resolution: mesh geometry to an ordered point set.
//!
//! Two modes:
//! - Vertex mode: one point per mesh vertex in native vertex order. Index i
//!   refers to the same logical vertex on every frame of an animation,
//!   which is what gives a 4DGS sequence frame-to-frame coherence.
//! - Surface mode: area-weighted random sampling across triangle faces.
//!   Sample i has no cross-frame identity; callers opt into that.

use crate::core::TriangleMesh;
use crate::export::SampleMode;
use crate::sample::SampleError;
use nalgebra::Vector3;
use rand::Rng;

/// Where a point came from on the source mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointSource {
    /// The point is a mesh vertex with this index.
    Vertex(u32),

    /// The point was sampled on a face at the given barycentric coordinates.
    Surface { face: u32, bary: [f32; 3] },
}

/// A single resolved point, scoped to one frame.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    /// World-space position
    pub position: Vector3<f32>,

    /// Provenance on the source mesh, used for color lookup
    pub source: PointSource,
}

/// Resolve the ordered point set for one evaluated mesh.
///
/// The `rng` is only consulted in surface mode; vertex mode is fully
/// deterministic.
pub fn resolve_points(
    mesh: &TriangleMesh,
    mode: &SampleMode,
    rng: &mut impl Rng,
) -> Result<Vec<Point>, SampleError> {
    match mode {
        SampleMode::Vertices => vertex_points(mesh),
        SampleMode::Surface { density } => surface_points(mesh, *density, rng),
    }
}

fn vertex_points(mesh: &TriangleMesh) -> Result<Vec<Point>, SampleError> {
    if mesh.positions.is_empty() {
        return Err(SampleError::EmptyMesh(mesh.name.clone()));
    }

    Ok(mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| Point {
            position: *p,
            source: PointSource::Vertex(i as u32),
        })
        .collect())
}

/// Distribute `ceil(area * density)` samples across faces proportionally to
/// face area, via inversion sampling over the cumulative area table.
fn surface_points(
    mesh: &TriangleMesh,
    density: f32,
    rng: &mut impl Rng,
) -> Result<Vec<Point>, SampleError> {
    if mesh.faces.is_empty() {
        return Err(SampleError::EmptyMesh(mesh.name.clone()));
    }

    let mut cumulative = Vec::with_capacity(mesh.faces.len());
    let mut total = 0.0f32;
    for f in 0..mesh.faces.len() {
        total += mesh.face_area(f);
        cumulative.push(total);
    }
    if total <= 0.0 {
        return Err(SampleError::DegenerateFaces(mesh.name.clone()));
    }

    let count = ((total * density).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let u = rng.gen_range(0.0..total);
        let face = cumulative.partition_point(|&c| c <= u).min(mesh.faces.len() - 1);
        points.push(sample_on_face(mesh, face, rng));
    }

    Ok(points)
}

fn sample_on_face(mesh: &TriangleMesh, face: usize, rng: &mut impl Rng) -> Point {
    let [v0, v1, v2] = mesh.face_positions(face);

    // Uniform barycentric sampling via the sqrt warp.
    let r1: f32 = rng.gen_range(0.0..1.0);
    let r2: f32 = rng.gen_range(0.0..1.0);
    let su = r1.sqrt();
    let bary = [1.0 - su, su * (1.0 - r2), su * r2];

    let position = v0 * bary[0] + v1 * bary[1] + v2 * bary[2];
    Point {
        position,
        source: PointSource::Surface {
            face: face as u32,
            bary,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quad_mesh() -> TriangleMesh {
        let mut mesh = TriangleMesh::new("quad");
        mesh.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        mesh.faces = vec![[0, 1, 2], [0, 2, 3]];
        mesh
    }

    #[test]
    fn test_vertex_mode_is_index_stable() {
        let mesh = quad_mesh();
        let mut rng = StdRng::seed_from_u64(1);
        let points = resolve_points(&mesh, &SampleMode::Vertices, &mut rng).unwrap();

        assert_eq!(points.len(), 4);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.source, PointSource::Vertex(i as u32));
            assert_eq!(p.position, mesh.positions[i]);
        }
    }

    #[test]
    fn test_vertex_mode_empty_mesh_fails() {
        let mesh = TriangleMesh::new("empty");
        let mut rng = StdRng::seed_from_u64(1);
        let err = resolve_points(&mesh, &SampleMode::Vertices, &mut rng).unwrap_err();
        assert!(matches!(err, SampleError::EmptyMesh(_)));
    }

    #[test]
    fn test_surface_mode_count_tracks_area_and_density() {
        let mesh = quad_mesh(); // area 1.0
        let mut rng = StdRng::seed_from_u64(7);
        let mode = SampleMode::Surface { density: 200.0 };
        let points = resolve_points(&mesh, &mode, &mut rng).unwrap();
        assert_eq!(points.len(), 200);
    }

    #[test]
    fn test_surface_samples_stay_on_mesh_plane() {
        let mesh = quad_mesh(); // entirely in z = 0
        let mut rng = StdRng::seed_from_u64(7);
        let mode = SampleMode::Surface { density: 100.0 };
        for p in resolve_points(&mesh, &mode, &mut rng).unwrap() {
            assert_relative_eq!(p.position.z, 0.0, epsilon = 1e-6);
            assert!(p.position.x >= 0.0 && p.position.x <= 1.0);
            assert!(p.position.y >= 0.0 && p.position.y <= 1.0);
        }
    }

    #[test]
    fn test_surface_samples_follow_face_areas() {
        // One big face, one small: the big one should receive far more samples.
        let mut mesh = TriangleMesh::new("skewed");
        mesh.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.1, 0.0, 1.0),
            Vector3::new(0.0, 0.1, 1.0),
        ];
        mesh.faces = vec![[0, 1, 2], [3, 4, 5]];

        let mut rng = StdRng::seed_from_u64(11);
        let mode = SampleMode::Surface { density: 40.0 };
        let points = resolve_points(&mesh, &mode, &mut rng).unwrap();

        let on_big = points
            .iter()
            .filter(|p| matches!(p.source, PointSource::Surface { face: 0, .. }))
            .count();
        assert!(on_big as f32 > 0.95 * points.len() as f32);
    }

    #[test]
    fn test_surface_mode_zero_area_fails() {
        let mut mesh = TriangleMesh::new("degenerate");
        mesh.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ];
        mesh.faces = vec![[0, 1, 2]];

        let mut rng = StdRng::seed_from_u64(1);
        let mode = SampleMode::Surface { density: 10.0 };
        let err = resolve_points(&mesh, &mode, &mut rng).unwrap_err();
        assert!(matches!(err, SampleError::DegenerateFaces(_)));
    }
}
