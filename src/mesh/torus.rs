use super::{Mesh, MeshResult, TorusParams, turn_angle};

/// Torus lying in the XZ plane. The tube cross-section spans the gap between
/// the two radii, so `inner_radius` and `outer_radius` are the hole and rim
/// radii seen from above.
pub fn torus(params: &TorusParams) -> MeshResult<Mesh> {
    params.validate()?;

    let rings = params.ring_segments;
    let tube = params.tube_segments;
    let tube_radius = (params.outer_radius - params.inner_radius) / 2.0;
    let center_radius = (params.outer_radius + params.inner_radius) / 2.0;

    let mut mesh = Mesh::with_capacity(
        ((rings + 1) * (tube + 1)) as usize,
        (6 * rings * tube) as usize,
    );

    for i in 0..=rings {
        let (sin_a, cos_a) = turn_angle(i, rings).sin_cos();
        for j in 0..=tube {
            let (sin_b, cos_b) = turn_angle(j, tube).sin_cos();
            let x = center_radius * cos_a - tube_radius * cos_b * cos_a;
            let y = tube_radius * sin_b;
            let z = center_radius * sin_a - tube_radius * cos_b * sin_a;
            mesh.push_vertex(
                [x, y, z],
                [i as f32 / rings as f32, j as f32 / tube as f32],
            );
        }
    }

    let mut num = 0;
    for _ in 0..rings {
        for j in 0..tube {
            mesh.push_triangle(j + num, j + 1 + num, j + tube + 1 + num);
            mesh.push_triangle(j + tube + 1 + num, j + tube + 2 + num, j + 1 + num);
        }
        num += tube + 1;
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(tube: u32, rings: u32) -> TorusParams {
        TorusParams {
            inner_radius: 0.5,
            outer_radius: 1.0,
            tube_segments: tube,
            ring_segments: rings,
        }
    }

    #[test]
    fn counts_follow_grid_size() {
        let mesh = torus(&params(6, 10)).expect("valid torus");
        assert_eq!(mesh.vertex_count(), 11 * 7);
        assert_eq!(mesh.triangle_count(), 2 * 10 * 6);
    }

    #[test]
    fn vertices_stay_between_radii() {
        let mesh = torus(&TorusParams {
            inner_radius: 0.3,
            outer_radius: 1.5,
            tube_segments: 16,
            ring_segments: 24,
        })
        .expect("valid torus");
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            let planar = (x * x + z * z).sqrt();
            assert!(planar >= 0.3 - 1e-4 && planar <= 1.5 + 1e-4);
            assert!(y.abs() <= 0.6 + 1e-4);
        }
    }

    #[test]
    fn first_vertex_sits_on_inner_edge() {
        let mesh = torus(&params(4, 4)).expect("valid torus");
        let [x, y, z] = mesh.vertices[0].position;
        assert!((x - 0.5).abs() < 1e-6);
        assert_eq!(y, 0.0);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn uv_spans_unit_square() {
        let mesh = torus(&params(3, 5)).expect("valid torus");
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices.last().expect("vertex").uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[3].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[4].uv, [0.2, 0.0]);
    }

    #[test]
    fn quads_use_running_ring_offset() {
        let mesh = torus(&params(3, 3)).expect("valid torus");
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris[0], [0, 1, 4]);
        assert_eq!(tris[1], [4, 5, 1]);
        assert_eq!(tris[6], [4, 5, 8]);
        assert_eq!(tris[17], [14, 15, 11]);
    }

    #[test]
    fn rejects_too_few_segments() {
        assert!(torus(&params(2, 8)).is_err());
        assert!(torus(&params(8, 2)).is_err());
    }
}
