use super::{CylinderParams, Mesh, MeshResult, turn_angle};

/// Capped cylinder (or truncated cone when the radii differ) standing on the
/// Y axis.
///
/// Layout: index 0 is the top apex, followed by `segments + 1` pairs of
/// (upper ring point, lower ring point) with the seam pair duplicated, and the
/// bottom apex last at `2 * segments + 3`.
pub fn cylinder(params: &CylinderParams) -> MeshResult<Mesh> {
    params.validate()?;

    let segments = params.segments;
    let half_height = params.height / 2.0;
    let bottom_apex = 2 * segments + 3;

    let mut mesh = Mesh::with_capacity(
        2 * (segments as usize + 1) + 2,
        12 * segments as usize,
    );

    mesh.push_vertex([0.0, half_height, 0.0], [0.5, 0.0]);
    for i in 0..=segments {
        let angle = turn_angle(i, segments);
        let (sin, cos) = angle.sin_cos();
        let u = i as f32 / segments as f32;
        mesh.push_vertex(
            [cos * params.upper_radius, half_height, sin * params.upper_radius],
            [u, 0.0],
        );
        mesh.push_vertex(
            [cos * params.lower_radius, -half_height, sin * params.lower_radius],
            [u, 1.0],
        );
    }
    mesh.push_vertex([0.0, -half_height, 0.0], [0.5, 1.0]);

    // upper cap
    for i in 0..segments {
        mesh.push_triangle(0, 2 * i + 1, 2 * i + 3);
    }

    // wall, strip over the interleaved rings
    for i in 0..2 * segments {
        mesh.push_triangle(i + 1, i + 2, i + 3);
    }

    // lower cap
    for i in 0..segments {
        mesh.push_triangle(bottom_apex, 2 * i + 2, 2 * i + 4);
    }

    Ok(mesh)
}
