use super::{Mesh, MeshResult, SphereParams, turn_angle};

/// UV sphere with both poles stored once (indices 0 and 1) followed by
/// `latitude_segments - 1` rings of `longitude_segments + 1` vertices each.
pub fn sphere(params: &SphereParams) -> MeshResult<Mesh> {
    params.validate()?;

    let lat = params.latitude_segments;
    let lon = params.longitude_segments;
    let radius = params.radius;
    let ring_len = lon + 1;

    let mut mesh = Mesh::with_capacity(
        2 + ((lat - 1) * ring_len) as usize,
        (6 * lon * (lat - 1)) as usize,
    );

    mesh.push_vertex([0.0, radius, 0.0], [0.5, 0.0]);
    mesh.push_vertex([0.0, -radius, 0.0], [0.5, 1.0]);

    for i in 1..lat {
        let polar = (180.0 / lat as f32 * i as f32 + 90.0).to_radians();
        let y = polar.sin() * radius;
        let ring_radius = polar.cos() * radius;
        let v = i as f32 / lat as f32;
        for j in 0..=lon {
            let (sin, cos) = turn_angle(j, lon).sin_cos();
            mesh.push_vertex(
                [ring_radius * cos, y, ring_radius * sin],
                [j as f32 / lon as f32, v],
            );
        }
    }

    // First index of the last ring, relative to the ring block.
    let end_floor = ring_len * (lat - 2);
    let mut floor_count = 0;
    for i in 1..=lat {
        if i == 1 {
            for j in 0..lon {
                mesh.push_triangle(0, j + 2, j + 3);
            }
        } else if i == lat {
            for j in 0..lon {
                mesh.push_triangle(1, j + end_floor + 2, j + end_floor + 3);
            }
        } else {
            for j in 0..lon {
                mesh.push_triangle(
                    j + 2 + floor_count,
                    j + 3 + floor_count,
                    j + lon + 3 + floor_count,
                );
                mesh.push_triangle(
                    j + lon + 3 + floor_count,
                    j + lon + 4 + floor_count,
                    j + 3 + floor_count,
                );
            }
        }

        if i > 1 {
            floor_count += ring_len;
        }
    }

    Ok(mesh)
}
