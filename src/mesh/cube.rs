use super::{Mesh, Vertex};

#[rustfmt::skip]
const CUBE_VERTICES: [Vertex; 24] = [
    // -Z
    Vertex::new([-0.5, -0.5, -0.5], [0.0, 0.0]),
    Vertex::new([ 0.5, -0.5, -0.5], [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [1.0, 1.0]),
    Vertex::new([-0.5,  0.5, -0.5], [0.0, 1.0]),
    // +Z
    Vertex::new([-0.5, -0.5,  0.5], [0.0, 0.0]),
    Vertex::new([ 0.5, -0.5,  0.5], [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5,  0.5], [1.0, 1.0]),
    Vertex::new([-0.5,  0.5,  0.5], [0.0, 1.0]),
    // -X
    Vertex::new([-0.5,  0.5,  0.5], [1.0, 0.0]),
    Vertex::new([-0.5,  0.5, -0.5], [1.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], [0.0, 1.0]),
    Vertex::new([-0.5, -0.5,  0.5], [0.0, 0.0]),
    // +X
    Vertex::new([ 0.5,  0.5,  0.5], [1.0, 0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [1.0, 1.0]),
    Vertex::new([ 0.5, -0.5, -0.5], [0.0, 1.0]),
    Vertex::new([ 0.5, -0.5,  0.5], [0.0, 0.0]),
    // -Y
    Vertex::new([-0.5, -0.5, -0.5], [0.0, 1.0]),
    Vertex::new([ 0.5, -0.5, -0.5], [1.0, 1.0]),
    Vertex::new([ 0.5, -0.5,  0.5], [1.0, 0.0]),
    Vertex::new([-0.5, -0.5,  0.5], [0.0, 0.0]),
    // +Y
    Vertex::new([-0.5,  0.5, -0.5], [0.0, 1.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [1.0, 1.0]),
    Vertex::new([ 0.5,  0.5,  0.5], [1.0, 0.0]),
    Vertex::new([-0.5,  0.5,  0.5], [0.0, 0.0]),
];

#[rustfmt::skip]
const CUBE_INDICES: [u32; 36] = [
     0,  2,  1,   2,  0,  3,
     4,  5,  6,   6,  7,  4,
     8,  9, 10,  10, 11,  8,
    12, 14, 13,  14, 12, 15,
    16, 17, 18,  18, 19, 16,
    20, 22, 21,  22, 20, 23,
];

/// Unit cube centred on the origin, four vertices per face so each face
/// carries its own UV square.
pub fn cube() -> Mesh {
    Mesh {
        vertices: CUBE_VERTICES.to_vec(),
        indices: CUBE_INDICES.to_vec(),
    }
}
