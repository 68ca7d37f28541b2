//! Procedural primitive meshes.
//!
//! Every generator is a pure function of its parameters: calling it twice with
//! the same input yields identical vertex and index buffers.

mod cube;
mod cylinder;
mod sphere;
mod torus;

pub use cube::cube;
pub use cylinder::cylinder;
pub use sphere::sphere;
pub use torus::torus;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on any segment count, keeps index arithmetic inside `u32`.
pub const MAX_SEGMENTS: u32 = 4096;

pub const MIN_CYLINDER_SEGMENTS: u32 = 3;
pub const MIN_SPHERE_SEGMENTS: u32 = 2;
pub const MIN_TORUS_SEGMENTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("invalid {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

impl MeshError {
    fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        MeshError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type MeshResult<T> = Result<T, MeshError>;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn push_vertex(&mut self, position: [f32; 3], uv: [f32; 2]) {
        self.vertices.push(Vertex::new(position, uv));
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            vertices: self.vertex_count(),
            triangles: self.triangle_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Cube,
    Cylinder,
    Sphere,
    Torus,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Cube,
        ShapeKind::Cylinder,
        ShapeKind::Sphere,
        ShapeKind::Torus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Cube => "Cube",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Torus => "Torus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderParams {
    pub upper_radius: f32,
    pub lower_radius: f32,
    pub height: f32,
    pub segments: u32,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            upper_radius: 0.5,
            lower_radius: 0.5,
            height: 1.0,
            segments: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereParams {
    pub radius: f32,
    pub latitude_segments: u32,
    pub longitude_segments: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            latitude_segments: 8,
            longitude_segments: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub tube_segments: u32,
    pub ring_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            inner_radius: 0.5,
            outer_radius: 1.0,
            tube_segments: 4,
            ring_segments: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeParameters {
    Cube,
    Cylinder(CylinderParams),
    Sphere(SphereParams),
    Torus(TorusParams),
}

impl ShapeParameters {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeParameters::Cube => ShapeKind::Cube,
            ShapeParameters::Cylinder(_) => ShapeKind::Cylinder,
            ShapeParameters::Sphere(_) => ShapeKind::Sphere,
            ShapeParameters::Torus(_) => ShapeKind::Torus,
        }
    }

    pub fn validate(&self) -> MeshResult<()> {
        match self {
            ShapeParameters::Cube => Ok(()),
            ShapeParameters::Cylinder(params) => params.validate(),
            ShapeParameters::Sphere(params) => params.validate(),
            ShapeParameters::Torus(params) => params.validate(),
        }
    }
}

impl CylinderParams {
    pub fn validate(&self) -> MeshResult<()> {
        check_segments("cylinder segments", self.segments, MIN_CYLINDER_SEGMENTS)?;
        check_positive("cylinder upper radius", self.upper_radius)?;
        check_positive("cylinder lower radius", self.lower_radius)?;
        check_positive("cylinder height", self.height)
    }
}

impl SphereParams {
    pub fn validate(&self) -> MeshResult<()> {
        check_segments(
            "sphere latitude segments",
            self.latitude_segments,
            MIN_SPHERE_SEGMENTS,
        )?;
        check_segments(
            "sphere longitude segments",
            self.longitude_segments,
            MIN_SPHERE_SEGMENTS,
        )?;
        check_positive("sphere radius", self.radius)
    }
}

impl TorusParams {
    pub fn validate(&self) -> MeshResult<()> {
        check_segments("torus tube segments", self.tube_segments, MIN_TORUS_SEGMENTS)?;
        check_segments("torus ring segments", self.ring_segments, MIN_TORUS_SEGMENTS)?;
        check_positive("torus inner radius", self.inner_radius)?;
        check_positive("torus outer radius", self.outer_radius)?;
        if self.outer_radius <= self.inner_radius {
            return Err(MeshError::invalid(
                "torus outer radius",
                format!(
                    "{} must exceed inner radius {}",
                    self.outer_radius, self.inner_radius
                ),
            ));
        }
        Ok(())
    }
}

fn check_segments(parameter: &'static str, value: u32, min: u32) -> MeshResult<()> {
    if value < min || value > MAX_SEGMENTS {
        return Err(MeshError::invalid(
            parameter,
            format!("{value} outside {min}..={MAX_SEGMENTS}"),
        ));
    }
    Ok(())
}

fn check_positive(parameter: &'static str, value: f32) -> MeshResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MeshError::invalid(
            parameter,
            format!("{value} must be finite and positive"),
        ));
    }
    Ok(())
}

/// Angle in radians of step `index` out of `segments` around a full turn.
fn turn_angle(index: u32, segments: u32) -> f32 {
    (360.0 / segments as f32 * index as f32).to_radians()
}

pub fn generate(params: &ShapeParameters) -> MeshResult<Mesh> {
    match params {
        ShapeParameters::Cube => Ok(cube()),
        ShapeParameters::Cylinder(params) => cylinder(params),
        ShapeParameters::Sphere(params) => sphere(params),
        ShapeParameters::Torus(params) => torus(params),
    }
}
