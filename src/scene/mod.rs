//! Viewer state: which primitive is shown, with what parameters, texture,
//! transform and camera. Everything the UI panel edits lives here.

mod mesh_slot;

pub use mesh_slot::MeshSlot;

use crate::camera::{CameraController, CameraInput, FreeCamera};
use crate::config::ViewerConfig;
use crate::mesh::{CylinderParams, ShapeKind, ShapeParameters, SphereParams, TorusParams};
use crate::render::{FrameView, MeshHandle};
use crate::texture::TextureKind;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Widget ranges for each editable parameter.
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const CYLINDER_SEGMENTS: RangeInclusive<u32> = 4..=100;
    pub const CYLINDER_RADIUS: RangeInclusive<f32> = 0.1..=1.0;
    pub const CYLINDER_HEIGHT: RangeInclusive<f32> = 0.5..=1.0;
    pub const SPHERE_SEGMENTS: RangeInclusive<u32> = 4..=100;
    pub const SPHERE_RADIUS: RangeInclusive<f32> = 0.1..=2.0;
    pub const TORUS_SEGMENTS: RangeInclusive<u32> = 3..=100;
    pub const TORUS_OUTER_RADIUS: RangeInclusive<f32> = 1.0..=2.0;
    pub const TORUS_INNER_RADIUS: RangeInclusive<f32> = 0.1..=0.9;
    pub const MODEL_SCALE: RangeInclusive<f32> = 0.05..=10.0;
}

fn clamp_to<T: PartialOrd + Copy>(value: T, range: &std::ops::RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

fn clamp_f32(value: f32, range: &std::ops::RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        clamp_to(value, range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub animate: bool,
    /// Degrees per second added to `rotation` while animating.
    pub rotation_speed: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            animate: false,
            rotation_speed: Vec3::new(120.0, 60.0, 0.0),
        }
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> Mat4 {
        let radians = self.rotation * (std::f32::consts::PI / 180.0);
        let rotation = Quat::from_euler(EulerRot::XYZ, radians.x, radians.y, radians.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, Vec3::ZERO)
    }

    pub fn advance(&mut self, delta_seconds: f32) {
        if !self.animate {
            return;
        }
        self.rotation += self.rotation_speed * delta_seconds;
        self.rotation = Vec3::new(
            self.rotation.x.rem_euclid(360.0),
            self.rotation.y.rem_euclid(360.0),
            self.rotation.z.rem_euclid(360.0),
        );
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct SceneController {
    shape: ShapeKind,
    cylinder: CylinderParams,
    sphere: SphereParams,
    torus: TorusParams,
    texture: TextureKind,
    texture_dirty: bool,
    clear_color: [f32; 4],
    pub transform: ModelTransform,
    pub camera: FreeCamera,
    camera_controller: CameraController,
}

impl SceneController {
    pub fn new(config: &ViewerConfig) -> Self {
        let mut scene = Self {
            shape: config.shape,
            cylinder: CylinderParams::default(),
            sphere: SphereParams::default(),
            torus: TorusParams::default(),
            texture: config.texture,
            texture_dirty: true,
            clear_color: config.clear_color,
            transform: ModelTransform::default(),
            camera: FreeCamera::new(&config.camera),
            camera_controller: CameraController::new(&config.camera),
        };
        scene.set_cylinder(config.cylinder);
        scene.set_sphere(config.sphere);
        scene.set_torus(config.torus);
        scene
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn select_shape(&mut self, shape: ShapeKind) {
        if self.shape != shape {
            log::debug!("[scene] shape {} -> {}", self.shape.label(), shape.label());
            self.shape = shape;
        }
    }

    /// Parameters of the selected shape.
    pub fn shape_parameters(&self) -> ShapeParameters {
        match self.shape {
            ShapeKind::Cube => ShapeParameters::Cube,
            ShapeKind::Cylinder => ShapeParameters::Cylinder(self.cylinder),
            ShapeKind::Sphere => ShapeParameters::Sphere(self.sphere),
            ShapeKind::Torus => ShapeParameters::Torus(self.torus),
        }
    }

    pub fn cylinder(&self) -> CylinderParams {
        self.cylinder
    }

    pub fn set_cylinder(&mut self, params: CylinderParams) {
        self.cylinder = CylinderParams {
            upper_radius: clamp_f32(params.upper_radius, &ranges::CYLINDER_RADIUS),
            lower_radius: clamp_f32(params.lower_radius, &ranges::CYLINDER_RADIUS),
            height: clamp_f32(params.height, &ranges::CYLINDER_HEIGHT),
            segments: clamp_to(params.segments, &ranges::CYLINDER_SEGMENTS),
        };
    }

    pub fn sphere(&self) -> SphereParams {
        self.sphere
    }

    pub fn set_sphere(&mut self, params: SphereParams) {
        self.sphere = SphereParams {
            radius: clamp_f32(params.radius, &ranges::SPHERE_RADIUS),
            latitude_segments: clamp_to(params.latitude_segments, &ranges::SPHERE_SEGMENTS),
            longitude_segments: clamp_to(params.longitude_segments, &ranges::SPHERE_SEGMENTS),
        };
    }

    pub fn torus(&self) -> TorusParams {
        self.torus
    }

    pub fn set_torus(&mut self, params: TorusParams) {
        self.torus = TorusParams {
            inner_radius: clamp_f32(params.inner_radius, &ranges::TORUS_INNER_RADIUS),
            outer_radius: clamp_f32(params.outer_radius, &ranges::TORUS_OUTER_RADIUS),
            tube_segments: clamp_to(params.tube_segments, &ranges::TORUS_SEGMENTS),
            ring_segments: clamp_to(params.ring_segments, &ranges::TORUS_SEGMENTS),
        };
    }

    pub fn texture(&self) -> TextureKind {
        self.texture
    }

    pub fn select_texture(&mut self, texture: TextureKind) {
        if self.texture != texture {
            self.texture = texture;
            self.texture_dirty = true;
        }
    }

    /// Returns the texture to upload if the selection changed since the last
    /// call.
    pub fn take_texture_change(&mut self) -> Option<TextureKind> {
        if self.texture_dirty {
            self.texture_dirty = false;
            Some(self.texture)
        } else {
            None
        }
    }

    /// Forces the current texture to be reported again, e.g. after a failed
    /// upload.
    pub fn invalidate_texture(&mut self) {
        self.texture_dirty = true;
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color.map(|channel| clamp_f32(channel, &(0.0..=1.0)));
    }

    pub fn set_model_scale(&mut self, scale: Vec3) {
        self.transform.scale = Vec3::new(
            clamp_f32(scale.x, &ranges::MODEL_SCALE),
            clamp_f32(scale.y, &ranges::MODEL_SCALE),
            clamp_f32(scale.z, &ranges::MODEL_SCALE),
        );
    }

    pub fn handle_camera_input(&mut self, input: CameraInput) {
        self.camera_controller.handle(&mut self.camera, input);
    }

    pub fn camera_control_active(&self) -> bool {
        self.camera_controller.is_active()
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn advance(&mut self, delta_seconds: f32) {
        self.camera_controller.update(&mut self.camera, delta_seconds);
        self.transform.advance(delta_seconds);
    }

    pub fn frame_view(&self, aspect_ratio: f32, mesh: Option<MeshHandle>) -> FrameView {
        FrameView {
            view_projection: self.camera.view_projection(aspect_ratio).to_cols_array_2d(),
            model: self.transform.matrix().to_cols_array_2d(),
            clear_color: self.clear_color,
            mesh,
        }
    }
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
