//! Free-flying camera driven by right-mouse drag and WASD/QE movement.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per pixel of cursor travel.
    pub rotate_speed: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 4.0,
            rotate_speed: 0.4,
            fov_degrees: 45.0,
            near: 0.01,
            far: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeCamera {
    pub position: Vec3,
    /// Degrees around +Y.
    pub yaw: f32,
    /// Degrees around +X, kept inside `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub pitch: f32,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    home: Vec3,
    home_yaw: f32,
    home_pitch: f32,
}

impl FreeCamera {
    pub fn new(settings: &CameraSettings) -> Self {
        let position = Vec3::from_array(settings.position);
        let pitch = settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self {
            position,
            yaw: settings.yaw,
            pitch,
            up: Vec3::Y,
            fov_degrees: settings.fov_degrees,
            near: settings.near,
            far: settings.far,
            home: position,
            home_yaw: settings.yaw,
            home_pitch: pitch,
        }
    }

    pub fn front(&self) -> Vec3 {
        let rotation = Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians());
        (rotation * Vec4::new(0.0, 0.0, -1.0, 0.0)).truncate()
    }

    pub fn right(&self) -> Vec3 {
        self.up.cross(-self.front()).normalize()
    }

    /// Up vector perpendicular to the view direction.
    pub fn local_up(&self) -> Vec3 {
        (-self.front()).cross(self.right()).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        if self.yaw < 0.0 {
            self.yaw += 360.0;
        }
        if self.yaw > 360.0 {
            self.yaw -= 360.0;
        }
        self.set_pitch(self.pitch + delta_pitch);
    }

    pub fn reset(&mut self) {
        self.position = self.home;
        self.yaw = self.home_yaw;
        self.pitch = self.home_pitch;
    }
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraInput {
    /// Right mouse button pressed at the given cursor position.
    DragStart { x: f32, y: f32 },
    DragEnd,
    CursorMoved { x: f32, y: f32 },
    Key { key: MoveKey, pressed: bool },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    fn set(&mut self, key: MoveKey, pressed: bool) {
        let slot = match key {
            MoveKey::Forward => &mut self.forward,
            MoveKey::Backward => &mut self.backward,
            MoveKey::Left => &mut self.left,
            MoveKey::Right => &mut self.right,
            MoveKey::Up => &mut self.up,
            MoveKey::Down => &mut self.down,
        };
        *slot = pressed;
    }
}

/// Translates raw pointer and key input into camera motion. Input only
/// affects the camera while the right mouse button is held.
#[derive(Debug, Clone)]
pub struct CameraController {
    move_speed: f32,
    rotate_speed: f32,
    active: bool,
    previous_cursor: Vec2,
    held: HeldKeys,
}

impl CameraController {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            move_speed: settings.move_speed,
            rotate_speed: settings.rotate_speed,
            active: false,
            previous_cursor: Vec2::ZERO,
            held: HeldKeys::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle(&mut self, camera: &mut FreeCamera, input: CameraInput) {
        match input {
            CameraInput::DragStart { x, y } => {
                self.previous_cursor = Vec2::new(x, y);
                self.active = true;
            }
            CameraInput::DragEnd => {
                self.active = false;
            }
            CameraInput::CursorMoved { x, y } => {
                if !self.active {
                    return;
                }
                let cursor = Vec2::new(x, y);
                let delta = cursor - self.previous_cursor;
                camera.rotate(
                    -delta.x * self.rotate_speed,
                    -delta.y * self.rotate_speed,
                );
                self.previous_cursor = cursor;
            }
            CameraInput::Key { key, pressed } => self.held.set(key, pressed),
        }
    }

    /// Applies held movement keys for a frame of `delta_seconds`.
    pub fn update(&self, camera: &mut FreeCamera, delta_seconds: f32) {
        if !self.active {
            return;
        }

        let step = self.move_speed * delta_seconds;
        let front = camera.front();
        let right = camera.right();
        let up = camera.local_up();

        let mut offset = Vec3::ZERO;
        if self.held.forward {
            offset += front;
        }
        if self.held.backward {
            offset -= front;
        }
        if self.held.right {
            offset += right;
        }
        if self.held.left {
            offset -= right;
        }
        if self.held.up {
            offset += up;
        }
        if self.held.down {
            offset -= up;
        }
        camera.position += offset * step;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}
